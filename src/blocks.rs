use crate::{
    errors::{RastioError, Result},
    window::Window,
};

/// Lazy row-major iterator over a raster's native block layout.
///
/// Yields `((block_row, block_col), Window)` pairs covering the full
/// extent with no gaps and no overlaps; blocks on the bottom and right
/// edges are cropped to the raster. Re-iterate by cloning. Performs no
/// I/O.
#[derive(Clone, Debug)]
pub struct BlockWindows {
    raster_shape: (usize, usize),
    block_shape: (usize, usize),
    grid_shape: (usize, usize),
    row: usize,
    col: usize,
}

impl BlockWindows {
    /// `raster_shape` and `block_shape` are `(rows, cols)`.
    pub fn new(raster_shape: (usize, usize), block_shape: (usize, usize)) -> Result<Self> {
        let (block_rows, block_cols) = block_shape;
        if block_rows == 0 || block_cols == 0 {
            return Err(RastioError::InvalidBlockShape(block_rows, block_cols));
        }
        let (raster_rows, raster_cols) = raster_shape;
        Ok(BlockWindows {
            raster_shape,
            block_shape,
            grid_shape: (
                raster_rows.div_ceil(block_rows),
                raster_cols.div_ceil(block_cols),
            ),
            row: 0,
            col: 0,
        })
    }

    /// `(rows, cols)` of the block grid.
    pub fn grid_shape(&self) -> (usize, usize) {
        self.grid_shape
    }
}

impl Iterator for BlockWindows {
    type Item = ((usize, usize), Window);

    fn next(&mut self) -> Option<Self::Item> {
        let (grid_rows, grid_cols) = self.grid_shape;
        if self.row >= grid_rows {
            return None;
        }
        let index = (self.row, self.col);
        let row_off = self.row * self.block_shape.0;
        let col_off = self.col * self.block_shape.1;
        let height = self.block_shape.0.min(self.raster_shape.0 - row_off);
        let width = self.block_shape.1.min(self.raster_shape.1 - col_off);
        let window = Window::from_parts(
            col_off as f64,
            row_off as f64,
            width as f64,
            height as f64,
        );
        self.col += 1;
        if self.col == grid_cols {
            self.col = 0;
            self.row += 1;
        }
        Some((index, window))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (grid_rows, grid_cols) = self.grid_shape;
        let remaining = grid_rows
            .saturating_sub(self.row)
            .saturating_mul(grid_cols)
            .saturating_sub(self.col);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BlockWindows {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        intersection::{Intersection, Union},
        window::union_all,
    };
    use rstest::rstest;

    #[rstest]
    #[case((7, 13), (3, 4), (3, 4))]
    #[case((10, 10), (5, 5), (2, 2))]
    #[case((10, 10), (16, 16), (1, 1))]
    #[case((1, 1), (1, 1), (1, 1))]
    fn grid_has_one_block_per_started_tile(
        #[case] raster_shape: (usize, usize),
        #[case] block_shape: (usize, usize),
        #[case] grid_shape: (usize, usize),
    ) {
        let blocks = BlockWindows::new(raster_shape, block_shape).unwrap();
        assert_eq!(blocks.grid_shape(), grid_shape);
        assert_eq!(blocks.len(), grid_shape.0 * grid_shape.1);
        assert_eq!(blocks.count(), grid_shape.0 * grid_shape.1);
    }

    #[test]
    fn blocks_tile_the_raster_exactly() {
        let windows: Vec<Window> = BlockWindows::new((7, 13), (3, 4))
            .unwrap()
            .map(|(_, window)| window)
            .collect();
        let full = union_all(&windows).unwrap();
        assert_eq!(full, Window::new(0., 0., 13., 7.).unwrap());
        let area: f64 = windows
            .iter()
            .map(|window| window.width() * window.height())
            .sum();
        assert_eq!(area, 7. * 13.);
        for (i, a) in windows.iter().enumerate() {
            for b in &windows[i + 1..] {
                assert!(a.intersection(b).is_err(), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn iteration_is_row_major_with_cropped_edges() {
        let mut blocks = BlockWindows::new((7, 13), (3, 4)).unwrap();
        assert_eq!(
            blocks.next().unwrap(),
            ((0, 0), Window::new(0., 0., 4., 3.).unwrap())
        );
        assert_eq!(
            blocks.next().unwrap(),
            ((0, 1), Window::new(4., 0., 4., 3.).unwrap())
        );
        let ((last_row, last_col), last_window) = blocks.by_ref().last().unwrap();
        assert_eq!((last_row, last_col), (2, 3));
        assert_eq!(last_window, Window::new(12., 6., 1., 1.).unwrap());
    }

    #[test]
    fn cloning_restarts_the_sequence() {
        let blocks = BlockWindows::new((4, 4), (2, 2)).unwrap();
        let first: Vec<_> = blocks.clone().collect();
        let second: Vec<_> = blocks.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn degenerate_shapes() {
        assert!(matches!(
            BlockWindows::new((4, 4), (0, 2)),
            Err(RastioError::InvalidBlockShape(0, 2))
        ));
        assert_eq!(BlockWindows::new((0, 4), (2, 2)).unwrap().count(), 0);
    }

    #[test]
    fn union_of_neighbours_is_contiguous() {
        let windows: Vec<Window> = BlockWindows::new((4, 6), (2, 2))
            .unwrap()
            .map(|(_, window)| window)
            .collect();
        assert_eq!(
            windows[0].union(&windows[1]),
            Window::new(0., 0., 4., 2.).unwrap()
        );
    }
}
