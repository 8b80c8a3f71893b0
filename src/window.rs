use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use serde::{Deserialize, Serialize};

use crate::{
    errors::Result,
    intersection::{Intersection, Union},
    transform::Transform,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WindowError {
    #[error("invalid window: {0}")]
    InvalidWindow(String),
    #[error("windows do not intersect")]
    EmptyIntersection,
}

/// Rectangular sub-region of a raster's pixel grid.
///
/// Offsets and lengths are fractional; lengths are never negative.
/// Windows carry no pixel data, they only bound I/O calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    col_off: f64,
    row_off: f64,
    width: f64,
    height: f64,
}

impl Window {
    pub fn new(col_off: f64, row_off: f64, width: f64, height: f64) -> Result<Self> {
        if !(col_off.is_finite() && row_off.is_finite() && width.is_finite() && height.is_finite())
        {
            return Err(
                WindowError::InvalidWindow("bounds must be finite".to_string()).into(),
            );
        }
        if width < 0. || height < 0. {
            return Err(WindowError::InvalidWindow(format!(
                "negative dimensions: {width} x {height}"
            ))
            .into());
        }
        Ok(Self::from_parts(col_off, row_off, width, height))
    }

    /// Caller guarantees non-negative, finite lengths.
    pub(crate) fn from_parts(col_off: f64, row_off: f64, width: f64, height: f64) -> Self {
        Window {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// Window from per-axis `(start, stop)` ranges, mirroring slice
    /// semantics: `None` start is 0, `None` stop is the full extent and
    /// negative values count from the far edge. Resolving `None` stops or
    /// negative values needs the matching extent (`height`/`width`).
    pub fn from_slices<R, C>(
        rows: R,
        cols: C,
        height: Option<f64>,
        width: Option<f64>,
    ) -> Result<Self>
    where
        R: Into<SliceRange>,
        C: Into<SliceRange>,
    {
        let (row_start, row_stop) = resolve_axis(rows.into(), height, "row")?;
        let (col_start, col_stop) = resolve_axis(cols.into(), width, "col")?;
        Ok(Self::from_parts(
            col_start,
            row_start,
            col_stop - col_start,
            row_stop - row_start,
        ))
    }

    /// Fractional window covering the world bounds under `transform`.
    pub fn from_bounds(
        transform: &Transform,
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    ) -> Result<Self> {
        let inverse = transform.invert()?;
        let (col_start, row_start) = inverse.apply(left, top);
        let (col_stop, row_stop) = inverse.apply(right, bottom);
        if col_stop < col_start || row_stop < row_start {
            return Err(WindowError::InvalidWindow(format!(
                "bounds resolve to a negative extent: \
                 ({left}, {bottom}, {right}, {top})"
            ))
            .into());
        }
        Ok(Self::from_parts(
            col_start,
            row_start,
            col_stop - col_start,
            row_stop - row_start,
        ))
    }

    pub fn col_off(&self) -> f64 {
        self.col_off
    }

    pub fn row_off(&self) -> f64 {
        self.row_off
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (f64, f64) {
        (self.height, self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0. || self.height == 0.
    }

    /// `(row range, col range)`; the reverse of [Window::from_slices].
    pub fn to_slices(&self) -> (Range<f64>, Range<f64>) {
        (
            self.row_off..self.row_off + self.height,
            self.col_off..self.col_off + self.width,
        )
    }

    pub fn contains(&self, other: &Window) -> bool {
        self.col_off <= other.col_off
            && self.row_off <= other.row_off
            && self.col_off + self.width >= other.col_off + other.width
            && self.row_off + self.height >= other.row_off + other.height
    }

    /// Clamp to a raster extent of `height` rows by `width` cols.
    pub fn crop(&self, height: f64, width: f64) -> Window {
        let row_start = self.row_off.max(0.).min(height);
        let row_stop = (self.row_off + self.height).min(height).max(0.);
        let col_start = self.col_off.max(0.).min(width);
        let col_stop = (self.col_off + self.width).min(width).max(0.);
        Window::from_parts(
            col_start,
            row_start,
            (col_stop - col_start).max(0.),
            (row_stop - row_start).max(0.),
        )
    }

    /// Floor the offsets, keeping the lengths.
    pub fn round_offsets(&self) -> Window {
        Window::from_parts(
            self.col_off.floor(),
            self.row_off.floor(),
            self.width,
            self.height,
        )
    }

    /// Ceil the lengths, keeping the offsets.
    pub fn round_lengths(&self) -> Window {
        Window::from_parts(
            self.col_off,
            self.row_off,
            self.width.ceil(),
            self.height.ceil(),
        )
    }
}

impl Union for Window {
    type Output = Window;

    fn union(&self, rhs: &Self) -> Window {
        let col_off = self.col_off.min(rhs.col_off);
        let row_off = self.row_off.min(rhs.row_off);
        let col_stop = (self.col_off + self.width).max(rhs.col_off + rhs.width);
        let row_stop = (self.row_off + self.height).max(rhs.row_off + rhs.height);
        Window::from_parts(col_off, row_off, col_stop - col_off, row_stop - row_off)
    }
}

impl Intersection for Window {
    type Output = Window;

    /// Abutting or disjoint windows fail with [WindowError::EmptyIntersection].
    fn intersection(&self, rhs: &Self) -> Result<Window> {
        let overlaps = |start1: f64, stop1: f64, start2: f64, stop2: f64| {
            start1 < stop2 && start2 < stop1
        };
        if !overlaps(
            self.col_off,
            self.col_off + self.width,
            rhs.col_off,
            rhs.col_off + rhs.width,
        ) || !overlaps(
            self.row_off,
            self.row_off + self.height,
            rhs.row_off,
            rhs.row_off + rhs.height,
        ) {
            return Err(WindowError::EmptyIntersection.into());
        }
        let col_off = self.col_off.max(rhs.col_off);
        let row_off = self.row_off.max(rhs.row_off);
        let col_stop = (self.col_off + self.width).min(rhs.col_off + rhs.width);
        let row_stop = (self.row_off + self.height).min(rhs.row_off + rhs.height);
        Ok(Window::from_parts(
            col_off,
            row_off,
            col_stop - col_off,
            row_stop - row_off,
        ))
    }
}

/// Smallest window covering all inputs.
pub fn union_all(windows: &[Window]) -> Result<Window> {
    windows
        .iter()
        .copied()
        .reduce(|acc, window| acc.union(&window))
        .ok_or_else(|| WindowError::InvalidWindow("no windows given".to_string()).into())
}

/// Largest window covered by all inputs.
pub fn intersection_all(windows: &[Window]) -> Result<Window> {
    let mut iter = windows.iter();
    let first = *iter
        .next()
        .ok_or_else(|| WindowError::InvalidWindow("no windows given".to_string()))?;
    iter.try_fold(first, |acc, window| acc.intersection(window))
}

/// One axis of [Window::from_slices]: an optionally open-ended range.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SliceRange {
    pub start: Option<f64>,
    pub stop: Option<f64>,
}

fn resolve_axis(range: SliceRange, extent: Option<f64>, axis: &str) -> Result<(f64, f64)> {
    let against_extent = |value: f64| {
        extent
            .map(|extent| extent + value)
            .ok_or_else(|| {
                WindowError::InvalidWindow(format!(
                    "{axis} bound {value} needs a known extent"
                ))
            })
    };
    let start = match range.start {
        None => 0.,
        Some(start) if start < 0. => against_extent(start)?,
        Some(start) => start,
    };
    let stop = match range.stop {
        None => extent.ok_or_else(|| {
            WindowError::InvalidWindow(format!("open {axis} stop needs a known extent"))
        })?,
        Some(stop) if stop < 0. => against_extent(stop)?,
        Some(stop) => stop,
    };
    if !start.is_finite() || !stop.is_finite() {
        return Err(WindowError::InvalidWindow(format!(
            "{axis} range ({start}, {stop}) is not finite"
        ))
        .into());
    }
    if stop < start {
        return Err(WindowError::InvalidWindow(format!(
            "{axis} range ({start}, {stop}) has negative extent"
        ))
        .into());
    }
    Ok((start, stop))
}

impl From<(Option<f64>, Option<f64>)> for SliceRange {
    fn from((start, stop): (Option<f64>, Option<f64>)) -> Self {
        SliceRange { start, stop }
    }
}

impl From<(f64, f64)> for SliceRange {
    fn from((start, stop): (f64, f64)) -> Self {
        SliceRange {
            start: Some(start),
            stop: Some(stop),
        }
    }
}

impl From<Range<f64>> for SliceRange {
    fn from(range: Range<f64>) -> Self {
        (range.start, range.end).into()
    }
}

impl From<RangeFrom<f64>> for SliceRange {
    fn from(range: RangeFrom<f64>) -> Self {
        SliceRange {
            start: Some(range.start),
            stop: None,
        }
    }
}

impl From<RangeTo<f64>> for SliceRange {
    fn from(range: RangeTo<f64>) -> Self {
        SliceRange {
            start: None,
            stop: Some(range.end),
        }
    }
}

impl From<RangeFull> for SliceRange {
    fn from(_: RangeFull) -> Self {
        SliceRange::default()
    }
}

impl From<Range<isize>> for SliceRange {
    fn from(range: Range<isize>) -> Self {
        (range.start as f64, range.end as f64).into()
    }
}

impl From<RangeFrom<isize>> for SliceRange {
    fn from(range: RangeFrom<isize>) -> Self {
        SliceRange {
            start: Some(range.start as f64),
            stop: None,
        }
    }
}

impl From<RangeTo<isize>> for SliceRange {
    fn from(range: RangeTo<isize>) -> Self {
        SliceRange {
            start: None,
            stop: Some(range.end as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RastioError;
    use rstest::rstest;

    fn window(col_off: f64, row_off: f64, width: f64, height: f64) -> Window {
        Window::new(col_off, row_off, width, height).unwrap()
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        assert!(matches!(
            Window::new(0., 0., -1., 4.),
            Err(RastioError::Window(WindowError::InvalidWindow(_)))
        ));
    }

    #[test]
    fn from_slices_defaults_start_to_zero() {
        assert_eq!(
            Window::from_slices(..4., ..4., None, None).unwrap(),
            window(0., 0., 4., 4.)
        );
    }

    #[test]
    fn from_slices_open_stop_takes_full_extent() {
        assert_eq!(
            Window::from_slices(4.., 4.., Some(10.), Some(12.)).unwrap(),
            window(4., 4., 8., 6.)
        );
    }

    #[test]
    fn from_slices_negative_counts_from_far_edge() {
        assert_eq!(
            Window::from_slices(-4.., -4.., Some(10.), Some(10.)).unwrap(),
            window(6., 6., 4., 4.)
        );
        assert_eq!(
            Window::from_slices(
                (2., 8.),
                SliceRange::from((Some(1.), Some(-1.))),
                Some(10.),
                Some(10.),
            )
            .unwrap(),
            window(1., 2., 8., 6.)
        );
    }

    #[rstest]
    #[case(SliceRange::from(-4..), None)]
    #[case(SliceRange::from(..), None)]
    #[case(SliceRange::from((4., 2.)), Some(10.))]
    fn from_slices_rejects_unresolvable_axes(
        #[case] rows: SliceRange,
        #[case] height: Option<f64>,
    ) {
        assert!(matches!(
            Window::from_slices(rows, (0., 1.), height, Some(10.)),
            Err(RastioError::Window(WindowError::InvalidWindow(_)))
        ));
    }

    #[test]
    fn union_covers_both_inputs() {
        let a = window(10., 100., 490., 400.);
        let b = window(50., 10., 200., 140.);
        let union = a.union(&b);
        assert_eq!(union, window(10., 10., 490., 490.));
        assert_eq!(union, b.union(&a));
        assert!(union.contains(&a) && union.contains(&b));
    }

    #[test]
    fn intersection_is_covered_by_both_inputs() {
        let a = window(10., 100., 490., 400.);
        let b = window(50., 10., 200., 140.);
        let intersection = a.intersection(&b).unwrap();
        assert_eq!(intersection, window(50., 100., 200., 50.));
        assert_eq!(intersection, b.intersection(&a).unwrap());
        assert!(a.contains(&intersection) && b.contains(&intersection));
    }

    #[rstest]
    #[case(window(0., 0., 4., 4.), window(10., 0., 4., 4.))]
    #[case(window(0., 0., 4., 4.), window(4., 0., 4., 4.))]
    #[case(window(0., 0., 4., 4.), window(0., 4., 4., 4.))]
    fn disjoint_or_abutting_windows_do_not_intersect(#[case] a: Window, #[case] b: Window) {
        assert!(matches!(
            a.intersection(&b),
            Err(RastioError::Window(WindowError::EmptyIntersection))
        ));
    }

    #[test]
    fn to_slices_round_trips() {
        let original = window(10., 100., 240., 400.);
        let (rows, cols) = original.to_slices();
        assert_eq!(rows, 100.0..500.0);
        assert_eq!(cols, 10.0..250.0);
        assert_eq!(
            Window::from_slices(rows, cols, None, None).unwrap(),
            original
        );
    }

    #[test]
    fn crop_clamps_to_the_extent() {
        assert_eq!(
            window(-10., 5., 100., 100.).crop(50., 60.),
            window(0., 5., 60., 45.)
        );
        assert_eq!(window(10., 10., 20., 20.).crop(5., 5.), window(5., 5., 0., 0.));
    }

    #[test]
    fn rounding_expands_to_integer_bounds() {
        let fractional = window(1.5, 2.25, 3.2, 4.5);
        assert_eq!(fractional.round_offsets(), window(1., 2., 3.2, 4.5));
        assert_eq!(fractional.round_lengths(), window(1.5, 2.25, 4., 5.));
    }

    #[test]
    fn union_all_and_intersection_all_fold_over_slices() {
        let windows = [
            window(0., 0., 10., 10.),
            window(5., 5., 10., 10.),
            window(8., 2., 10., 10.),
        ];
        assert_eq!(union_all(&windows).unwrap(), window(0., 0., 18., 15.));
        assert_eq!(
            intersection_all(&windows).unwrap(),
            window(8., 5., 2., 5.)
        );
        assert!(union_all(&[]).is_err());
    }

    #[test]
    fn from_bounds_inverts_the_transform() {
        let transform = Transform::from_origin(100., 200., 10., 10.);
        let window_from_bounds =
            Window::from_bounds(&transform, 120., 150., 180., 200.).unwrap();
        assert_eq!(window_from_bounds, window(2., 0., 6., 5.));
    }
}
