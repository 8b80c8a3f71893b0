use std::fmt::Debug;

use geo::{Coord, Rect};
use log::info;
use ndarray::{Array2, Array3, ArrayView2};
use rayon::prelude::*;

use crate::{
    blocks::BlockWindows,
    components::{
        backends::gdal_backend::{DataType, GdalFile},
        band::{Band, BandReader},
        file::{File, Mode, Profile},
        Metadata,
    },
    env::Env,
    errors::{RastioError, Result},
    indexes::Indexes,
    path::DatasetPath,
    transform::{PixelAnchor, Transform},
    window::{Window, WindowError},
};

/// An open raster dataset.
///
/// File-like lifecycle: open (or create), read/write through windows,
/// close. Georeferencing is cached at open time; pixels move through the
/// [File] backend. Reads fan out one engine handle per band; writes go
/// through the single handle behind `&mut self`.
pub struct Dataset<F: File = GdalFile> {
    file: F,
    path: DatasetPath,
    mode: Mode,
    /// `(width, height)`.
    size: (usize, usize),
    count: usize,
    crs: String,
    transform: Transform,
}

impl<F: File> Debug for Dataset<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("path", &self.path.to_string())
            .field("driver", &self.file.driver())
            .field("size", &self.size)
            .field("count", &self.count)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<F: File> Dataset<F> {
    pub fn open_with(path: &DatasetPath, mode: Mode, env: &Env) -> Result<Self> {
        let file = F::open(path, mode, env)?;
        Self::from_file(file, path.clone(), mode)
    }

    /// Create a dataset with `T` pixels and open it for update.
    pub fn create<T: DataType>(path: &DatasetPath, profile: &Profile, env: &Env) -> Result<Self> {
        let file = F::create::<T>(path, profile, env)?;
        Self::from_file(file, path.clone(), Mode::Update)
    }

    fn from_file(file: F, path: DatasetPath, mode: Mode) -> Result<Self> {
        // ungeoreferenced datasets get the identity transform
        let transform = file.transform().unwrap_or_else(|_| Transform::identity());
        let dataset = Dataset {
            size: file.size(),
            count: file.num_bands(),
            crs: file.crs(),
            transform,
            mode,
            path,
            file,
        };
        info!("opened {dataset:?}");
        Ok(dataset)
    }

    pub fn path(&self) -> &DatasetPath {
        &self.path
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.size.1, self.size.0)
    }

    pub fn width(&self) -> usize {
        self.size.0
    }

    pub fn height(&self) -> usize {
        self.size.1
    }

    /// Number of bands.
    pub fn count(&self) -> usize {
        self.count
    }

    /// CRS of the dataset, as reported by the engine (WKT).
    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn driver(&self) -> String {
        self.file.driver()
    }

    pub fn description(&self) -> Result<String> {
        self.file.description()
    }

    pub fn metadata(&self) -> Metadata {
        self.file.metadata()
    }

    pub fn band(&self, index: usize) -> Result<Band> {
        self.check_band(index)?;
        self.file.band(index)
    }

    pub fn bands(&self) -> Result<Vec<Band>> {
        (1..=self.count).map(|index| self.file.band(index)).collect()
    }

    pub fn nodata(&self, index: usize) -> Result<Option<f64>> {
        Ok(self.band(index)?.nodata)
    }

    /// The full extent as a window.
    pub fn full_window(&self) -> Window {
        Window::from_parts(0., 0., self.size.0 as f64, self.size.1 as f64)
    }

    /// World-space bounding rectangle of the full extent.
    pub fn bounds(&self) -> Rect<f64> {
        let (width, height) = (self.size.0 as f64, self.size.1 as f64);
        let corners = [(0., 0.), (width, 0.), (0., height), (width, height)]
            .map(|(col, row)| self.transform.apply(col, row));
        let (mut min, mut max) = (corners[0], corners[0]);
        for (x, y) in corners {
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        Rect::new(Coord::from(min), Coord::from(max))
    }

    /// Window of this dataset covering the world bounds, cropped to the
    /// extent.
    pub fn window(&self, left: f64, bottom: f64, right: f64, top: f64) -> Result<Window> {
        let window = Window::from_bounds(&self.transform, left, bottom, right, top)?;
        Ok(window.crop(self.size.1 as f64, self.size.0 as f64))
    }

    /// Transform of the sub-raster a window selects.
    pub fn window_transform(&self, window: &Window) -> Transform {
        self.transform * Transform::translation(window.col_off(), window.row_off())
    }

    /// `(left, bottom, right, top)` world bounds of a window.
    pub fn window_bounds(&self, window: &Window) -> (f64, f64, f64, f64) {
        let (rows, cols) = window.to_slices();
        let (left, bottom) = self.transform.apply(cols.start, rows.end);
        let (right, top) = self.transform.apply(cols.end, rows.start);
        (left, bottom, right, top)
    }

    /// World coordinates of a pixel center.
    pub fn xy(&self, row: f64, col: f64) -> (f64, f64) {
        self.transform.xy(row, col, PixelAnchor::Center)
    }

    /// `(row, col)` of the pixel containing a world point.
    pub fn index(&self, x: f64, y: f64) -> Result<(i64, i64)> {
        Ok(self.transform.rowcol(x, y)?)
    }

    /// Native block shape of a band, as `(rows, cols)`.
    pub fn block_shapes(&self) -> Result<Vec<(usize, usize)>> {
        Ok(self.bands()?.into_iter().map(|band| band.block_shape).collect())
    }

    /// Iterate the native block layout of a band.
    pub fn block_windows(&self, index: usize) -> Result<BlockWindows> {
        let band = self.band(index)?;
        BlockWindows::new(self.shape(), band.block_shape)
    }

    /// Read a selection of bands into a `(band, row, col)` array.
    ///
    /// `window` defaults to the full extent and must lie within it.
    /// Bands are read concurrently, each through its own engine handle.
    pub fn read<T: DataType>(
        &self,
        indexes: impl Into<Indexes>,
        window: Option<&Window>,
    ) -> Result<Array3<T>> {
        let selection = indexes.into().resolve(self.count)?;
        let (offset, shape) = self.io_params(window)?;
        let (height, width) = shape;
        if selection.is_empty() || height == 0 || width == 0 {
            return Ok(Array3::zeros((selection.len(), height, width)));
        }
        let readers = selection
            .iter()
            .map(|&index| self.file.band_reader::<T>(index))
            .collect::<Result<Vec<_>>>()?;
        let mut data = vec![T::zero(); selection.len() * height * width];
        data.par_chunks_mut(height * width)
            .zip(readers.par_iter())
            .map(|(chunk, reader)| reader.read_into_slice(offset, shape, shape, chunk))
            .collect::<Result<Vec<()>>>()?;
        Ok(Array3::from_shape_vec((selection.len(), height, width), data)?)
    }

    /// Read one band into a `(row, col)` array.
    pub fn read_band<T: DataType>(&self, index: usize, window: Option<&Window>) -> Result<Array2<T>> {
        self.check_band(index)?;
        let (offset, shape) = self.io_params(window)?;
        self.read_band_into(index, offset, shape, shape)
    }

    /// Read one band resampled to `out_shape` `(rows, cols)`; the engine
    /// does the decimation/interpolation.
    pub fn read_band_decimated<T: DataType>(
        &self,
        index: usize,
        window: Option<&Window>,
        out_shape: (usize, usize),
    ) -> Result<Array2<T>> {
        self.check_band(index)?;
        let (offset, shape) = self.io_params(window)?;
        self.read_band_into(index, offset, shape, out_shape)
    }

    fn read_band_into<T: DataType>(
        &self,
        index: usize,
        offset: (isize, isize),
        shape: (usize, usize),
        out_shape: (usize, usize),
    ) -> Result<Array2<T>> {
        if shape.0 == 0 || shape.1 == 0 || out_shape.0 == 0 || out_shape.1 == 0 {
            return Ok(Array2::zeros(out_shape));
        }
        let mut data = vec![T::zero(); out_shape.0 * out_shape.1];
        self.file
            .band_reader::<T>(index)?
            .read_into_slice(offset, shape, out_shape, &mut data)?;
        Ok(Array2::from_shape_vec(out_shape, data)?)
    }

    /// Write a `(row, col)` array through a window of one band.
    ///
    /// The array shape must equal the resolved window shape. Requires
    /// the dataset to be open for update; `&mut self` serializes writes
    /// through this handle.
    pub fn write_band<T: DataType>(
        &mut self,
        index: usize,
        window: Option<&Window>,
        data: ArrayView2<T>,
    ) -> Result<()> {
        if self.mode != Mode::Update {
            return Err(RastioError::ReadOnly);
        }
        self.check_band(index)?;
        let (offset, shape) = self.io_params(window)?;
        let dim = data.dim();
        if dim != shape {
            return Err(RastioError::ShapeMismatch {
                buffer: dim,
                window: shape,
            });
        }
        if shape.0 == 0 || shape.1 == 0 {
            return Ok(());
        }
        let values: Vec<T> = data.iter().copied().collect();
        self.file.write_window(index, offset, shape, &values)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()
    }

    /// Close the handle, surfacing engine errors that dropping would
    /// swallow.
    pub fn close(self) -> Result<()> {
        self.file.close()
    }

    fn check_band(&self, index: usize) -> Result<()> {
        if index == 0 || index > self.count {
            return Err(RastioError::BandIndexOutOfRange {
                index,
                count: self.count,
            });
        }
        Ok(())
    }

    /// Translate a window into the engine's `(x off, y off)` position
    /// and `(height, width)` size, integerized outward (floored offsets,
    /// ceiled stops) and checked against the extent.
    fn io_params(&self, window: Option<&Window>) -> Result<((isize, isize), (usize, usize))> {
        let window = window.copied().unwrap_or_else(|| self.full_window());
        let col_start = window.col_off().floor();
        let row_start = window.row_off().floor();
        let col_stop = (window.col_off() + window.width()).ceil();
        let row_stop = (window.row_off() + window.height()).ceil();
        if col_start < 0.
            || row_start < 0.
            || col_stop > self.size.0 as f64
            || row_stop > self.size.1 as f64
        {
            return Err(WindowError::InvalidWindow(format!(
                "window {window:?} extends outside the dataset extent {:?}",
                self.size
            ))
            .into());
        }
        Ok((
            (col_start as isize, row_start as isize),
            (
                (row_stop - row_start) as usize,
                (col_stop - col_start) as usize,
            ),
        ))
    }
}
