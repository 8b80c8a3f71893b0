use std::fmt::Debug;

use crate::{
    components::{
        backends::gdal_backend::DataType,
        band::{Band, BandReader},
        Metadata,
    },
    env::Env,
    errors::Result,
    path::DatasetPath,
    transform::Transform,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Read,
    Update,
}

/// Creation profile for new datasets: driver, grid layout and
/// georeferencing. `options` are passed to the driver verbatim.
#[derive(Clone, Debug)]
pub struct Profile {
    pub driver: String,
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Bands.
    pub count: usize,
    /// CRS definition: WKT, or `EPSG:<code>`.
    pub crs: Option<String>,
    pub transform: Option<Transform>,
    pub nodata: Option<f64>,
    pub options: Vec<(String, String)>,
}

impl Profile {
    pub fn new(width: usize, height: usize, count: usize) -> Self {
        Profile {
            driver: "GTiff".to_string(),
            width,
            height,
            count,
            crs: None,
            transform: None,
            nodata: None,
            options: Vec::new(),
        }
    }

    /// Square tiling, the layout cloud-friendly GeoTIFFs use.
    pub fn tiled(mut self, block_size: usize) -> Self {
        self.options.push(("TILED".to_string(), "YES".to_string()));
        self.options
            .push(("BLOCKXSIZE".to_string(), block_size.to_string()));
        self.options
            .push(("BLOCKYSIZE".to_string(), block_size.to_string()));
        self
    }
}

/// Seam to the engine: everything a dataset handle needs from whatever
/// actually decodes pixels. One implementation per backend.
pub trait File: Debug + Sized {
    fn open(path: &DatasetPath, mode: Mode, env: &Env) -> Result<Self>;
    fn create<T: DataType>(path: &DatasetPath, profile: &Profile, env: &Env) -> Result<Self>;
    fn description(&self) -> Result<String>;
    fn driver(&self) -> String;
    /// `(width, height)`.
    fn size(&self) -> (usize, usize);
    fn crs(&self) -> String;
    fn transform(&self) -> Result<Transform>;
    fn num_bands(&self) -> usize;
    /// Band metadata; `index` starts at 1.
    fn band(&self, index: usize) -> Result<Band>;
    /// A reader usable from worker threads independently of `self`.
    fn band_reader<T: DataType>(&self, index: usize) -> Result<impl BandReader<T>>;
    fn metadata(&self) -> Metadata;
    /// `offset` is `(col, row)`, `shape` is `(height, width)`, `data`
    /// row-major.
    fn write_window<T: DataType>(
        &mut self,
        index: usize,
        offset: (isize, isize),
        shape: (usize, usize),
        data: &[T],
    ) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn close(self) -> Result<()>;
}
