use std::fmt::Debug;

use crate::{components::Metadata, errors::Result};

/// Reads pixel windows of one band.
///
/// Implementations must be callable from multiple threads at once; the
/// gdal backend opens a fresh engine handle per read since engine
/// handles themselves are not shareable.
pub trait BandReader<T>: Send + Sync + Debug {
    /// `offset` is `(col, row)` from the top-left corner and `shape` the
    /// window `(height, width)`. `out` holds `out_shape` pixels
    /// row-major; the engine resamples when `out_shape != shape`.
    fn read_into_slice(
        &self,
        offset: (isize, isize),
        shape: (usize, usize),
        out_shape: (usize, usize),
        out: &mut [T],
    ) -> Result<()>;
}

/// Per-band metadata as reported by the engine.
#[derive(Clone, Debug)]
pub struct Band {
    /// 1-based index.
    pub index: usize,
    pub description: String,
    /// Engine name of the pixel type, e.g. `UInt16`.
    pub dtype: String,
    /// Native storage tile as `(rows, cols)`.
    pub block_shape: (usize, usize),
    pub nodata: Option<f64>,
    pub scale: Option<f64>,
    pub offset: Option<f64>,
    pub metadata: Metadata,
}
