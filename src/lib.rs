//! File-like access to geospatial raster datasets.
//!
//! Datasets open from tagged [DatasetPath] locations inside a scoped
//! engine configuration ([Env]), read and write dense [ndarray] blocks
//! bounded by [Window]s, and map between pixel and world coordinates
//! through an affine [Transform]. Format decoding, compression and
//! virtual filesystems are the engine's job (via the `gdal` crate); this
//! crate owns the windowing arithmetic and the ergonomics around it.

mod blocks;
mod components;
mod env;
mod errors;
mod indexes;
mod intersection;
mod path;
mod transform;
mod window;

pub use blocks::BlockWindows;
pub use components::{
    band::BandReader, Band, DataType, Dataset, File, GdalFile, Mode, Profile,
};
pub use env::{Env, DEFAULT_OPTIONS};
pub use errors::{RastioError, Result};
pub use indexes::Indexes;
pub use intersection::{Intersection, Union};
pub use path::{ArchiveScheme, DatasetPath, PathError, RemoteScheme};
pub use transform::{PixelAnchor, Transform, TransformError};
pub use window::{intersection_all, union_all, SliceRange, Window, WindowError};

/// Open a dataset read-only.
pub fn open(path: &str, env: &Env) -> Result<Dataset> {
    Dataset::open_with(&path.parse()?, Mode::Read, env)
}

/// Open a dataset for in-place update.
pub fn open_update(path: &str, env: &Env) -> Result<Dataset> {
    Dataset::open_with(&path.parse()?, Mode::Update, env)
}

/// Create a dataset with `T` pixels and open it for update.
pub fn create<T: DataType>(path: &str, profile: &Profile, env: &Env) -> Result<Dataset> {
    Dataset::create::<T>(&path.parse()?, profile, env)
}
