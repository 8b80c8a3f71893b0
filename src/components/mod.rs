pub mod backends;
pub mod band;
pub mod dataset;
pub mod file;

pub use backends::gdal_backend::{DataType, GdalFile};
pub use band::Band;
pub use dataset::Dataset;
pub use file::{File, Mode, Profile};

use std::collections::HashMap;
type Metadata = HashMap<String, String>;
