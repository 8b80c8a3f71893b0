pub type Result<T> = std::result::Result<T, RastioError>;

#[derive(thiserror::Error, Debug)]
pub enum RastioError {
    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),
    #[error(transparent)]
    Ndarray(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Transform(#[from] crate::transform::TransformError),
    #[error(transparent)]
    Window(#[from] crate::window::WindowError),
    #[error(transparent)]
    Path(#[from] crate::path::PathError),
    #[error("band index {index} is out of range (dataset has {count} bands)")]
    BandIndexOutOfRange { index: usize, count: usize },
    #[error("invalid block shape: {0} x {1}")]
    InvalidBlockShape(usize, usize),
    #[error("dataset is not open for writing")]
    ReadOnly,
    #[error("buffer shape {buffer:?} does not match window shape {window:?}")]
    ShapeMismatch {
        buffer: (usize, usize),
        window: (usize, usize),
    },
}
