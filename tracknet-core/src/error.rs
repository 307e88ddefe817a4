use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("Unknown edge: {0}")]
    UnknownEdge(String),
    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(String),
    #[error("Unknown analytical feature: {0}")]
    UnknownFeature(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
