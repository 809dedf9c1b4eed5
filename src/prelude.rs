use std::path::PathBuf;

/// Error type for RustANN
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Indicates some dimension is incorrect in a Matrix operation.
    #[error("incompatible matrix dimensions")]
    DimensionErr,
    /// The file at the given path does not exist.
    #[error("file {} does not exist", .0.display())]
    NotFound(PathBuf),
    /// A data file has an inconsistent column count or a token that is not a number.
    #[error("line {line}: {reason}")]
    Format { line: usize, reason: String },
    /// An argument has the wrong count or shape.
    #[error("{0}")]
    Argument(String),
    /// Direct cell or row access outside of the grid.
    #[error("index ({row}, {col}) out of range for a {rows}x{cols} grid")]
    Range {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    /// A column cannot be min-max scaled because all of its values are equal.
    #[error("column {column} has zero range and cannot be normalized")]
    ZeroRange { column: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The visualizer thread or window failed.
    #[error("training visualizer failed")]
    Visualizer,
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn argument_err<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::Argument(msg.into()))
}
