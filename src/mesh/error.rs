use std::io;
use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised by mesh generation, tools and I/O
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl MeshError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
