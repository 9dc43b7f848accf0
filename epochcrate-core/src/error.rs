//! Error types for epochcrate

use thiserror::Error;

/// Main error type for epochcrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    #[error("Missing scalar field: {0}")]
    MissingScalarField(String),
    
    #[error("{what} = {actual} is not within relative tolerance {rel_tol} of {expected}")]
    Tolerance {
        what: String,
        actual: f64,
        expected: f64,
        rel_tol: f64,
    },
    
    #[error("Algorithm error: {0}")]
    Algorithm(String),
    
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for epochcrate operations
pub type Result<T> = std::result::Result<T, Error>;
