use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid log filter `{filter}`: {message}")]
    InvalidFilter { filter: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
