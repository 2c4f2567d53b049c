use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid media locator: {0}")]
    InvalidLocator(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
