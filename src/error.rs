use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status error: {0}")]
    HttpStatus(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::StatusCode> for Error {
    fn from(status: reqwest::StatusCode) -> Self {
        Error::HttpStatus(format!("HTTP status: {status}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
