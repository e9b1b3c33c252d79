use thiserror::Error;

#[derive(Error, Debug)]
pub enum TasteCheckError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("ANTHROPIC_API_KEY is not set. Export it or run `tastecheck config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("API call failed: {0}")]
    ApiCall(String),

    #[error("Failed to parse API response: {0}")]
    ApiParse(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] tastecheck_common::Error),
}

impl From<reqwest::Error> for TasteCheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TasteCheckError::ApiCall(format!("request timed out: {}", err))
        } else if err.is_decode() {
            TasteCheckError::ApiParse(err.to_string())
        } else {
            TasteCheckError::ApiCall(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, TasteCheckError>;
