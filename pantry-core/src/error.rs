use crate::image::ImageError;
use crate::llm::LlmError;
use crate::parse::ParseError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Could not generate recipe")]
    Declined,

    #[error("Text provider error: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not parse provider reply: {0}")]
    Parse(ParseError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    NotFound(String),
}

impl From<ParseError> for ServiceError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Declined => ServiceError::Declined,
            other => ServiceError::Parse(other),
        }
    }
}
