use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),

    #[error("Attribute lookup failed for {0}")]
    AttributeLookup(String),

    #[error("State store error: {0}")]
    Store(String),
}
