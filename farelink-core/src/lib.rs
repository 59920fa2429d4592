pub mod offer;
pub mod payment;
pub mod provider;
pub mod search;
pub mod seatmap;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
