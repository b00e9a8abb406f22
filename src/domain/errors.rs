use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("buyers cannot purchase their own products")]
    SelfPurchase,
    #[error("internal error: {0}")]
    Internal(String),
}
