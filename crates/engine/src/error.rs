//! The module contains the error the engine can throw.
//!
//! The errors are grouped the way callers react to them:
//!
//! - validation: [`InvalidAmount`], [`InvalidShares`], [`InvalidInput`]. The
//!   request is rejected before anything is written.
//! - [`ExistingKey`] thrown when a unique resource already exists (duplicate
//!   e-mail, duplicate membership).
//! - [`KeyNotFound`] thrown when a referenced item is not found.
//! - [`Database`] thrown when the storage fails; any open transaction is
//!   rolled back.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidShares`]: EngineError::InvalidShares
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid shares: {0}")]
    InvalidShares(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors raised before any storage mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidShares(_) | Self::InvalidInput(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidShares(a), Self::InvalidShares(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
