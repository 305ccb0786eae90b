use async_trait::async_trait;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Schema lifecycle of a store: `absent --create--> ready --destroy--> absent`.
#[async_trait]
pub trait IndexLifecycle: Send + Sync {
    /// Reports an existing store with the same configuration as
    /// `CreateOutcome::AlreadyExists` rather than an error.
    async fn create(&self) -> Result<CreateOutcome, DomainError>;
    /// Fails with `NotFound` when the store does not exist.
    async fn destroy(&self) -> Result<(), DomainError>;
    async fn exists(&self) -> Result<bool, DomainError>;
}
