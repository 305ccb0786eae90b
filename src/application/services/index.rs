use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::{
    ports::{CreateOutcome, IndexLifecycle},
    DomainError,
};

pub struct IndexService {
    lifecycle: Arc<dyn IndexLifecycle>,
}

impl IndexService {
    pub fn new(lifecycle: Arc<dyn IndexLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Creates the index, accepting one that already exists with the same
    /// configuration. Every other failure propagates.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<CreateOutcome, DomainError> {
        let outcome = self.lifecycle.create().await?;
        match outcome {
            CreateOutcome::Created => info!("index created"),
            CreateOutcome::AlreadyExists => info!("index already exists, reusing it"),
        }
        Ok(outcome)
    }

    /// Removes the index and all documents. `NotFound` if it was never created.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), DomainError> {
        self.lifecycle.destroy().await?;
        info!("index destroyed");
        Ok(())
    }

    pub async fn is_ready(&self) -> Result<bool, DomainError> {
        self.lifecycle.exists().await
    }
}
