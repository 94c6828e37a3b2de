// Serializes mutating commands.
//
// Every command that changes league state holds the single permit for its
// whole run, so two captains racing on the same challenge see each other's
// writes instead of interleaving their check-then-save sequences.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Clone)]
pub struct CommandGate {
    permits: Arc<Semaphore>,
}

impl CommandGate {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Wait for our turn. The gate reopens when the permit is dropped.
    pub async fn enter(&self) -> Result<OwnedSemaphorePermit, tokio::sync::AcquireError> {
        Arc::clone(&self.permits).acquire_owned().await
    }
}

impl Default for CommandGate {
    fn default() -> Self {
        Self::new()
    }
}
