//! Confirmation prompt port.

use async_trait::async_trait;
use keydesk_domain::Confirmation;

/// Asks the operator to confirm a destructive action.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Returns true if the operator accepted.
    async fn confirm(&self, confirmation: &Confirmation) -> bool;
}
