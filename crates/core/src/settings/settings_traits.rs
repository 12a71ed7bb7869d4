//! Repository traits for settings.

use async_trait::async_trait;

use crate::errors::Result;
use crate::settings::LedgerSettings;

/// Repository trait for persisting engine settings.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Get the stored settings. Returns `DatabaseError::NotFound` when none were saved yet.
    fn get_settings(&self) -> Result<LedgerSettings>;

    /// Replace the stored settings.
    async fn update_settings(&self, settings: &LedgerSettings) -> Result<()>;
}
