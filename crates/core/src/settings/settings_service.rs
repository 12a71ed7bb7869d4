use super::SettingsRepositoryTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::settings::{read_settings, LedgerSettings, SettingsUpdate, SharedSettings};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    /// Current in-memory settings.
    fn get_settings(&self) -> Result<LedgerSettings>;

    /// Reloads settings from the repository and publishes them to the shared handle.
    fn load(&self) -> Result<LedgerSettings>;

    /// Validates and persists a partial update, then publishes the result.
    async fn update_settings(&self, update: &SettingsUpdate) -> Result<LedgerSettings>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
    shared: SharedSettings,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>, shared: SharedSettings) -> Self {
        SettingsService {
            settings_repository,
            shared,
        }
    }

    fn publish(&self, settings: LedgerSettings) -> Result<()> {
        let mut guard = self
            .shared
            .write()
            .map_err(|_| Error::Unexpected("Settings lock poisoned".to_string()))?;
        *guard = settings;
        Ok(())
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<LedgerSettings> {
        read_settings(&self.shared)
    }

    fn load(&self) -> Result<LedgerSettings> {
        let settings = match self.settings_repository.get_settings() {
            Ok(stored) => stored,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                debug!("No stored ledger settings, using defaults");
                LedgerSettings::default()
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = settings.validate() {
            warn!("Stored ledger settings are invalid ({}), using defaults", e);
            let defaults = LedgerSettings::default();
            self.publish(defaults.clone())?;
            return Ok(defaults);
        }

        self.publish(settings.clone())?;
        Ok(settings)
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<LedgerSettings> {
        let next = self.get_settings()?.merged(update);
        next.validate()?;

        self.settings_repository.update_settings(&next).await?;
        self.publish(next.clone())?;
        debug!("Ledger settings updated: {:?}", next);
        Ok(next)
    }
}
