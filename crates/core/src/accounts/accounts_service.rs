use chrono::Utc;
use log::{debug, error};
use std::sync::Arc;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::ledger::LedgerServiceTrait;

/// Service for managing accounts
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(
        repository: Arc<dyn AccountRepositoryTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            ledger_service,
            event_sink,
        }
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    /// Creates the account, then books its INITIAL_BALANCE movement.
    ///
    /// If the opening movement cannot be written the account is removed again,
    /// so an account never exists without the first entry of its history.
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;
        let opened_at = new_account.opened_at.unwrap_or_else(Utc::now);
        debug!(
            "Creating account '{}' for owner {} with initial balance {} {}",
            new_account.name, new_account.owner_id, new_account.initial_balance, new_account.currency
        );

        let account = self.repository.create(new_account).await?;

        if let Err(e) = self
            .ledger_service
            .open_account_ledger(&account, opened_at)
            .await
        {
            error!(
                "Failed to open ledger for account {}: {}. Rolling back account creation.",
                account.id, e
            );
            self.repository.delete(&account.id).await?;
            return Err(e);
        }

        self.event_sink
            .emit(DomainEvent::accounts_changed(vec![account.id.clone()]));
        Ok(account)
    }

    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;
        let account = self.repository.update(account_update).await?;
        self.event_sink
            .emit(DomainEvent::accounts_changed(vec![account.id.clone()]));
        Ok(account)
    }

    /// Deletes an account. Accounts that still have movements are kept:
    /// deleting them would orphan their ledger history.
    async fn delete_account(&self, account_id: &str) -> Result<()> {
        if self.ledger_service.has_movements(account_id)? {
            return Err(Error::ConstraintViolation(format!(
                "Account {} has ledger movements and cannot be deleted; deactivate it instead",
                account_id
            )));
        }
        self.repository.delete(account_id).await?;
        self.event_sink
            .emit(DomainEvent::accounts_changed(vec![account_id.to_string()]));
        Ok(())
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(account_id)
    }

    fn list_accounts(&self, owner_id: &str, active_only: bool) -> Result<Vec<Account>> {
        let active_filter = if active_only { Some(true) } else { None };
        self.repository.list(Some(owner_id), active_filter)
    }
}
