//! In-memory repositories shared by the service tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use crate::accounts::{Account, AccountRepositoryTrait, AccountUpdate, NewAccount};
use crate::errors::{DatabaseError, Error, Result};
use crate::events::MockDomainEventSink;
use crate::ledger::{LedgerService, Movement, MovementRepositoryTrait, NewMovement};
use crate::plans::{NewPlan, Plan, PlanRepositoryTrait, PlanUpdate};
use crate::settings::{LedgerSettings, SharedSettings};
use crate::trades::{TradeRepositoryTrait, TradeResult};
use crate::utils::ScopeUnit;

pub fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn shared_settings(settings: LedgerSettings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}

pub fn account(id: &str, initial_balance: Decimal) -> Account {
    Account {
        id: id.to_string(),
        owner_id: "trader-1".to_string(),
        name: format!("Account {}", id),
        currency: "USD".to_string(),
        initial_balance,
        is_active: true,
        ..Default::default()
    }
}

pub fn plan(id: &str, account_id: &str, allocated_pl: Decimal) -> Plan {
    Plan {
        id: id.to_string(),
        account_id: account_id.to_string(),
        name: None,
        allocated_pl,
        cycle_goal_percent: Decimal::from(10),
        cycle_stop_percent: Decimal::from(5),
        period_goal_percent: Decimal::from(5),
        period_stop_percent: Decimal::from(2),
        risk_per_trade_percent: None,
        target_reward_ratio: None,
        period_unit: ScopeUnit::Month,
        cycle_unit: ScopeUnit::Quarter,
        is_active: true,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

fn not_found(what: &str, id: &str) -> Error {
    Error::Database(DatabaseError::NotFound(format!("{} {}", what, id)))
}

// --- Accounts ---

#[derive(Default)]
pub struct MockAccountRepository {
    accounts: Mutex<Vec<Account>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, account: Account) {
        self.accounts.lock().unwrap().push(account);
    }

    pub fn replace(&self, account: Account) {
        let mut accounts = self.accounts.lock().unwrap();
        accounts.retain(|a| a.id != account.id);
        accounts.push(account);
    }

    pub fn count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountRepositoryTrait for MockAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        let now = Utc::now().naive_utc();
        let account = Account {
            id: new_account
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            owner_id: new_account.owner_id,
            name: new_account.name,
            currency: new_account.currency,
            kind: new_account.kind,
            initial_balance: new_account.initial_balance,
            is_active: new_account.is_active,
            created_at: now,
            updated_at: now,
        };
        self.accounts.lock().unwrap().push(account.clone());
        Ok(account)
    }

    async fn update(&self, account_update: AccountUpdate) -> Result<Account> {
        let id = account_update.id.clone().unwrap_or_default();
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("account", &id))?;
        account.name = account_update.name;
        account.kind = account_update.kind;
        account.is_active = account_update.is_active;
        account.updated_at = Utc::now().naive_utc();
        Ok(account.clone())
    }

    async fn delete(&self, account_id: &str) -> Result<usize> {
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| a.id != account_id);
        Ok(before - accounts.len())
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or_else(|| not_found("account", account_id))
    }

    fn list(&self, owner_id: Option<&str>, is_active_filter: Option<bool>) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| owner_id.map_or(true, |owner| a.owner_id == owner))
            .filter(|a| is_active_filter.map_or(true, |active| a.is_active == active))
            .cloned()
            .collect())
    }
}

// --- Movements ---

/// Append-only store assigning per-account insertion sequences.
#[derive(Default)]
pub struct MockMovementRepository {
    movements: Mutex<Vec<Movement>>,
    fail_appends: AtomicBool,
    list_calls: AtomicUsize,
}

impl MockMovementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// How many times `list_by_account` was called.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<Movement> {
        self.movements.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovementRepositoryTrait for MockMovementRepository {
    async fn append(&self, new_movement: NewMovement) -> Result<Movement> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::TransactionFailed(
                "append rejected".to_string(),
            )));
        }
        let mut movements = self.movements.lock().unwrap();
        let sequence = movements
            .iter()
            .filter(|m| m.account_id == new_movement.account_id)
            .map(|m| m.sequence)
            .max()
            .unwrap_or(0)
            + 1;
        let movement = Movement {
            id: new_movement
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: new_movement.account_id,
            sequence,
            effective_date: new_movement.effective_date,
            description: new_movement.description,
            kind: new_movement.kind,
        };
        movements.push(movement.clone());
        Ok(movement)
    }

    fn list_by_account(&self, account_id: &str) -> Result<Vec<Movement>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .movements
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.account_id == account_id)
            .cloned()
            .collect())
    }

    fn list_by_trade(&self, trade_id: &str) -> Result<Vec<Movement>> {
        Ok(self
            .movements
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.trade_id() == Some(trade_id))
            .cloned()
            .collect())
    }
}

// --- Plans ---

#[derive(Default)]
pub struct MockPlanRepository {
    plans: Mutex<Vec<Plan>>,
}

impl MockPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, plan: Plan) {
        self.plans.lock().unwrap().push(plan);
    }
}

#[async_trait]
impl PlanRepositoryTrait for MockPlanRepository {
    async fn create(&self, new_plan: NewPlan) -> Result<Plan> {
        let now = Utc::now().naive_utc();
        let plan = Plan {
            id: new_plan.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: new_plan.account_id,
            name: new_plan.name,
            allocated_pl: new_plan.allocated_pl,
            cycle_goal_percent: new_plan.cycle_goal_percent,
            cycle_stop_percent: new_plan.cycle_stop_percent,
            period_goal_percent: new_plan.period_goal_percent,
            period_stop_percent: new_plan.period_stop_percent,
            risk_per_trade_percent: new_plan.risk_per_trade_percent,
            target_reward_ratio: new_plan.target_reward_ratio,
            period_unit: new_plan.period_unit,
            cycle_unit: new_plan.cycle_unit,
            is_active: new_plan.is_active,
            created_at: now,
            updated_at: now,
        };
        self.plans.lock().unwrap().push(plan.clone());
        Ok(plan)
    }

    async fn update(&self, plan_update: PlanUpdate) -> Result<Plan> {
        let mut plans = self.plans.lock().unwrap();
        let plan = plans
            .iter_mut()
            .find(|p| p.id == plan_update.id)
            .ok_or_else(|| not_found("plan", &plan_update.id))?;
        plan.name = plan_update.name;
        plan.allocated_pl = plan_update.allocated_pl;
        plan.cycle_goal_percent = plan_update.cycle_goal_percent;
        plan.cycle_stop_percent = plan_update.cycle_stop_percent;
        plan.period_goal_percent = plan_update.period_goal_percent;
        plan.period_stop_percent = plan_update.period_stop_percent;
        plan.risk_per_trade_percent = plan_update.risk_per_trade_percent;
        plan.target_reward_ratio = plan_update.target_reward_ratio;
        plan.period_unit = plan_update.period_unit;
        plan.cycle_unit = plan_update.cycle_unit;
        plan.is_active = plan_update.is_active;
        plan.updated_at = Utc::now().naive_utc();
        Ok(plan.clone())
    }

    fn get_by_id(&self, plan_id: &str) -> Result<Plan> {
        self.plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == plan_id)
            .cloned()
            .ok_or_else(|| not_found("plan", plan_id))
    }

    fn list_by_account(&self, account_id: &str, active_only: bool) -> Result<Vec<Plan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.account_id == account_id)
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect())
    }
}

// --- Trades ---

#[derive(Default)]
pub struct MockTradeRepository {
    trades: Mutex<Vec<TradeResult>>,
}

impl MockTradeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, trade: TradeResult) {
        self.trades.lock().unwrap().push(trade);
    }
}

impl TradeRepositoryTrait for MockTradeRepository {
    fn list_by_account(&self, account_id: &str) -> Result<Vec<TradeResult>> {
        Ok(self
            .trades
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect())
    }
}

/// A ledger service wired to fresh in-memory repositories.
pub struct LedgerFixture {
    pub accounts: Arc<MockAccountRepository>,
    pub movements: Arc<MockMovementRepository>,
    pub plans: Arc<MockPlanRepository>,
    pub settings: SharedSettings,
    pub events: MockDomainEventSink,
    pub ledger: Arc<LedgerService>,
}

impl LedgerFixture {
    pub fn new(settings: LedgerSettings) -> Self {
        let accounts = Arc::new(MockAccountRepository::new());
        let movements = Arc::new(MockMovementRepository::new());
        let plans = Arc::new(MockPlanRepository::new());
        let settings = shared_settings(settings);
        let events = MockDomainEventSink::new();
        let ledger = Arc::new(LedgerService::new(
            movements.clone(),
            accounts.clone(),
            plans.clone(),
            settings.clone(),
            Arc::new(events.clone()),
        ));
        Self {
            accounts,
            movements,
            plans,
            settings,
            events,
            ledger,
        }
    }
}
