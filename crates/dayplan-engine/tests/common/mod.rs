//! Shared fixtures: an instrumented in-memory service and session builders.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use dayplan_core::item::{CreateItem, UpdateItem};
use dayplan_core::user::Registration;
use dayplan_core::{Habit, ItemKey, ItemKind, Task, UserId, UserIdentity};
use dayplan_engine::{EngineConfig, FixedClock, Session};
use dayplan_service::{MemoryService, ServiceError, TrackerService};
use tokio::sync::Semaphore;

pub const USER: UserId = 42;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wraps `MemoryService`, counting calls and letting tests cut the network,
/// hold mutations in flight, or slow down reads.
pub struct TestService {
    inner: MemoryService,
    calls: Mutex<HashMap<&'static str, usize>>,
    dates: Mutex<Vec<Option<NaiveDate>>>,
    offline: AtomicBool,
    gated: AtomicBool,
    gate: Semaphore,
    read_delays: Mutex<VecDeque<Duration>>,
}

impl TestService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryService::new(),
            calls: Mutex::new(HashMap::new()),
            dates: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            read_delays: Mutex::new(VecDeque::new()),
        })
    }

    pub fn inner(&self) -> &MemoryService {
        &self.inner
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    /// `date` arguments of every `list_tasks` call, in order.
    pub fn task_dates(&self) -> Vec<Option<NaiveDate>> {
        self.dates.lock().unwrap().clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make mutations wait for `release`.
    pub fn hold_mutations(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Delay the next `list_tasks` calls by these amounts. The data is read
    /// before the delay, so a delayed response carries the older state.
    pub fn delay_reads(&self, delays: &[Duration]) {
        self.read_delays.lock().unwrap().extend(delays);
    }

    fn record(&self, name: &'static str) -> Result<(), ServiceError> {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
        if self.offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Network("connection refused".into()));
        }
        Ok(())
    }

    async fn wait_gate(&self) {
        if self.gated.load(Ordering::SeqCst) {
            self.gate.acquire().await.unwrap().forget();
        }
    }

    /// Seed a task directly, bypassing the counters.
    pub async fn seed_task(&self, title: &str, date: Option<NaiveDate>) {
        self.inner
            .add_item(
                ItemKind::Task,
                &CreateItem {
                    user_id: USER,
                    title: title.into(),
                    date,
                },
            )
            .await
            .unwrap();
    }

    pub async fn seed_habit(&self, title: &str) {
        self.inner
            .add_item(
                ItemKind::Habit,
                &CreateItem {
                    user_id: USER,
                    title: title.into(),
                    date: None,
                },
            )
            .await
            .unwrap();
    }
}

#[async_trait]
impl TrackerService for TestService {
    async fn register(&self, registration: &Registration) -> Result<(), ServiceError> {
        self.record("register")?;
        self.inner.register(registration).await
    }

    async fn list_tasks(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Task>, ServiceError> {
        self.record("list_tasks")?;
        self.dates.lock().unwrap().push(date);
        let result = self.inner.list_tasks(user_id, date).await;
        let delay = self.read_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, ServiceError> {
        self.record("list_habits")?;
        self.inner.list_habits(user_id).await
    }

    async fn add_item(&self, kind: ItemKind, input: &CreateItem) -> Result<(), ServiceError> {
        self.record("add_item")?;
        self.wait_gate().await;
        self.inner.add_item(kind, input).await
    }

    async fn toggle_item(&self, key: ItemKey) -> Result<(), ServiceError> {
        self.record("toggle_item")?;
        self.wait_gate().await;
        self.inner.toggle_item(key).await
    }

    async fn update_item(&self, key: ItemKey, update: &UpdateItem) -> Result<(), ServiceError> {
        self.record("update_item")?;
        self.wait_gate().await;
        self.inner.update_item(key, update).await
    }

    async fn delete_item(&self, key: ItemKey) -> Result<(), ServiceError> {
        self.record("delete_item")?;
        self.wait_gate().await;
        self.inner.delete_item(key).await
    }
}

/// A session for `USER` whose clock is pinned to `today`. The user is
/// already registered with the service.
pub async fn session_on(svc: &Arc<TestService>, today: NaiveDate) -> Session {
    svc.inner
        .register(&Registration {
            tg_id: USER,
            name: "ann".into(),
        })
        .await
        .unwrap();
    Session::new(
        svc.clone(),
        UserIdentity::new(USER, "ann"),
        Arc::new(FixedClock(today)),
        &EngineConfig::default(),
    )
}
