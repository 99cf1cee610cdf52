//! Scripted in-memory store for exercising the engine without a driver.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::entity::{Column, Creatable, Entity};
use crate::error::DataError;
use crate::param::SqlType;
use crate::plan::{CountPlan, InsertPlan, SelectPlan};
use crate::record::Record;
use crate::store::{RecordStore, StoreTx};

#[derive(Default)]
struct Script {
    calls: Vec<&'static str>,
    selects: Vec<SelectPlan>,
    counts: Vec<CountPlan>,
    inserts: Vec<InsertPlan>,
    count_results: VecDeque<Result<u64, DataError>>,
    fetch_results: VecDeque<Result<Vec<Record>, DataError>>,
    insert_results: VecDeque<Result<i64, DataError>>,
    commit_error: Option<DataError>,
    delay: Option<Duration>,
    fetch_delay: Option<Duration>,
}

/// Returns queued results in order and records every plan it receives.
#[derive(Clone, Default)]
pub(crate) struct ScriptedStore {
    script: Arc<Mutex<Script>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().unwrap();
        f(&mut script)
    }

    pub fn push_count(&self, result: Result<u64, DataError>) -> &Self {
        self.with(|s| s.count_results.push_back(result));
        self
    }

    pub fn push_fetch(&self, result: Result<Vec<Record>, DataError>) -> &Self {
        self.with(|s| s.fetch_results.push_back(result));
        self
    }

    pub fn push_insert(&self, result: Result<i64, DataError>) -> &Self {
        self.with(|s| s.insert_results.push_back(result));
        self
    }

    pub fn fail_commit(&self, err: DataError) {
        self.with(|s| s.commit_error = Some(err));
    }

    /// Delay every call, for timeout tests on a paused clock.
    pub fn delay(&self, delay: Duration) {
        self.with(|s| s.delay = Some(delay));
    }

    /// Delay only fetches, so a create can time out on its read-back.
    pub fn delay_fetch(&self, delay: Duration) {
        self.with(|s| s.fetch_delay = Some(delay));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.with(|s| s.calls.clone())
    }

    pub fn selects(&self) -> Vec<SelectPlan> {
        self.with(|s| s.selects.clone())
    }

    pub fn counts(&self) -> Vec<CountPlan> {
        self.with(|s| s.counts.clone())
    }

    pub fn inserts(&self) -> Vec<InsertPlan> {
        self.with(|s| s.inserts.clone())
    }

    async fn pause(&self) {
        if let Some(delay) = self.with(|s| s.delay) {
            tokio::time::sleep(delay).await;
        }
    }

    async fn do_fetch(
        &self,
        call: &'static str,
        plan: &SelectPlan,
    ) -> Result<Vec<Record>, DataError> {
        self.pause().await;
        if let Some(delay) = self.with(|s| s.fetch_delay) {
            tokio::time::sleep(delay).await;
        }
        self.with(|s| {
            s.calls.push(call);
            s.selects.push(plan.clone());
            s.fetch_results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        })
    }
}

impl RecordStore for ScriptedStore {
    type Tx = ScriptedTx;

    async fn fetch(&self, plan: &SelectPlan) -> Result<Vec<Record>, DataError> {
        self.do_fetch("fetch", plan).await
    }

    async fn count(&self, plan: &CountPlan) -> Result<u64, DataError> {
        self.pause().await;
        self.with(|s| {
            s.calls.push("count");
            s.counts.push(plan.clone());
            s.count_results.pop_front().unwrap_or(Ok(0))
        })
    }

    async fn begin(&self) -> Result<ScriptedTx, DataError> {
        self.with(|s| s.calls.push("begin"));
        Ok(ScriptedTx { store: self.clone() })
    }
}

pub(crate) struct ScriptedTx {
    store: ScriptedStore,
}

impl StoreTx for ScriptedTx {
    async fn insert(&mut self, plan: &InsertPlan) -> Result<i64, DataError> {
        self.store.pause().await;
        self.store.with(|s| {
            s.calls.push("tx.insert");
            s.inserts.push(plan.clone());
            s.insert_results.pop_front().unwrap_or(Ok(1))
        })
    }

    async fn fetch(&mut self, plan: &SelectPlan) -> Result<Vec<Record>, DataError> {
        self.store.do_fetch("tx.fetch", plan).await
    }

    async fn commit(self) -> Result<(), DataError> {
        self.store.with(|s| {
            s.calls.push("tx.commit");
            s.commit_error.take().map_or(Ok(()), Err)
        })
    }

    async fn rollback(self) -> Result<(), DataError> {
        self.store.with(|s| s.calls.push("tx.rollback"));
        Ok(())
    }
}

/// Minimal entity used by the component tests.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Gadget {
    pub id: i64,
    pub name: String,
}

pub(crate) const GADGET_NAME: Column = Column::new("name", SqlType::VarChar(20));

const GADGET_COLUMNS: [Column; 2] = [Column::new("id", SqlType::Integer), GADGET_NAME];

impl Entity for Gadget {
    fn table_name() -> &'static str {
        "gadgets"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [Column] {
        &GADGET_COLUMNS
    }

    fn from_record(record: Record) -> Result<Self, DataError> {
        Ok(Self {
            id: record.get_i64("id")?,
            name: record.get_str("name")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Creatable for Gadget {
    type Draft = String;

    fn insert_values(
        draft: &String,
    ) -> Result<Vec<(&'static str, crate::param::BindParam)>, DataError> {
        Ok(vec![("name", GADGET_NAME.bind(draft.as_str())?)])
    }
}

pub(crate) fn gadget(id: i64, name: &str) -> Record {
    Record::new().with("id", id).with("name", name)
}
