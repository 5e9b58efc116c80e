//! `MockExecutor` — a scripted test double for `QueryExecutor`.
//!
//! Useful in unit tests of the repository and of callers of it, where a
//! live Postgres is either unavailable or irrelevant.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::{
    executor::{QueryExecutor, Row, Value},
    DbError,
};

/// One scripted reply, consumed in FIFO order by the next call.
pub enum MockReply {
    /// Reply to `fetch_all` with these rows.
    Rows(Vec<Row>),
    /// Reply to `execute` with this affected-row count.
    Affected(u64),
    /// Fail the call with this error.
    Fail(DbError),
}

/// A statement seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Replays scripted replies and records every statement it receives.
///
/// A call with no reply left behaves like an empty result (no rows / zero
/// rows affected), mirroring an empty table.
#[derive(Clone, Default)]
pub struct MockExecutor {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// All statements seen by this executor (in call order).
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call.
    pub fn reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn returning_rows(self, rows: Vec<Row>) -> Self {
        self.reply(MockReply::Rows(rows))
    }

    pub fn returning_affected(self, count: u64) -> Self {
        self.reply(MockReply::Affected(count))
    }

    pub fn failing(self, err: DbError) -> Self {
        self.reply(MockReply::Fail(err))
    }

    /// Number of statements executed so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Option<MockReply> {
        self.calls.lock().unwrap().push(RecordedCall {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.replies.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
        match self.record(sql, params) {
            Some(MockReply::Rows(rows)) => Ok(rows),
            Some(MockReply::Fail(err)) => Err(err),
            Some(MockReply::Affected(_)) => panic!("mock scripted a write reply for a read: {sql}"),
            None => Ok(Vec::new()),
        }
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        match self.record(sql, params) {
            Some(MockReply::Affected(count)) => Ok(count),
            Some(MockReply::Fail(err)) => Err(err),
            Some(MockReply::Rows(_)) => panic!("mock scripted a read reply for a write: {sql}"),
            None => Ok(0),
        }
    }
}
