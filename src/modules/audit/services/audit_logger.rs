use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{AuditWarning, BusinessClock, Repository, Result};
use crate::modules::audit::models::{AuditAction, LogEntry, LogFilter, NewLogEntry};

/// Who performed an audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor {
    pub user_id: Option<i64>,
}

impl Actor {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Actions not attributable to a signed-in user
    pub fn system() -> Self {
        Self { user_id: None }
    }
}

/// What an audit record describes
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub table: &'static str,
    pub record_id: Option<i64>,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, table: &'static str, record_id: Option<i64>) -> Self {
        Self {
            action,
            table,
            record_id,
            before: None,
            after: None,
        }
    }

    pub fn before<T: Serialize>(mut self, snapshot: &T) -> Self {
        self.before = serde_json::to_value(snapshot).ok();
        self
    }

    pub fn after<T: Serialize>(mut self, snapshot: &T) -> Self {
        self.after = serde_json::to_value(snapshot).ok();
        self
    }
}

/// Appends records to the audit log.
///
/// Audit writes never fail the operation being audited: a store failure is
/// logged and handed back as an [`AuditWarning`].
#[derive(Clone)]
pub struct AuditLogger {
    logs: Arc<dyn Repository<LogEntry>>,
    clock: BusinessClock,
}

impl AuditLogger {
    pub fn new(logs: Arc<dyn Repository<LogEntry>>, clock: BusinessClock) -> Self {
        Self { logs, clock }
    }

    pub async fn record(&self, actor: Actor, event: AuditEvent) -> Option<AuditWarning> {
        let entry = NewLogEntry {
            user_id: actor.user_id,
            action: event.action,
            table: event.table.to_string(),
            record_id: event.record_id,
            before: event.before,
            after: event.after,
            created_at: self.clock.now(),
        };

        match self.logs.insert(entry).await {
            Ok(logged) => {
                debug!(
                    log_id = logged.id,
                    action = %event.action,
                    table = event.table,
                    "Audit record written"
                );
                None
            }
            Err(e) => {
                warn!(
                    action = %event.action,
                    table = event.table,
                    record_id = ?event.record_id,
                    error = %e,
                    "Failed to write audit record"
                );
                Some(AuditWarning {
                    action: event.action.to_string(),
                    table: event.table.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Audit records, newest first
    pub async fn list(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        self.logs.select(filter).await
    }
}
