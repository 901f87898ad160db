use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;

use crate::core::Record;

/// Default page size for audit log listings
pub const DEFAULT_LOG_LIMIT: u32 = 100;

/// Kind of event recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Login,
    Register,
    Logout,
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Register => "REGISTER",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOGIN" => Ok(AuditAction::Login),
            "REGISTER" => Ok(AuditAction::Register),
            "LOGOUT" => Ok(AuditAction::Logout),
            "CREATE" => Ok(AuditAction::Create),
            "UPDATE" => Ok(AuditAction::Update),
            "DELETE" => Ok(AuditAction::Delete),
            _ => Err(format!("Invalid audit action: {}", s)),
        }
    }
}

/// One row of `logs_sistema`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: AuditAction,
    pub table: String,
    pub record_id: Option<i64>,
    /// Snapshot before the change
    pub before: Option<Value>,
    /// Snapshot after the change
    pub after: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLogEntry {
    pub user_id: Option<i64>,
    pub action: AuditAction,
    pub table: String,
    pub record_id: Option<i64>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Log selection; results are newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogFilter {
    pub user_id: Option<i64>,
    pub action: Option<AuditAction>,
    pub table: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl LogFilter {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LOG_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

impl Record for LogEntry {
    type Draft = NewLogEntry;
    /// The log is append-only
    type Patch = Infallible;
    type Filter = LogFilter;

    const TABLE: &'static str = "logs_sistema";

    fn id(&self) -> i64 {
        self.id
    }
}
