mod log_entry;

pub use log_entry::{AuditAction, LogEntry, LogFilter, NewLogEntry, DEFAULT_LOG_LIMIT};
