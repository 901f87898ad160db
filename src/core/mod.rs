pub mod calendar;
pub mod error;
pub mod money;
pub mod outcome;
pub mod tax_id;
pub mod traits;

pub use calendar::BusinessClock;
pub use error::{AppError, Result, Violations};
pub use outcome::{AuditWarning, Outcome};
pub use traits::{Record, Repository, SummaryViews};
