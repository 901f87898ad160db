pub mod repository;

pub use repository::{Record, Repository, SummaryViews};
