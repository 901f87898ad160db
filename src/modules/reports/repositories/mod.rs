mod report_repository;

pub use report_repository::MySqlSummaryViews;
