pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Dashboard, MonthlyReport, ResumoNotasParcelas, TotalDeNotas};
pub use repositories::MySqlSummaryViews;
pub use services::ReportService;
