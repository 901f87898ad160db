mod summary;

pub use summary::{Dashboard, MonthlyReport, ResumoNotasParcelas, StatusCounts, TotalDeNotas};
