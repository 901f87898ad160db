use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result, SummaryViews};
use crate::modules::reports::models::{ResumoNotasParcelas, TotalDeNotas};

/// Reads the aggregate views maintained by the database
pub struct MySqlSummaryViews {
    pool: MySqlPool,
}

impl MySqlSummaryViews {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryViews for MySqlSummaryViews {
    async fn total_de_notas(&self) -> Result<TotalDeNotas> {
        let row = sqlx::query_as::<_, TotalDeNotas>("SELECT total_de_notas FROM vw_total_de_notas")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to read vw_total_de_notas: {}", e)))?;

        Ok(row.unwrap_or_default())
    }

    async fn resumo_notas_parcelas(&self) -> Result<ResumoNotasParcelas> {
        let row = sqlx::query_as::<_, ResumoNotasParcelas>(
            r#"
            SELECT total_em_estoque, total_em_uso, total_de_notas, total_a_pagar
            FROM vw_resumo_notas_parcelas
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store(format!("Failed to read vw_resumo_notas_parcelas: {}", e)))?;

        Ok(row.unwrap_or_default())
    }
}
