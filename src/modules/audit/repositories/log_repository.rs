// MySQL storage for the audit log (`logs_sistema`)
//
// Snapshots are stored as JSON text. Rows are never updated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder};
use std::convert::Infallible;

use crate::core::{AppError, Repository, Result};
use crate::modules::audit::models::{LogEntry, LogFilter, NewLogEntry};

const SELECT_LOGS: &str = r#"
    SELECT id, usuario_id, acao, tabela, registro_id,
           dados_anteriores, dados_novos, created_at
    FROM logs_sistema
    WHERE 1 = 1
"#;

pub struct MySqlLogRepository {
    pool: MySqlPool,
}

impl MySqlLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_conditions(builder: &mut QueryBuilder<'_, MySql>, filter: &LogFilter) {
        if let Some(user_id) = filter.user_id {
            builder.push(" AND usuario_id = ").push_bind(user_id);
        }
        if let Some(action) = filter.action {
            builder.push(" AND acao = ").push_bind(action.as_str());
        }
        if let Some(table) = &filter.table {
            builder.push(" AND tabela = ").push_bind(table.clone());
        }
    }
}

#[async_trait]
impl Repository<LogEntry> for MySqlLogRepository {
    async fn insert(&self, draft: NewLogEntry) -> Result<LogEntry> {
        let before = draft.before.as_ref().map(serde_json::to_string).transpose()?;
        let after = draft.after.as_ref().map(serde_json::to_string).transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO logs_sistema (
                usuario_id, acao, tabela, registro_id,
                dados_anteriores, dados_novos, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.user_id)
        .bind(draft.action.as_str())
        .bind(&draft.table)
        .bind(draft.record_id)
        .bind(before)
        .bind(after)
        .bind(draft.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store(format!("Failed to insert log: {}", e)))?;

        Ok(LogEntry {
            id: result.last_insert_id() as i64,
            user_id: draft.user_id,
            action: draft.action,
            table: draft.table,
            record_id: draft.record_id,
            before: draft.before,
            after: draft.after,
            created_at: draft.created_at,
        })
    }

    async fn select(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_LOGS);
        Self::push_conditions(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.limit())
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let rows = builder
            .build_query_as::<LogRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch logs: {}", e)))?;

        rows.into_iter().map(LogEntry::try_from).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LogEntry>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_LOGS);
        builder.push(" AND id = ").push_bind(id);

        let row = builder
            .build_query_as::<LogRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch log: {}", e)))?;

        row.map(LogEntry::try_from).transpose()
    }

    async fn update(&self, _id: i64, patch: Infallible) -> Result<LogEntry> {
        match patch {}
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM logs_sistema WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete log: {}", e)))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Log {} not found", id)));
        }
        Ok(())
    }

    async fn delete_where(&self, filter: &LogFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM logs_sistema WHERE 1 = 1");
        Self::push_conditions(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete logs: {}", e)))?;

        Ok(result.rows_affected())
    }
}

/// Database row representation for logs_sistema
#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    usuario_id: Option<i64>,
    acao: String,
    tabela: String,
    registro_id: Option<i64>,
    dados_anteriores: Option<String>,
    dados_novos: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LogRow> for LogEntry {
    type Error = AppError;

    fn try_from(row: LogRow) -> Result<Self> {
        let action = row.acao.parse().map_err(AppError::Store)?;
        let snapshot = |text: Option<String>| -> Result<Option<serde_json::Value>> {
            text.map(|t| {
                serde_json::from_str(&t)
                    .map_err(|e| AppError::store(format!("Invalid log snapshot: {}", e)))
            })
            .transpose()
        };

        Ok(LogEntry {
            id: row.id,
            user_id: row.usuario_id,
            action,
            table: row.tabela,
            record_id: row.registro_id,
            before: snapshot(row.dados_anteriores)?,
            after: snapshot(row.dados_novos)?,
            created_at: row.created_at,
        })
    }
}
