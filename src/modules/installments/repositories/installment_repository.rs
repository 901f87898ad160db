// MySQL storage for installments (`parcelas`)
//
// Rows are returned ordered by (nota_id, numero).

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Repository, Result};
use crate::modules::installments::models::{
    Installment, InstallmentFilter, InstallmentPatch, NewInstallment,
};

const SELECT_INSTALLMENTS: &str = r#"
    SELECT id, nota_id, numero, valor, data_vencimento, status,
           data_pagamento, status_material
    FROM parcelas
    WHERE 1 = 1
"#;

/// Repository for installment database operations
pub struct MySqlInstallmentRepository {
    pool: MySqlPool,
}

impl MySqlInstallmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_conditions(builder: &mut QueryBuilder<'_, MySql>, filter: &InstallmentFilter) {
        if let Some(invoice_id) = filter.invoice_id {
            builder.push(" AND nota_id = ").push_bind(invoice_id);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(from) = filter.due_from {
            builder.push(" AND data_vencimento >= ").push_bind(from);
        }
        if let Some(before) = filter.due_before {
            builder.push(" AND data_vencimento < ").push_bind(before);
        }
    }
}

#[async_trait]
impl Repository<Installment> for MySqlInstallmentRepository {
    async fn insert(&self, draft: NewInstallment) -> Result<Installment> {
        let result = sqlx::query(
            r#"
            INSERT INTO parcelas (
                nota_id, numero, valor, data_vencimento, status, status_material
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.invoice_id)
        .bind(draft.number)
        .bind(draft.value)
        .bind(draft.due_date)
        .bind(draft.status.as_str())
        .bind(draft.material_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store(format!("Failed to insert parcela: {}", e)))?;

        Ok(Installment {
            id: result.last_insert_id() as i64,
            invoice_id: draft.invoice_id,
            number: draft.number,
            value: draft.value,
            due_date: draft.due_date,
            status: draft.status,
            payment_date: None,
            material_status: draft.material_status,
        })
    }

    /// All rows in one transaction: either the whole schedule lands or none
    async fn insert_batch(&self, drafts: Vec<NewInstallment>) -> Result<Vec<Installment>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::store(format!("Failed to start transaction: {}", e)))?;

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let result = sqlx::query(
                r#"
                INSERT INTO parcelas (
                    nota_id, numero, valor, data_vencimento, status, status_material
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(draft.invoice_id)
            .bind(draft.number)
            .bind(draft.value)
            .bind(draft.due_date)
            .bind(draft.status.as_str())
            .bind(draft.material_status.as_str())
            .execute(tx.as_mut())
            .await
            .map_err(|e| AppError::store(format!("Failed to insert parcela: {}", e)))?;

            created.push(Installment {
                id: result.last_insert_id() as i64,
                invoice_id: draft.invoice_id,
                number: draft.number,
                value: draft.value,
                due_date: draft.due_date,
                status: draft.status,
                payment_date: None,
                material_status: draft.material_status,
            });
        }

        tx.commit()
            .await
            .map_err(|e| AppError::store(format!("Failed to commit transaction: {}", e)))?;

        Ok(created)
    }

    async fn select(&self, filter: &InstallmentFilter) -> Result<Vec<Installment>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_INSTALLMENTS);
        Self::push_conditions(&mut builder, filter);
        builder.push(" ORDER BY nota_id ASC, numero ASC");

        let rows = builder
            .build_query_as::<InstallmentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch parcelas: {}", e)))?;

        rows.into_iter().map(Installment::try_from).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Installment>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_INSTALLMENTS);
        builder.push(" AND id = ").push_bind(id);

        let row = builder
            .build_query_as::<InstallmentRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch parcela: {}", e)))?;

        row.map(Installment::try_from).transpose()
    }

    async fn update(&self, id: i64, patch: InstallmentPatch) -> Result<Installment> {
        if !patch.is_empty() {
            let mut builder = QueryBuilder::<MySql>::new("UPDATE parcelas SET ");
            let mut fields = builder.separated(", ");
            if let Some(value) = patch.value {
                fields.push("valor = ").push_bind_unseparated(value);
            }
            if let Some(due_date) = patch.due_date {
                fields.push("data_vencimento = ").push_bind_unseparated(due_date);
            }
            if let Some(status) = patch.status {
                fields.push("status = ").push_bind_unseparated(status.as_str());
            }
            if let Some(payment_date) = patch.payment_date {
                fields.push("data_pagamento = ").push_bind_unseparated(payment_date);
            }
            if let Some(material_status) = patch.material_status {
                fields
                    .push("status_material = ")
                    .push_bind_unseparated(material_status.as_str());
            }
            builder.push(" WHERE id = ").push_bind(id);

            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::store(format!("Failed to update parcela: {}", e)))?;
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Parcela {} não encontrada", id)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM parcelas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete parcela: {}", e)))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Parcela {} não encontrada", id)));
        }
        Ok(())
    }

    async fn delete_where(&self, filter: &InstallmentFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM parcelas WHERE 1 = 1");
        Self::push_conditions(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete parcelas: {}", e)))?;

        Ok(result.rows_affected())
    }
}

/// Database row representation for parcelas
#[derive(sqlx::FromRow)]
struct InstallmentRow {
    id: i64,
    nota_id: i64,
    numero: u32,
    valor: Decimal,
    data_vencimento: NaiveDate,
    status: String,
    data_pagamento: Option<NaiveDate>,
    status_material: String,
}

impl TryFrom<InstallmentRow> for Installment {
    type Error = AppError;

    fn try_from(row: InstallmentRow) -> Result<Self> {
        let status = row.status.parse().map_err(AppError::Store)?;
        let material_status = row.status_material.parse().map_err(AppError::Store)?;

        Ok(Installment {
            id: row.id,
            invoice_id: row.nota_id,
            number: row.numero,
            value: row.valor,
            due_date: row.data_vencimento,
            status,
            payment_date: row.data_pagamento,
            material_status,
        })
    }
}
