// MySQL storage for invoices (`notas`)
//
// (numero_nota, fornecedor) carries a unique index; installments reference
// the invoice with ON DELETE CASCADE, but the service still deletes them
// first so both backends behave the same.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Repository, Result};
use crate::modules::invoices::models::{Invoice, InvoiceFilter, InvoicePatch, NewInvoice};

const SELECT_INVOICES: &str = r#"
    SELECT id, numero_nota, fornecedor, valor_total, data_emissao,
           local_aplicacao, status_material, descricao, parcelado,
           qtd_parcelas, dias_primeira_parcela, intervalo_parcelas, created_at
    FROM notas
    WHERE 1 = 1
"#;

/// Repository for invoice database operations
pub struct MySqlInvoiceRepository {
    pool: MySqlPool,
}

impl MySqlInvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_conditions(builder: &mut QueryBuilder<'_, MySql>, filter: &InvoiceFilter) {
        if let Some(supplier) = &filter.supplier {
            builder.push(" AND fornecedor = ").push_bind(supplier.clone());
        }
        if let Some(number) = &filter.invoice_number {
            builder.push(" AND numero_nota = ").push_bind(number.clone());
        }
        if let Some(location_id) = filter.location_id {
            builder.push(" AND local_aplicacao = ").push_bind(location_id);
        }
        if let Some(status) = filter.material_status {
            builder.push(" AND status_material = ").push_bind(status.as_str());
        }
    }
}

#[async_trait]
impl Repository<Invoice> for MySqlInvoiceRepository {
    async fn insert(&self, draft: NewInvoice) -> Result<Invoice> {
        let result = sqlx::query(
            r#"
            INSERT INTO notas (
                numero_nota, fornecedor, valor_total, data_emissao,
                local_aplicacao, status_material, descricao, parcelado,
                qtd_parcelas, dias_primeira_parcela, intervalo_parcelas, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.invoice_number)
        .bind(&draft.supplier)
        .bind(draft.total_value)
        .bind(draft.issue_date)
        .bind(draft.location_id)
        .bind(draft.material_status.as_str())
        .bind(&draft.description)
        .bind(draft.is_installment)
        .bind(draft.installment_count)
        .bind(draft.days_to_first)
        .bind(draft.interval_days)
        .bind(draft.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store(format!("Failed to insert nota: {}", e)))?;

        Ok(Invoice {
            id: result.last_insert_id() as i64,
            invoice_number: draft.invoice_number,
            supplier: draft.supplier,
            total_value: draft.total_value,
            issue_date: draft.issue_date,
            location_id: draft.location_id,
            material_status: draft.material_status,
            description: draft.description,
            is_installment: draft.is_installment,
            installment_count: draft.installment_count,
            days_to_first: draft.days_to_first,
            interval_days: draft.interval_days,
            created_at: draft.created_at,
        })
    }

    async fn select(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_INVOICES);
        Self::push_conditions(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows = builder
            .build_query_as::<InvoiceRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch notas: {}", e)))?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_INVOICES);
        builder.push(" AND id = ").push_bind(id);

        let row = builder
            .build_query_as::<InvoiceRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch nota: {}", e)))?;

        row.map(Invoice::try_from).transpose()
    }

    async fn update(&self, id: i64, patch: InvoicePatch) -> Result<Invoice> {
        if !patch.is_empty() {
            let mut builder = QueryBuilder::<MySql>::new("UPDATE notas SET ");
            let mut fields = builder.separated(", ");
            if let Some(location_id) = patch.location_id {
                fields.push("local_aplicacao = ").push_bind_unseparated(location_id);
            }
            if let Some(status) = patch.material_status {
                fields.push("status_material = ").push_bind_unseparated(status.as_str());
            }
            builder.push(" WHERE id = ").push_bind(id);

            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::store(format!("Failed to update nota: {}", e)))?;
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nota {} não encontrada", id)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM notas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete nota: {}", e)))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Nota {} não encontrada", id)));
        }
        Ok(())
    }

    async fn delete_where(&self, filter: &InvoiceFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM notas WHERE 1 = 1");
        Self::push_conditions(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete notas: {}", e)))?;

        Ok(result.rows_affected())
    }
}

/// Database row representation for notas
#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    numero_nota: String,
    fornecedor: String,
    valor_total: Decimal,
    data_emissao: NaiveDate,
    local_aplicacao: i64,
    status_material: String,
    descricao: Option<String>,
    parcelado: bool,
    qtd_parcelas: u32,
    dias_primeira_parcela: u32,
    intervalo_parcelas: u32,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = AppError;

    fn try_from(row: InvoiceRow) -> Result<Self> {
        let material_status = row.status_material.parse().map_err(AppError::Store)?;

        Ok(Invoice {
            id: row.id,
            invoice_number: row.numero_nota,
            supplier: row.fornecedor,
            total_value: row.valor_total,
            issue_date: row.data_emissao,
            location_id: row.local_aplicacao,
            material_status,
            description: row.descricao,
            is_installment: row.parcelado,
            installment_count: row.qtd_parcelas,
            days_to_first: row.dias_primeira_parcela,
            interval_days: row.intervalo_parcelas,
            created_at: row.created_at,
        })
    }
}
