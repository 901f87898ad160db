use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Repository, Result};
use crate::modules::suppliers::models::{NewSupplier, Supplier, SupplierFilter, SupplierPatch};

const SELECT_SUPPLIERS: &str = r#"
    SELECT id, nome, cnpj, telefone, vendedor, created_at
    FROM fornecedores
    WHERE 1 = 1
"#;

/// Repository for `fornecedores`
pub struct MySqlSupplierRepository {
    pool: MySqlPool,
}

impl MySqlSupplierRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_conditions(builder: &mut QueryBuilder<'_, MySql>, filter: &SupplierFilter) {
        if let Some(name) = &filter.name {
            builder
                .push(" AND LOWER(nome) LIKE ")
                .push_bind(format!("%{}%", name.to_lowercase()));
        }
        if let Some(cnpj) = &filter.cnpj {
            builder.push(" AND cnpj = ").push_bind(cnpj.clone());
        }
        if let Some(salesperson) = &filter.salesperson {
            builder
                .push(" AND LOWER(vendedor) LIKE ")
                .push_bind(format!("%{}%", salesperson.to_lowercase()));
        }
    }
}

#[async_trait]
impl Repository<Supplier> for MySqlSupplierRepository {
    async fn insert(&self, draft: NewSupplier) -> Result<Supplier> {
        let result = sqlx::query(
            "INSERT INTO fornecedores (nome, cnpj, telefone, vendedor, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(&draft.cnpj)
        .bind(&draft.phone)
        .bind(&draft.salesperson)
        .bind(draft.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store(format!("Failed to insert fornecedor: {}", e)))?;

        Ok(Supplier {
            id: result.last_insert_id() as i64,
            name: draft.name,
            cnpj: draft.cnpj,
            phone: draft.phone,
            salesperson: draft.salesperson,
            created_at: draft.created_at,
        })
    }

    async fn select(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_SUPPLIERS);
        Self::push_conditions(&mut builder, filter);
        builder.push(" ORDER BY nome ASC, id ASC");

        let rows = builder
            .build_query_as::<SupplierRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch fornecedores: {}", e)))?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Supplier>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_SUPPLIERS);
        builder.push(" AND id = ").push_bind(id);

        let row = builder
            .build_query_as::<SupplierRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch fornecedor: {}", e)))?;

        Ok(row.map(Supplier::from))
    }

    async fn update(&self, id: i64, patch: SupplierPatch) -> Result<Supplier> {
        let SupplierPatch {
            name,
            cnpj,
            phone,
            salesperson,
        } = patch;

        if name.is_some() || cnpj.is_some() || phone.is_some() || salesperson.is_some() {
            let mut builder = QueryBuilder::<MySql>::new("UPDATE fornecedores SET ");
            let mut fields = builder.separated(", ");
            if let Some(name) = name {
                fields.push("nome = ").push_bind_unseparated(name);
            }
            if let Some(cnpj) = cnpj {
                fields.push("cnpj = ").push_bind_unseparated(cnpj);
            }
            if let Some(phone) = phone {
                fields.push("telefone = ").push_bind_unseparated(phone);
            }
            if let Some(salesperson) = salesperson {
                fields.push("vendedor = ").push_bind_unseparated(salesperson);
            }
            builder.push(" WHERE id = ").push_bind(id);

            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::store(format!("Failed to update fornecedor: {}", e)))?;
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Fornecedor {} não encontrado", id)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM fornecedores WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete fornecedor: {}", e)))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Fornecedor {} não encontrado", id)));
        }
        Ok(())
    }

    async fn delete_where(&self, filter: &SupplierFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM fornecedores WHERE 1 = 1");
        Self::push_conditions(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete fornecedores: {}", e)))?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct SupplierRow {
    id: i64,
    nome: String,
    cnpj: String,
    telefone: String,
    vendedor: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.nome,
            cnpj: row.cnpj,
            phone: row.telefone,
            salesperson: row.vendedor,
            created_at: row.created_at,
        }
    }
}
