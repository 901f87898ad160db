use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder};
use std::convert::Infallible;

use crate::core::{AppError, Repository, Result};
use crate::modules::locations::models::{Location, LocationFilter, NewLocation};

/// Repository for `locais_aplicacao`
pub struct MySqlLocationRepository {
    pool: MySqlPool,
}

impl MySqlLocationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Location> for MySqlLocationRepository {
    async fn insert(&self, draft: NewLocation) -> Result<Location> {
        let result = sqlx::query("INSERT INTO locais_aplicacao (nome, created_at) VALUES (?, ?)")
            .bind(&draft.name)
            .bind(draft.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to insert local: {}", e)))?;

        Ok(Location {
            id: result.last_insert_id() as i64,
            name: draft.name,
            created_at: draft.created_at,
        })
    }

    async fn select(&self, filter: &LocationFilter) -> Result<Vec<Location>> {
        let mut builder =
            QueryBuilder::<MySql>::new("SELECT id, nome, created_at FROM locais_aplicacao WHERE 1 = 1");
        if let Some(name) = &filter.name {
            builder.push(" AND nome = ").push_bind(name.clone());
        }
        builder.push(" ORDER BY nome ASC");

        let rows = builder
            .build_query_as::<LocationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch locais: {}", e)))?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, nome, created_at FROM locais_aplicacao WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store(format!("Failed to fetch local: {}", e)))?;

        Ok(row.map(Location::from))
    }

    async fn update(&self, _id: i64, patch: Infallible) -> Result<Location> {
        match patch {}
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM locais_aplicacao WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete local: {}", e)))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Local {} não encontrado", id)));
        }
        Ok(())
    }

    async fn delete_where(&self, filter: &LocationFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM locais_aplicacao WHERE 1 = 1");
        if let Some(name) = &filter.name {
            builder.push(" AND nome = ").push_bind(name.clone());
        }

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete locais: {}", e)))?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    id: i64,
    nome: String,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.nome,
            created_at: row.created_at,
        }
    }
}
