use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Repository, Result};
use crate::modules::auth::models::{NewUser, User, UserFilter, UserPatch};

const SELECT_USERS: &str = r#"
    SELECT id, nome, email, cpf, funcao, empresa, ativo, created_at
    FROM usuarios
    WHERE 1 = 1
"#;

/// Repository for local user profiles (`usuarios`)
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_conditions(builder: &mut QueryBuilder<'_, MySql>, filter: &UserFilter) {
        if let Some(email) = &filter.email {
            builder.push(" AND email = ").push_bind(email.clone());
        }
        if let Some(cpf) = &filter.cpf {
            builder.push(" AND cpf = ").push_bind(cpf.clone());
        }
    }
}

#[async_trait]
impl Repository<User> for MySqlUserRepository {
    async fn insert(&self, draft: NewUser) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO usuarios (nome, email, cpf, funcao, empresa, ativo, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.cpf)
        .bind(&draft.role)
        .bind(&draft.company)
        .bind(draft.active)
        .bind(draft.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store(format!("Failed to insert usuario: {}", e)))?;

        Ok(User {
            id: result.last_insert_id() as i64,
            name: draft.name,
            email: draft.email,
            cpf: draft.cpf,
            role: draft.role,
            company: draft.company,
            active: draft.active,
            created_at: draft.created_at,
        })
    }

    async fn select(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_USERS);
        Self::push_conditions(&mut builder, filter);
        builder.push(" ORDER BY nome ASC");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch usuarios: {}", e)))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_USERS);
        builder.push(" AND id = ").push_bind(id);

        let row = builder
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to fetch usuario: {}", e)))?;

        Ok(row.map(User::from))
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<User> {
        let UserPatch {
            name,
            role,
            company,
            active,
        } = patch;

        if name.is_some() || role.is_some() || company.is_some() || active.is_some() {
            let mut builder = QueryBuilder::<MySql>::new("UPDATE usuarios SET ");
            let mut fields = builder.separated(", ");
            if let Some(name) = name {
                fields.push("nome = ").push_bind_unseparated(name);
            }
            if let Some(role) = role {
                fields.push("funcao = ").push_bind_unseparated(role);
            }
            if let Some(company) = company {
                fields.push("empresa = ").push_bind_unseparated(company);
            }
            if let Some(active) = active {
                fields.push("ativo = ").push_bind_unseparated(active);
            }
            builder.push(" WHERE id = ").push_bind(id);

            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::store(format!("Failed to update usuario: {}", e)))?;
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Usuário {} não encontrado", id)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM usuarios WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete usuario: {}", e)))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Usuário {} não encontrado", id)));
        }
        Ok(())
    }

    async fn delete_where(&self, filter: &UserFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM usuarios WHERE 1 = 1");
        Self::push_conditions(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store(format!("Failed to delete usuarios: {}", e)))?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    nome: String,
    email: String,
    cpf: Option<String>,
    funcao: String,
    empresa: Option<String>,
    ativo: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.nome,
            email: row.email,
            cpf: row.cpf,
            role: row.funcao,
            company: row.empresa,
            active: row.ativo,
            created_at: row.created_at,
        }
    }
}
