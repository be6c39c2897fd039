//! User repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::{Repository, push_predicate};
use crate::models::{NewUser, User, UserFilters};

/// User repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    async fn list(&self, filters: &UserFilters) -> DatabaseResult<Vec<User>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, email, firstname, lastname, city, language FROM users",
        );
        let mut filtered = false;

        if let Some(language) = filters.language() {
            push_predicate(&mut query, &mut filtered);
            query.push("language = ").push_bind(language.to_string());
        }
        query.push(" ORDER BY id");

        debug!(sql = query.sql(), "Listing users");

        query
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, firstname, lastname, city, language
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_key(
        &self,
        email: &str,
        excluding: Option<i64>,
    ) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, firstname, lastname, city, language
            FROM users
            WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(excluding)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn insert(&self, user: NewUser) -> DatabaseResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, firstname, lastname, city, language)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, firstname, lastname, city, language
            "#,
        )
        .bind(&user.email)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.city)
        .bind(&user.language)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(&self, user: &User) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $1, firstname = $2, lastname = $3, city = $4, language = $5
            WHERE id = $6
            "#,
        )
        .bind(&user.email)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.city)
        .bind(&user.language)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        common::database::health_check(&self.pool).await
    }
}
