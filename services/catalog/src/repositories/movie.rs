//! Movie repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::{Repository, push_predicate};
use crate::models::{Movie, MovieFilters, NewMovie};

/// Movie repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    /// Create a new movie repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Movie> for PgMovieRepository {
    async fn list(&self, filters: &MovieFilters) -> DatabaseResult<Vec<Movie>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, title, director, year, color, duration FROM movies",
        );
        let mut filtered = false;

        if let Some(color) = filters.color {
            push_predicate(&mut query, &mut filtered);
            query.push("color = ").push_bind(color);
        }
        if let Some(max_duration) = filters.max_duration {
            push_predicate(&mut query, &mut filtered);
            query.push("duration <= ").push_bind(max_duration);
        }
        query.push(" ORDER BY id");

        debug!(sql = query.sql(), "Listing movies");

        query
            .build_query_as::<Movie>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, director, year, color, duration
            FROM movies
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
        title: &str,
        excluding: Option<i64>,
    ) -> DatabaseResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, director, year, color, duration
            FROM movies
            WHERE title = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(title)
        .bind(excluding)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn insert(&self, movie: NewMovie) -> DatabaseResult<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, director, year, color, duration)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, director, year, color, duration
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(movie.year)
        .bind(movie.color)
        .bind(movie.duration)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(&self, movie: &Movie) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = $1, director = $2, year = $3, color = $4, duration = $5
            WHERE id = $6
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(movie.year)
        .bind(movie.color)
        .bind(movie.duration)
        .bind(movie.id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
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
