//! Repositories for database operations
//!
//! [`Repository`] is the store capability handed to each pipeline. The
//! PostgreSQL implementations live in [`movie`] and [`user`]; [`memory`]
//! keeps rows in process.

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::{Postgres, QueryBuilder};

use crate::resource::Resource;

pub mod memory;
pub mod movie;
pub mod user;

pub use memory::MemoryRepository;
pub use movie::PgMovieRepository;
pub use user::PgUserRepository;

/// Store access for one resource kind.
///
/// Every method is a single statement; callers must not assume any two calls
/// observe the same snapshot.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// Rows satisfying every filter that is set, ordered by id
    async fn list(&self, filters: &R::Filters) -> DatabaseResult<Vec<R::Record>>;

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<R::Record>>;

    /// A row holding natural key `key`, ignoring the row `excluding` if given
    async fn find_by_key(
        &self,
        key: &str,
        excluding: Option<i64>,
    ) -> DatabaseResult<Option<R::Record>>;

    /// Insert a row and return it with its assigned id
    async fn insert(&self, draft: R::Draft) -> DatabaseResult<R::Record>;

    /// Overwrite the mergeable columns of `record`; `false` if no row matched
    async fn update(&self, record: &R::Record) -> DatabaseResult<bool>;

    /// `false` if no row matched
    async fn delete(&self, id: i64) -> DatabaseResult<bool>;

    async fn health_check(&self) -> bool;
}

/// Prefix the next predicate with `WHERE` or `AND`
fn push_predicate(query: &mut QueryBuilder<'_, Postgres>, filtered: &mut bool) {
    query.push(if *filtered { " AND " } else { " WHERE " });
    *filtered = true;
}
