//! In-process repository
//!
//! Rows live in an ordered map behind a lock. Ids are assigned sequentially
//! from 1 and never reused. The natural key is checked under the write lock,
//! so it holds even for concurrent writers, like a UNIQUE constraint would.

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::Repository;
use crate::resource::Resource;

struct Table<R: Resource> {
    next_id: i64,
    rows: BTreeMap<i64, R::Record>,
}

impl<R: Resource> Table<R> {
    fn find_key(&self, key: &str, excluding: Option<i64>) -> Option<&R::Record> {
        self.rows
            .values()
            .find(|row| R::key(row) == key && Some(R::id(row)) != excluding)
    }
}

/// Repository keeping rows in memory for the lifetime of the process
pub struct MemoryRepository<R: Resource> {
    table: RwLock<Table<R>>,
}

impl<R: Resource> MemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    fn conflict() -> DatabaseError {
        DatabaseError::UniqueViolation(format!("{}_{}_key", R::KIND.plural(), R::schema().key))
    }
}

impl<R: Resource> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for MemoryRepository<R> {
    async fn list(&self, filters: &R::Filters) -> DatabaseResult<Vec<R::Record>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|row| R::matches(row, filters))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<R::Record>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_key(
        &self,
        key: &str,
        excluding: Option<i64>,
    ) -> DatabaseResult<Option<R::Record>> {
        Ok(self.table.read().await.find_key(key, excluding).cloned())
    }

    async fn insert(&self, draft: R::Draft) -> DatabaseResult<R::Record> {
        let mut table = self.table.write().await;
        if table.find_key(R::draft_key(&draft), None).is_some() {
            return Err(Self::conflict());
        }

        let id = table.next_id;
        table.next_id += 1;
        let record = R::build(id, draft);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &R::Record) -> DatabaseResult<bool> {
        let mut table = self.table.write().await;
        let id = R::id(record);
        if !table.rows.contains_key(&id) {
            return Ok(false);
        }
        if table.find_key(R::key(record), Some(id)).is_some() {
            return Err(Self::conflict());
        }

        table.rows.insert(id, record.clone());
        Ok(true)
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
