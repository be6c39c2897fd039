//! Mutation pipeline
//!
//! Each write runs a fixed sequence of independent store queries and stops at
//! the first failure:
//!
//! - create: uniqueness, validation, insert
//! - update: uniqueness (excluding the target row), existence, validation,
//!   merge, update
//! - delete: delete by id
//!
//! The order decides which error wins when several conditions fail at once.
//! No transaction spans the sequence; the store's unique constraints close
//! the gap between the uniqueness check and the write.

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult, Operation},
    repositories::Repository,
    resource::Resource,
    validation::{Mode, Payload, validate},
};

/// Read and write operations for one resource kind
pub struct Pipeline<R: Resource> {
    repository: Arc<dyn Repository<R>>,
}

impl<R: Resource> Clone for Pipeline<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: Resource> Pipeline<R> {
    pub fn new(repository: Arc<dyn Repository<R>>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, filters: &R::Filters) -> ApiResult<Vec<R::Record>> {
        self.repository
            .list(filters)
            .await
            .map_err(|e| ApiError::store(Operation::List, R::KIND, e))
    }

    /// Read path lookup; absence is reported as [`ApiError::Missing`]
    pub async fn get(&self, id: i64) -> ApiResult<R::Record> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| ApiError::store(Operation::Retrieve, R::KIND, e))?
            .ok_or(ApiError::Missing(R::KIND))
    }

    pub async fn create(&self, payload: &Payload) -> ApiResult<R::Record> {
        self.ensure_unique(payload, None, Operation::Create).await?;

        let values = validate(R::schema(), payload, Mode::Create)?;
        let draft = R::draft(values)?;

        let record = self
            .repository
            .insert(draft)
            .await
            .map_err(|e| ApiError::store(Operation::Create, R::KIND, e))?;

        info!(kind = %R::KIND, id = R::id(&record), "Created");
        Ok(record)
    }

    pub async fn update(&self, id: i64, payload: &Payload) -> ApiResult<R::Record> {
        self.ensure_unique(payload, Some(id), Operation::Update).await?;
        let existing = self.resolve(id, Operation::Update).await?;

        let values = validate(R::schema(), payload, Mode::Update)?;
        let merged = R::merge(existing, R::changes(values));

        let updated = self
            .repository
            .update(&merged)
            .await
            .map_err(|e| ApiError::store(Operation::Update, R::KIND, e))?;
        if !updated {
            // Deleted between the existence check and the update
            return Err(ApiError::NotFound { kind: R::KIND, id });
        }

        info!(kind = %R::KIND, id, "Updated");
        Ok(merged)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|e| ApiError::store(Operation::Delete, R::KIND, e))?;
        if !deleted {
            return Err(ApiError::NotFound { kind: R::KIND, id });
        }

        info!(kind = %R::KIND, id, "Deleted");
        Ok(())
    }

    pub async fn health_check(&self) -> bool {
        self.repository.health_check().await
    }

    /// Fail with [`ApiError::DuplicateKey`] if another row holds the payload's
    /// natural key. Skipped when the key is absent or not a string; validation
    /// reports those.
    async fn ensure_unique(
        &self,
        payload: &Payload,
        excluding: Option<i64>,
        operation: Operation,
    ) -> ApiResult<()> {
        let Some(key) = payload.get(R::schema().key).and_then(Value::as_str) else {
            return Ok(());
        };

        let holder = self
            .repository
            .find_by_key(key, excluding)
            .await
            .map_err(|e| ApiError::store(operation, R::KIND, e))?;

        match holder {
            Some(_) => Err(ApiError::DuplicateKey(R::KIND)),
            None => Ok(()),
        }
    }

    /// Fetch the row a write targets, or fail with [`ApiError::NotFound`]
    async fn resolve(&self, id: i64, operation: Operation) -> ApiResult<R::Record> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| ApiError::store(operation, R::KIND, e))?
            .ok_or(ApiError::NotFound { kind: R::KIND, id })
    }
}
