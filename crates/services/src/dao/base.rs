use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation: {0}")]
    Validation(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_PER_PAGE: u64 = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: u64,
    pub per_page: u64,
}

impl PaginationParams {
    /// Page numbers are 1-based; 0 is treated as the first page.
    fn skip(&self) -> u64 {
        self.page.max(1).saturating_sub(1) * self.per_page
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

fn map_insert_err(e: mongodb::error::Error) -> DaoError {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
        ref write_error,
    )) = *e.kind
    {
        if write_error.code == 11000 {
            return DaoError::DuplicateKey(write_error.message.clone());
        }
    }
    DaoError::Mongo(e)
}

/// Typed access to one collection. Owner-scoped variants exist for the
/// documents that carry an `owner_id`; lookups through them can never
/// cross user boundaries.
pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_owned(&self, owner_id: ObjectId, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id, "owner_id": owner_id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> DaoResult<Vec<T>> {
        let find = self.collection.find(filter);
        let cursor = match sort {
            Some(sort) => find.sort(sort).await?,
            None => find.await?,
        };
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_paginated(
        &self,
        filter: Document,
        sort: Document,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<T>> {
        let total = self.collection.count_documents(filter.clone()).await?;

        let cursor = self
            .collection
            .find(filter)
            .sort(sort)
            .skip(params.skip())
            .limit(params.per_page as i64)
            .await?;
        let items = cursor.try_collect().await?;

        Ok(PaginatedResult {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages: total.div_ceil(params.per_page.max(1)),
        })
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .map_err(map_insert_err)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or(DaoError::Validation("inserted_id is not an ObjectId".to_string()))?;
        debug!(?id, "Inserted document");
        Ok(id)
    }

    /// Applies `update`, stamping `updated_at` into its `$set` clause.
    pub async fn update_one(&self, filter: Document, mut update: Document) -> DaoResult<bool> {
        if let Ok(set) = update.get_document_mut("$set") {
            set.insert("updated_at", bson::DateTime::now());
        } else {
            update.insert("$set", doc! { "updated_at": bson::DateTime::now() });
        }

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.modified_count > 0)
    }

    pub async fn update_by_id(&self, id: ObjectId, update: Document) -> DaoResult<bool> {
        self.update_one(doc! { "_id": id }, update).await
    }

    pub async fn update_owned(
        &self,
        owner_id: ObjectId,
        id: ObjectId,
        update: Document,
    ) -> DaoResult<bool> {
        self.update_one(doc! { "_id": id, "owner_id": owner_id }, update)
            .await
    }

    pub async fn delete_owned(&self, owner_id: ObjectId, id: ObjectId) -> DaoResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id, "owner_id": owner_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}
