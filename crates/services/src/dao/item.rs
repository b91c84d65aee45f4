use bson::{doc, oid::ObjectId, DateTime};
use chrono::{Duration, Utc};
use foodwise_db::models::Item;
use mongodb::Database;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct ItemDao {
    pub base: BaseDao<Item>,
}

impl ItemDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Item::COLLECTION),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        owner_id: ObjectId,
        name: String,
        category: String,
        quantity: f64,
        unit: String,
        purchase_date: Option<DateTime>,
        expiry_date: DateTime,
        low_stock_threshold: Option<f64>,
    ) -> DaoResult<Item> {
        let now = DateTime::now();
        let item = Item {
            id: None,
            owner_id,
            name,
            category,
            quantity,
            unit,
            purchase_date,
            expiry_date,
            low_stock_threshold,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&item).await?;
        self.base.find_by_id(id).await
    }

    pub async fn get_owned(&self, owner_id: ObjectId, item_id: ObjectId) -> DaoResult<Item> {
        self.base.find_owned(owner_id, item_id).await
    }

    pub async fn list(
        &self,
        owner_id: ObjectId,
        category: Option<String>,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Item>> {
        let mut filter = doc! { "owner_id": owner_id };
        if let Some(category) = category {
            filter.insert("category", category);
        }
        self.base
            .find_paginated(filter, doc! { "expiry_date": 1 }, params)
            .await
    }

    pub async fn list_all(&self, owner_id: ObjectId) -> DaoResult<Vec<Item>> {
        self.base
            .find_many(doc! { "owner_id": owner_id }, Some(doc! { "expiry_date": 1 }))
            .await
    }

    pub async fn update(
        &self,
        owner_id: ObjectId,
        item_id: ObjectId,
        update: bson::Document,
    ) -> DaoResult<Item> {
        self.base
            .update_owned(owner_id, item_id, doc! { "$set": update })
            .await?;
        self.get_owned(owner_id, item_id).await
    }

    pub async fn delete(&self, owner_id: ObjectId, item_id: ObjectId) -> DaoResult<bool> {
        self.base.delete_owned(owner_id, item_id).await
    }

    /// Items with `now < expiry_date <= now + window_days`, soonest first.
    /// Already-expired items never show up here; they belong to the
    /// expired bucket.
    pub async fn find_expiring_items(
        &self,
        owner_id: ObjectId,
        window_days: i64,
    ) -> DaoResult<Vec<Item>> {
        self.base
            .find_many(
                expiring_filter(owner_id, window_days, Utc::now()),
                Some(doc! { "expiry_date": 1 }),
            )
            .await
    }

    /// Items whose expiry date has already passed, soonest-expired first.
    pub async fn find_expired_items(&self, owner_id: ObjectId) -> DaoResult<Vec<Item>> {
        self.base
            .find_many(
                doc! {
                    "owner_id": owner_id,
                    "expiry_date": { "$lt": DateTime::now() },
                },
                Some(doc! { "expiry_date": 1 }),
            )
            .await
    }

    /// Items at or below their low-stock threshold. Items without a
    /// threshold are never flagged. Order unspecified.
    pub async fn find_low_stock_items(&self, owner_id: ObjectId) -> DaoResult<Vec<Item>> {
        self.base
            .find_many(
                doc! {
                    "owner_id": owner_id,
                    "low_stock_threshold": { "$ne": null },
                    "$expr": { "$lte": ["$quantity", "$low_stock_threshold"] },
                },
                None,
            )
            .await
    }
}

/// Half-open reminder window `(now, now + window_days]`. The lower bound is
/// strictly greater than `now` so already-expired items stay in the expired
/// bucket and never double-count.
fn expiring_filter(
    owner_id: ObjectId,
    window_days: i64,
    now: chrono::DateTime<Utc>,
) -> bson::Document {
    let threshold = now + Duration::days(window_days);
    doc! {
        "owner_id": owner_id,
        "expiry_date": {
            "$gt": DateTime::from_chrono(now),
            "$lte": DateTime::from_chrono(threshold),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiring_window_excludes_now_and_includes_the_far_bound() {
        let owner = ObjectId::new();
        let now = Utc::now();

        let filter = expiring_filter(owner, 3, now);
        let range = filter.get_document("expiry_date").unwrap();

        assert_eq!(range.len(), 2);
        assert_eq!(range.get_datetime("$gt").unwrap(), &DateTime::from_chrono(now));
        assert_eq!(
            range.get_datetime("$lte").unwrap(),
            &DateTime::from_chrono(now + Duration::days(3)),
        );
        assert_eq!(filter.get_object_id("owner_id").unwrap(), owner);
    }

    #[test]
    fn zero_day_window_collapses_to_an_empty_range() {
        let now = Utc::now();
        let filter = expiring_filter(ObjectId::new(), 0, now);
        let range = filter.get_document("expiry_date").unwrap();

        // $gt now together with $lte now matches nothing
        assert_eq!(
            range.get_datetime("$gt").unwrap(),
            range.get_datetime("$lte").unwrap(),
        );
    }
}
