use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use foodwise_db::models::Item;
use foodwise_services::dao::base::PaginationParams;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub purchase_date: Option<String>,
    pub expiry_date: String,
    pub low_stock_threshold: Option<f64>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: item.name,
            category: item.category,
            quantity: item.quantity,
            unit: item.unit,
            purchase_date: item
                .purchase_date
                .and_then(|d| d.try_to_rfc3339_string().ok()),
            expiry_date: item
                .expiry_date
                .try_to_rfc3339_string()
                .unwrap_or_default(),
            low_stock_threshold: item.low_stock_threshold,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub purchase_date: Option<DateTime<Utc>>,
    pub expiry_date: DateTime<Utc>,
    pub low_stock_threshold: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub low_stock_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

fn parse_item_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid item id".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let result = state
        .items
        .list(auth.user_id, query.category, &pagination)
        .await?;

    let items: Vec<ItemResponse> = result.items.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    })))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let item = state
        .items
        .create(
            auth.user_id,
            body.name,
            body.category,
            body.quantity,
            body.unit,
            body.purchase_date.map(bson::DateTime::from_chrono),
            bson::DateTime::from_chrono(body.expiry_date),
            body.low_stock_threshold,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item_id = parse_item_id(&item_id)?;
    let item = state.items.get_owned(auth.user_id, item_id).await?;
    Ok(Json(item.into()))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let item_id = parse_item_id(&item_id)?;

    let mut update = bson::Document::new();
    if let Some(name) = body.name {
        update.insert("name", name);
    }
    if let Some(category) = body.category {
        update.insert("category", category);
    }
    if let Some(quantity) = body.quantity {
        update.insert("quantity", quantity);
    }
    if let Some(unit) = body.unit {
        update.insert("unit", unit);
    }
    if let Some(purchase_date) = body.purchase_date {
        update.insert("purchase_date", bson::DateTime::from_chrono(purchase_date));
    }
    if let Some(expiry_date) = body.expiry_date {
        update.insert("expiry_date", bson::DateTime::from_chrono(expiry_date));
    }
    if let Some(threshold) = body.low_stock_threshold {
        update.insert("low_stock_threshold", threshold);
    }

    if update.is_empty() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }

    let item = state.items.update(auth.user_id, item_id, update).await?;
    Ok(Json(item.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let item_id = parse_item_id(&item_id)?;
    if !state.items.delete(auth.user_id, item_id).await? {
        return Err(ApiError::NotFound("Item not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn expiring(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let days = query
        .days
        .unwrap_or(state.settings.notifier.default_reminder_days);
    if days < 0 {
        return Err(ApiError::BadRequest("days must be non-negative".to_string()));
    }

    let items = state.items.find_expiring_items(auth.user_id, days).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn expired(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.items.find_expired_items(auth.user_id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn low_stock(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.items.find_low_stock_items(auth.user_id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}
