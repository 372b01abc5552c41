//! Product endpoints: the cached customer listing, seller and admin views,
//! and the mutation surface.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use catalog_core::{CategoryId, ProductId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth, RequireSeller};
use crate::models::{Product, ProductPatch};
use crate::services::{CatalogService, NewProduct};
use crate::state::AppState;

/// Product creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub category_id: i32,
}

impl CreateProductRequest {
    fn validate(self) -> Result<NewProduct> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_owned()));
        }
        if self.quantity < 0 {
            return Err(AppError::Validation(
                "quantity must not be negative".to_owned(),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::Validation("price must not be negative".to_owned()));
        }

        Ok(NewProduct {
            name: name.to_owned(),
            quantity: self.quantity,
            price: self.price,
            category_id: CategoryId::new(self.category_id),
        })
    }
}

/// Partial update payload. Absent fields keep their current values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateProductRequest {
    fn validate(self) -> Result<ProductPatch> {
        let name = match self.name {
            Some(name) => {
                let name = name.trim().to_owned();
                if name.is_empty() {
                    return Err(AppError::Validation("name must not be empty".to_owned()));
                }
                Some(name)
            }
            None => None,
        };
        if matches!(self.quantity, Some(q) if q < 0) {
            return Err(AppError::Validation(
                "quantity must not be negative".to_owned(),
            ));
        }
        if matches!(self.price, Some(p) if p < Decimal::ZERO) {
            return Err(AppError::Validation("price must not be negative".to_owned()));
        }

        let patch = ProductPatch {
            name,
            quantity: self.quantity,
            price: self.price,
            category_id: self.category_id.map(CategoryId::new),
            is_active: self.is_active,
        };

        if patch.is_empty() {
            return Err(AppError::Validation(
                "at least one field must be provided".to_owned(),
            ));
        }

        Ok(patch)
    }
}

/// Query parameters for the customer listing.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub category: Option<i32>,
}

/// Query parameters for the admin listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListingQuery {
    pub seller_id: Option<i32>,
}

/// Create a product owned by the calling seller.
///
/// POST /product/create (seller only)
///
/// The SKU is allocated server-side from the product name.
///
/// # Errors
///
/// Returns `400` for an invalid payload and `404` for an unknown category.
pub async fn create(
    State(state): State<AppState>,
    RequireSeller(caller): RequireSeller,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = payload.validate()?;

    let catalog = CatalogService::new(state.pool(), state.cache());
    let product = catalog.create(input, caller).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// The customer listing of active products, optionally filtered by category.
///
/// GET /product?category= (public)
///
/// Served from the listing cache; mutations invalidate it.
///
/// # Errors
///
/// Returns `500` if the listing cannot be loaded.
pub async fn list_available(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<Product>>> {
    let catalog = CatalogService::new(state.pool(), state.cache());
    let products = catalog
        .list_available(query.category.map(CategoryId::new))
        .await?;

    Ok(Json(products.as_ref().clone()))
}

/// Products owned by the calling seller, active or not.
///
/// GET /product/my-products (seller only)
///
/// # Errors
///
/// Returns `401` without a valid token and `403` for non-sellers.
pub async fn my_products(
    State(state): State<AppState>,
    RequireSeller(caller): RequireSeller,
) -> Result<Json<Vec<Product>>> {
    let catalog = CatalogService::new(state.pool(), state.cache());
    let products = catalog.list_owned(caller.id).await?;

    Ok(Json(products))
}

/// Every product, optionally filtered by seller.
///
/// GET /product/admin-products?sellerId= (administrator only)
///
/// # Errors
///
/// Returns `401` without a valid token and `403` for non-administrators.
pub async fn admin_products(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    Query(query): Query<AdminListingQuery>,
) -> Result<Json<Vec<Product>>> {
    let catalog = CatalogService::new(state.pool(), state.cache());
    let products = catalog.list_all(query.seller_id.map(UserId::new)).await?;

    Ok(Json(products))
}

/// Apply a partial update to a product.
///
/// PUT /product/update/{id}
///
/// # Errors
///
/// Returns `403` unless the caller owns the product or is an administrator,
/// `404` for an unknown product, `400` for an invalid payload.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let patch = payload.validate()?;

    let catalog = CatalogService::new(state.pool(), state.cache());
    let product = catalog.update(ProductId::new(id), patch, caller).await?;

    Ok(Json(product))
}

/// Delete a product.
///
/// DELETE /product/delete/{id}
///
/// # Errors
///
/// Same ownership rule as update.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let catalog = CatalogService::new(state.pool(), state.cache());
    let message = catalog.delete(ProductId::new(id), caller).await?;

    Ok(Json(json!({ "message": message })))
}
