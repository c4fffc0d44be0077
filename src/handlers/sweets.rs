use std::path::Path as FsPath;
use std::time::Instant;

use axum::{
    extract::{
        multipart::Field, FromRequest, Multipart, Path, Query, Request, State,
    },
    http::{header, StatusCode},
    Json,
};
use tracing::info;

use crate::{
    db,
    error::{AppError, AppResult},
    models::{CreateSweet, SearchFilters, SortField, SortOrder, SortQuery, StockChange, Sweet, UpdateSweet},
    uploads, AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_sweets(State(state): State<AppState>) -> AppResult<Json<Vec<Sweet>>> {
    let start = Instant::now();
    let sweets = db::fetch_all_sweets(&state.db).await?;

    info!(
        count = sweets.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed sweets"
    );

    Ok(Json(sweets))
}

// ── Create ────────────────────────────────────────────────────────────────────

/// Accepts either a JSON body (`image` as a URL string) or multipart form
/// data carrying the same fields plus an optional `image` file part.
pub async fn create_sweet(
    State(state): State<AppState>,
    req: Request,
) -> AppResult<(StatusCode, Json<Sweet>)> {
    let start = Instant::now();

    let payload = if is_multipart(&req) {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let form = collect_form(multipart, &state.config.upload_dir).await?;
        CreateSweet {
            sweet_id: required(form.sweet_id, "sweetId")?,
            name: required(form.name, "name")?,
            category: required(form.category, "category")?,
            price: required(form.price, "price")?,
            quantity: required(form.quantity, "quantity")?,
            description: form.description,
            image: form.image,
        }
    } else {
        let Json(payload) = Json::<CreateSweet>::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        payload
    };

    payload.validate()?;
    let sweet = db::insert_sweet(&state.db, &payload).await?;

    info!(
        sweet_id = %sweet.sweet_id,
        name = %sweet.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Created sweet"
    );

    Ok((StatusCode::CREATED, Json(sweet)))
}

// ── Search / sort ─────────────────────────────────────────────────────────────

pub async fn search_sweets(
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
) -> AppResult<Json<Vec<Sweet>>> {
    let start = Instant::now();
    let sweets = db::search_sweets(&state.db, &filters).await?;

    info!(
        count = sweets.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Searched sweets"
    );

    Ok(Json(sweets))
}

pub async fn sort_sweets(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> AppResult<Json<Vec<Sweet>>> {
    let field = SortField::parse(&query.sort_by).ok_or_else(|| {
        AppError::BadRequest(format!(
            "sortBy must be one of name, category, price, quantity (got {})",
            query.sort_by
        ))
    })?;
    let order = SortOrder::parse(query.order.as_deref())
        .ok_or_else(|| AppError::BadRequest("order must be asc or desc".to_string()))?;

    let sweets = db::sort_sweets(&state.db, field, order).await?;

    info!(sort_by = field.column(), order = order.sql(), "Sorted sweets");

    Ok(Json(sweets))
}

// ── Stock mutations ───────────────────────────────────────────────────────────

pub async fn purchase_sweet(
    State(state): State<AppState>,
    Json(payload): Json<StockChange>,
) -> AppResult<Json<Sweet>> {
    payload.validate()?;
    let sweet = db::purchase_sweet(&state.db, &payload.sweet_id, payload.quantity).await?;

    info!(
        sweet_id = %sweet.sweet_id,
        purchased = payload.quantity,
        remaining = sweet.quantity,
        "Purchased sweet"
    );

    Ok(Json(sweet))
}

pub async fn restock_sweet(
    State(state): State<AppState>,
    Json(payload): Json<StockChange>,
) -> AppResult<Json<Sweet>> {
    payload.validate()?;
    let sweet = db::restock_sweet(&state.db, &payload.sweet_id, payload.quantity).await?;

    info!(
        sweet_id = %sweet.sweet_id,
        restocked = payload.quantity,
        on_hand = sweet.quantity,
        "Restocked sweet"
    );

    Ok(Json(sweet))
}

// ── Get / update / delete by business key ─────────────────────────────────────

pub async fn get_sweet(
    State(state): State<AppState>,
    Path(sweet_id): Path<String>,
) -> AppResult<Json<Sweet>> {
    let sweet = db::fetch_sweet(&state.db, &sweet_id).await?;
    Ok(Json(sweet))
}

pub async fn update_sweet(
    State(state): State<AppState>,
    Path(sweet_id): Path<String>,
    req: Request,
) -> AppResult<Json<Sweet>> {
    let payload = if is_multipart(&req) {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let form = collect_form(multipart, &state.config.upload_dir).await?;
        UpdateSweet {
            name: form.name,
            category: form.category,
            price: form.price,
            quantity: form.quantity,
            description: form.description,
            image: form.image,
        }
    } else {
        let Json(payload) = Json::<UpdateSweet>::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        payload
    };

    payload.validate()?;
    let sweet = db::update_sweet(&state.db, &sweet_id, &payload).await?;

    info!(sweet_id = %sweet.sweet_id, "Updated sweet");

    Ok(Json(sweet))
}

pub async fn delete_sweet(
    State(state): State<AppState>,
    Path(sweet_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    db::delete_sweet(&state.db, &sweet_id).await?;

    info!(sweet_id = %sweet_id, "Deleted sweet");

    Ok(Json(serde_json::json!({ "message": "Sweet deleted" })))
}

// ── Multipart plumbing ────────────────────────────────────────────────────────

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

#[derive(Default)]
struct FormFields {
    sweet_id: Option<String>,
    name: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    quantity: Option<i32>,
    description: Option<String>,
    image: Option<String>,
}

/// Walk the multipart fields shared by create and update. An `image` part
/// with a file name is persisted to disk and replaced by its public
/// reference; an `image` text part is taken as a URL. Unknown fields are
/// ignored.
async fn collect_form(mut multipart: Multipart, upload_dir: &FsPath) -> AppResult<FormFields> {
    let mut form = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "sweetId" => form.sweet_id = Some(text(field).await?),
            "name" => form.name = Some(text(field).await?),
            "category" => form.category = Some(text(field).await?),
            "price" => {
                let raw = text(field).await?;
                form.price = Some(raw.trim().parse().map_err(|_| {
                    AppError::BadRequest("price must be a number".to_string())
                })?);
            }
            "quantity" => {
                let raw = text(field).await?;
                form.quantity = Some(raw.trim().parse().map_err(|_| {
                    AppError::BadRequest("quantity must be an integer".to_string())
                })?);
            }
            "description" => {
                let value = text(field).await?;
                if !value.is_empty() {
                    form.description = Some(value);
                }
            }
            "image" => {
                if let Some(file_name) = field.file_name().map(str::to_string) {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.image = Some(uploads::save_image(upload_dir, &file_name, &bytes).await?);
                } else {
                    let url = text(field).await?;
                    if !url.is_empty() {
                        form.image = Some(url);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}
