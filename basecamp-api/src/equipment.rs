use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use basecamp_core::{Equipment, EquipmentDraft, EquipmentFilter};
use std::path::Path;
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiPath, ApiQuery},
    middleware::{require_admin, require_auth},
    response::{created, message, ok, ApiCreated, ApiResult},
    state::{AppState, UploadConfig},
};

/// Room for the text fields next to the largest accepted image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

const UPLOADS_PREFIX: &str = "/uploads/";

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/equipment", get(list_equipment))
        .route("/equipment/{id}", get(get_equipment));

    let admin = Router::new()
        .route("/equipment", post(create_equipment))
        .route("/equipment/{id}", put(update_equipment).delete(delete_equipment))
        .route_layer(DefaultBodyLimit::max(state.uploads.max_image_bytes + FORM_OVERHEAD_BYTES))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth));

    public.merge(admin)
}

struct ImageUpload {
    extension: &'static str,
    bytes: Vec<u8>,
}

struct EquipmentForm {
    draft: EquipmentDraft,
    image: Option<ImageUpload>,
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::ValidationError(format!("{} must be a whole number", field)))
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(AppError::ValidationError(format!("available must be true or false, got {}", other))),
    }
}

fn image_extension(content_type: &str) -> Option<&'static str> {
    let subtype = content_type.strip_prefix("image/")?;
    Some(match subtype {
        "png" => "png",
        "jpeg" | "jpg" => "jpg",
        "gif" => "gif",
        "webp" => "webp",
        "svg+xml" => "svg",
        _ => "img",
    })
}

async fn read_form(mut multipart: Multipart, max_image_bytes: usize) -> Result<EquipmentForm, AppError> {
    let mut draft = EquipmentDraft::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if name == "image" {
            let content_type = field.content_type().unwrap_or("").to_string();
            let bytes = field.bytes().await?;
            // An empty file input still submits a part
            if bytes.is_empty() {
                continue;
            }
            let extension = image_extension(&content_type).ok_or_else(|| {
                AppError::ValidationError(format!("image must have an image/* content type, got {:?}", content_type))
            })?;
            if bytes.len() > max_image_bytes {
                return Err(AppError::ValidationError(format!(
                    "image exceeds the maximum size of {} bytes",
                    max_image_bytes
                )));
            }
            image = Some(ImageUpload { extension, bytes: bytes.to_vec() });
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => draft.name = Some(value),
            "description" => draft.description = Some(value),
            "category" => draft.category = Some(value),
            "price_cents" => draft.price_cents = Some(parse_number("price_cents", &value)?),
            "rental_price_cents" => draft.rental_price_cents = Some(parse_number("rental_price_cents", &value)?),
            "quantity" => draft.quantity = Some(parse_number("quantity", &value)?),
            "available" => draft.available = Some(parse_flag(&value)?),
            other => tracing::debug!("Ignoring unknown equipment field {}", other),
        }
    }

    Ok(EquipmentForm { draft, image })
}

/// Writes the image under a fresh name and returns its public URL.
async fn store_image(uploads: &UploadConfig, image: ImageUpload) -> Result<String, AppError> {
    tokio::fs::create_dir_all(&uploads.dir).await?;
    let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
    tokio::fs::write(uploads.dir.join(&file_name), &image.bytes).await?;

    tracing::debug!("Stored image {} ({} bytes)", file_name, image.bytes.len());
    Ok(format!("{}{}", UPLOADS_PREFIX, file_name))
}

async fn remove_image(uploads: &UploadConfig, url: &str) {
    let Some(file_name) = url.strip_prefix(UPLOADS_PREFIX) else {
        return;
    };
    // Only plain file names we generated ourselves
    if Path::new(file_name).file_name().map(|n| n == file_name).unwrap_or(false) {
        if let Err(e) = tokio::fs::remove_file(uploads.dir.join(file_name)).await {
            tracing::warn!("Could not remove image {}: {}", file_name, e);
        }
    }
}

async fn list_equipment(
    State(state): State<AppState>,
    ApiQuery(mut filter): ApiQuery<EquipmentFilter>,
) -> ApiResult<Vec<Equipment>> {
    filter.category = filter.category.filter(|c| !c.trim().is_empty());
    Ok(ok(state.repos.equipment.list_equipment(&filter).await?))
}

async fn get_equipment(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Equipment> {
    let equipment = state
        .repos
        .equipment
        .get_equipment(id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment"))?;
    Ok(ok(equipment))
}

async fn create_equipment(State(state): State<AppState>, multipart: Multipart) -> ApiCreated<Equipment> {
    let form = read_form(multipart, state.uploads.max_image_bytes).await?;
    let mut equipment = Equipment::from_draft(form.draft)?;

    if let Some(image) = form.image {
        equipment.image_url = Some(store_image(&state.uploads, image).await?);
    }

    if let Err(e) = state.repos.equipment.create_equipment(&equipment).await {
        if let Some(url) = &equipment.image_url {
            remove_image(&state.uploads, url).await;
        }
        return Err(e.into());
    }
    tracing::info!("Created equipment {} ({})", equipment.id, equipment.name);
    Ok(created(equipment))
}

async fn update_equipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> ApiResult<Equipment> {
    let form = read_form(multipart, state.uploads.max_image_bytes).await?;
    let mut equipment = state
        .repos
        .equipment
        .get_equipment(id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment"))?;

    equipment.apply(form.draft)?;

    let stored = match form.image {
        Some(image) => Some(store_image(&state.uploads, image).await?),
        None => None,
    };
    let replaced = match &stored {
        Some(url) => equipment.image_url.replace(url.clone()),
        None => None,
    };

    let outcome = match state.repos.equipment.update_equipment(&equipment).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::not_found("Equipment")),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = outcome {
        if let Some(url) = &stored {
            remove_image(&state.uploads, url).await;
        }
        return Err(e);
    }

    if let Some(old) = replaced {
        remove_image(&state.uploads, &old).await;
    }

    Ok(ok(equipment))
}

async fn delete_equipment(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<()> {
    let equipment = state
        .repos
        .equipment
        .get_equipment(id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment"))?;

    if !state.repos.equipment.delete_equipment(id).await? {
        return Err(AppError::not_found("Equipment"));
    }
    if let Some(url) = equipment.image_url.as_deref() {
        remove_image(&state.uploads, url).await;
    }

    tracing::info!("Deleted equipment {}", id);
    Ok(message("Equipment deleted"))
}
