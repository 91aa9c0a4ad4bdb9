use actix_web::{http::header, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::core::{parse_age, placeholder_avatar};
use crate::models::{AvatarResponse, Profile, ProfileForm, MAX_AGE, MIN_AGE};
use crate::routes::error::INCOMPLETE_PROFILE_MESSAGE;
use crate::routes::{ApiError, AppState, Requester};

/// Largest accepted avatar upload
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Configure profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles/me", web::get().to(get_profile))
        .route("/profiles/me", web::put().to(save_profile))
        .service(
            web::resource("/profiles/me/avatar")
                .app_data(web::PayloadConfig::new(MAX_AVATAR_BYTES))
                .route(web::post().to(upload_avatar)),
        );
}

/// GET /api/v1/profiles/me
async fn get_profile(
    state: web::Data<AppState>,
    requester: Requester,
) -> Result<HttpResponse, ApiError> {
    let profile = state.profiles.get_profile(&requester.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Build the stored profile from a form, checking it first
pub fn profile_from_form(owner_id: &str, form: &ProfileForm) -> Result<Profile, ApiError> {
    if form.is_incomplete() {
        return Err(ApiError::Validation(INCOMPLETE_PROFILE_MESSAGE.to_string()));
    }

    form.validate()
        .map_err(|errors| ApiError::Validation(errors.to_string()))?;

    let age = parse_age(form.age.as_ref())
        .ok_or_else(|| ApiError::Validation("age: must be a whole number".to_string()))?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ApiError::Validation(format!(
            "age: must be between {} and {}",
            MIN_AGE, MAX_AGE
        )));
    }

    let name = form.name.trim().to_string();
    let avatar_url = match form.avatar_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => placeholder_avatar(&name),
    };

    Ok(Profile {
        id: owner_id.to_string(),
        city: form.city.trim().to_string(),
        age,
        phone: form.full_phone(),
        avatar_url,
        name,
    })
}

/// PUT /api/v1/profiles/me
///
/// Request body:
/// ```json
/// {
///   "name": "Ada",
///   "city": "Lagos",
///   "age": 24,
///   "phone": "8012345678",
///   "countryCode": "+234",
///   "avatarUrl": "https://..."
/// }
/// ```
async fn save_profile(
    state: web::Data<AppState>,
    requester: Requester,
    req: web::Json<ProfileForm>,
) -> Result<HttpResponse, ApiError> {
    let profile = profile_from_form(&requester.id, &req).map_err(|e| {
        tracing::info!("Profile validation failed for {}: {}", requester.id, e);
        e
    })?;

    let saved = state.profiles.upsert_profile(&profile).await?;

    tracing::info!("Saved profile for user {}", requester.id);

    Ok(HttpResponse::Ok().json(saved))
}

/// POST /api/v1/profiles/me/avatar
///
/// The raw request body is the image; its `Content-Type` is kept.
async fn upload_avatar(
    state: web::Data<AppState>,
    requester: Requester,
    http_req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Validation("Avatar upload is empty".to_string()));
    }

    let content_type = http_req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let path = format!("avatars/{}", uuid::Uuid::new_v4());
    let avatar_url = state
        .files
        .upload(&path, body.to_vec(), &content_type)
        .await?;

    tracing::info!("Uploaded avatar for {} ({} bytes)", requester.id, body.len());

    Ok(HttpResponse::Created().json(AvatarResponse { avatar_url }))
}
