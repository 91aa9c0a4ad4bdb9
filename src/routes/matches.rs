use actix_web::{web, HttpResponse};

use crate::core::{normalize_filter, whatsapp_link};
use crate::models::{FilterInput, MatchedProfile, SpinResponse};
use crate::routes::{ApiError, AppState, Requester};
use crate::services::StoreError;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches/spin", web::post().to(spin));
}

/// Spin endpoint
///
/// POST /api/v1/matches/spin
///
/// Request body:
/// ```json
/// {
///   "city": "austin",
///   "minAge": 20,
///   "maxAge": "35"
/// }
/// ```
///
/// The caller must have a profile. Responds with one random candidate and
/// its WhatsApp link, or 404 when nobody fits the filter.
async fn spin(
    state: web::Data<AppState>,
    requester: Requester,
    req: web::Json<FilterInput>,
) -> Result<HttpResponse, ApiError> {
    match state.profiles.get_profile(&requester.id).await {
        Ok(_) => {}
        Err(StoreError::NotFound(_)) => {
            return Err(ApiError::Validation(
                "Complete your profile before spinning.".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    let filter = normalize_filter(&req);

    tracing::info!(
        "Spinning for user: {}, city: {:?}, age: {}-{}",
        requester.id,
        filter.city,
        filter.min_age,
        filter.max_age
    );

    let selected = state
        .selector
        .select_match(&requester.id, &filter)
        .await
        .map_err(|e| {
            tracing::info!("Spin for {} failed: {}", requester.id, e);
            ApiError::from(e)
        })?;

    tracing::info!("Matched user {} with {}", requester.id, selected.id);

    let whatsapp_url = whatsapp_link(&selected.phone);

    Ok(HttpResponse::Ok().json(SpinResponse {
        matched: MatchedProfile::from(selected),
        whatsapp_url,
        filter,
    }))
}
