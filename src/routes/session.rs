use actix_web::{web, HttpResponse};

use crate::routes::{ApiError, AppState, Requester};

/// Configure sign-in and sign-out routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/anonymous", web::post().to(sign_in))
        .route("/auth/logout", web::post().to(sign_out));
}

/// POST /api/v1/auth/anonymous
///
/// Creates an anonymous user and returns its session. No body.
async fn sign_in(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session = state.identity.sign_in_anonymously().await.map_err(|e| {
        tracing::error!("Anonymous sign-in failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/v1/auth/logout
async fn sign_out(
    state: web::Data<AppState>,
    requester: Requester,
) -> Result<HttpResponse, ApiError> {
    state.identity.sign_out(&requester.access_token).await?;

    tracing::info!("User {} signed out", requester.id);

    Ok(HttpResponse::NoContent().finish())
}
