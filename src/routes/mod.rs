// Route exports
pub mod error;
pub mod matches;
pub mod profiles;
pub mod session;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest, HttpResponse, Responder};
use std::future::{ready, Ready};
use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::core::MatchSelector;
use crate::models::HealthResponse;
use crate::services::{FileStore, IdentityProvider, MatchLog, ProfileStore};

pub use error::{ApiError, handle_json_payload_error, handle_query_payload_error};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub files: Arc<dyn FileStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub selector: MatchSelector,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        matches: Arc<dyn MatchLog>,
        files: Arc<dyn FileStore>,
        identity: Arc<dyn IdentityProvider>,
        verifier: TokenVerifier,
    ) -> Self {
        Self {
            selector: MatchSelector::new(profiles.clone(), matches),
            profiles,
            files,
            identity,
            verifier: Arc::new(verifier),
        }
    }
}

/// The authenticated caller, taken from the bearer token
#[derive(Debug, Clone)]
pub struct Requester {
    pub id: String,
    pub access_token: String,
}

impl FromRequest for Requester {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(ApiError::Upstream("Application state missing".to_string())));
        };

        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let result = state
            .verifier
            .verify_header(header)
            .map(|(access_token, claims)| Requester {
                id: claims.sub,
                access_token,
            })
            .map_err(|e| {
                tracing::debug!("Rejected request to {}: {}", req.path(), e);
                ApiError::from(e)
            });

        ready(result)
    }
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(session::configure)
            .configure(profiles::configure)
            .configure(matches::configure),
    );
}
