use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MatchFilter, MatchRecord, Profile, Session};

/// Errors raised by the backing stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or answered with a failure
    #[error("{0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Queryable profile table
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// All profiles other than `requester_id` admitted by `filter`, unpaginated
    async fn find_candidates(
        &self,
        requester_id: &str,
        filter: &MatchFilter,
    ) -> Result<Vec<Profile>, StoreError>;

    async fn get_profile(&self, id: &str) -> Result<Profile, StoreError>;

    /// Insert or replace the profile keyed by its id
    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError>;
}

/// Append-only log of spins
#[async_trait]
pub trait MatchLog: Send + Sync {
    async fn record_match(&self, record: &MatchRecord) -> Result<(), StoreError>;
}

/// Binary object storage with public URLs
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` under `path` and return its public URL
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;
}

/// Anonymous identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<Session, StoreError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError>;
}
