use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{MatchFilter, MatchRecord, Profile, Session};
use crate::services::store::{FileStore, IdentityProvider, MatchLog, ProfileStore, StoreError};

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound(what) => StoreError::NotFound(what),
            SupabaseError::Unauthorized(what) => StoreError::Unauthorized(what),
            other => StoreError::Transport(other.to_string()),
        }
    }
}

/// Table names in the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub profiles: String,
    pub matches: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            profiles: "profiles".to_string(),
            matches: "matches".to_string(),
        }
    }
}

/// Supabase REST client
///
/// Talks to the three Supabase services the app relies on:
/// - PostgREST for the `profiles` and `matches` tables
/// - GoTrue for anonymous sign-in and sign-out
/// - Storage for avatar uploads
///
/// Table and storage calls use the service key; auth calls use the anon key.
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    service_key: String,
    avatar_bucket: String,
    tables: SupabaseTables,
    client: Client,
}

/// GoTrue session payload
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: u64,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        anon_key: String,
        service_key: String,
        avatar_bucket: String,
        tables: SupabaseTables,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            service_key,
            avatar_bucket,
            tables,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Public URL of an object in the avatar bucket
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.avatar_bucket, path
        )
    }

    fn with_service_key(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Turn a non-success response into an error, keeping the body for context
    async fn check(response: Response, action: &str) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Supabase {} failed: {} - {}", action, status, body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SupabaseError::Unauthorized(format!("{}: {}", action, status))
            }
            StatusCode::NOT_FOUND => SupabaseError::NotFound(format!("{}: {}", action, status)),
            _ => SupabaseError::ApiError(format!("Failed to {}: {}", action, status)),
        })
    }

    /// Parse a PostgREST row array, skipping rows that do not fit `Profile`
    fn parse_profiles(json: Value) -> Result<Vec<Profile>, SupabaseError> {
        let rows = json
            .as_array()
            .ok_or_else(|| SupabaseError::InvalidResponse("Expected a row array".into()))?;

        let total = rows.len();
        let profiles: Vec<Profile> = rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect();

        if profiles.len() != total {
            tracing::debug!("Skipped {} malformed profile rows", total - profiles.len());
        }

        Ok(profiles)
    }

    /// Query every profile matching the filter, excluding the requester
    pub async fn query_candidates(
        &self,
        requester_id: &str,
        filter: &MatchFilter,
    ) -> Result<Vec<Profile>, SupabaseError> {
        let mut params: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("id", format!("neq.{}", requester_id)),
            ("age", format!("gte.{}", filter.min_age)),
            ("age", format!("lte.{}", filter.max_age)),
        ];

        if let Some(city) = filter.city.as_deref() {
            params.push(("city", format!("ilike.*{}*", escape_like(city))));
        }

        let response = self
            .with_service_key(self.client.get(self.table_url(&self.tables.profiles)))
            .query(&params)
            .send()
            .await?;

        let response = Self::check(response, "query candidates").await?;
        let json: Value = response.json().await?;
        let profiles = Self::parse_profiles(json)?;

        tracing::debug!("Queried {} candidates for {}", profiles.len(), requester_id);

        Ok(profiles)
    }

    /// Get a single profile by id
    pub async fn fetch_profile(&self, id: &str) -> Result<Profile, SupabaseError> {
        tracing::debug!("Fetching profile for user: {}", id);

        let response = self
            .with_service_key(self.client.get(self.table_url(&self.tables.profiles)))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
            .send()
            .await?;

        let response = Self::check(response, "fetch profile").await?;
        let json: Value = response.json().await?;

        Self::parse_profiles(json)?
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("Profile not found for user {}", id)))
    }

    /// Insert or merge a profile keyed by id
    pub async fn save_profile(&self, profile: &Profile) -> Result<Profile, SupabaseError> {
        let response = self
            .with_service_key(self.client.post(self.table_url(&self.tables.profiles)))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[profile])
            .send()
            .await?;

        let response = Self::check(response, "upsert profile").await?;
        let json: Value = response.json().await?;

        let saved = Self::parse_profiles(json)?
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::InvalidResponse("Upsert returned no rows".into()))?;

        tracing::debug!("Upserted profile {}", saved.id);

        Ok(saved)
    }

    /// Append a match row
    pub async fn insert_match(&self, record: &MatchRecord) -> Result<(), SupabaseError> {
        let response = self
            .with_service_key(self.client.post(self.table_url(&self.tables.matches)))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        Self::check(response, "record match").await?;

        tracing::debug!("Recorded match: {} -> {}", record.requester_id, record.candidate_id);

        Ok(())
    }

    /// Upload an object into the avatar bucket and return its public URL
    pub async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, SupabaseError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.avatar_bucket, path
        );

        let response = self
            .with_service_key(self.client.post(&url))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        Self::check(response, "upload avatar").await?;

        Ok(self.public_url(path))
    }

    /// Create an anonymous user and return its session
    pub async fn signup_anonymous(&self) -> Result<Session, SupabaseError> {
        let url = format!("{}/auth/v1/signup", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let response = Self::check(response, "sign in anonymously").await?;
        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse session: {}", e)))?;

        tracing::info!("Anonymous user signed in: {}", auth.user.id);

        Ok(Session {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            expires_in: auth.expires_in,
            user_id: auth.user.id,
        })
    }

    /// Revoke the session behind an access token
    pub async fn logout(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::check(response, "sign out").await?;
        Ok(())
    }
}

/// Escape LIKE metacharacters so user text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            // PostgREST reads `*` as `%`
            '*' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn find_candidates(
        &self,
        requester_id: &str,
        filter: &MatchFilter,
    ) -> Result<Vec<Profile>, StoreError> {
        Ok(self.query_candidates(requester_id, filter).await?)
    }

    async fn get_profile(&self, id: &str) -> Result<Profile, StoreError> {
        Ok(self.fetch_profile(id).await?)
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        Ok(self.save_profile(profile).await?)
    }
}

#[async_trait]
impl MatchLog for SupabaseClient {
    async fn record_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        Ok(self.insert_match(record).await?)
    }
}

#[async_trait]
impl FileStore for SupabaseClient {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        Ok(self.upload_object(path, bytes, content_type).await?)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn sign_in_anonymously(&self) -> Result<Session, StoreError> {
        Ok(self.signup_anonymous().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        Ok(self.logout(access_token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> SupabaseClient {
        SupabaseClient::new(
            server.url(),
            "anon_key".to_string(),
            "service_key".to_string(),
            "avatars".to_string(),
            SupabaseTables::default(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn austin_filter() -> MatchFilter {
        MatchFilter {
            city: Some("austin".to_string()),
            min_age: 20,
            max_age: 35,
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("New York"), "New York");
        assert_eq!(escape_like("50%_off*"), "50\\%\\_off");
    }

    #[test]
    fn test_public_url() {
        let client = SupabaseClient::new(
            "https://project.supabase.co/".to_string(),
            "anon".to_string(),
            "service".to_string(),
            "avatars".to_string(),
            SupabaseTables::default(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.public_url("avatars/abc"),
            "https://project.supabase.co/storage/v1/object/public/avatars/avatars/abc"
        );
    }

    #[tokio::test]
    async fn test_query_candidates_sends_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/profiles")
            .match_header("apikey", "service_key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "neq.1".into()),
                Matcher::UrlEncoded("age".into(), "gte.20".into()),
                Matcher::UrlEncoded("age".into(), "lte.35".into()),
                Matcher::UrlEncoded("city".into(), "ilike.*austin*".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[
                    {"id":"2","name":"Bo","city":"Austin","age":25,"phone":"+15550102","avatar_url":"a"},
                    {"id":"3","name":"Cy","city":"Austin","age":30,"phone":"+15550103","avatar_url":null},
                    {"id":"4","name":"Di","city":"Austin","age":"thirty","phone":"+15550104"}
                ]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let profiles = client.query_candidates("1", &austin_filter()).await.unwrap();

        mock.assert_async().await;
        // Row 4 has a text age and is skipped
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id, "2");
        assert_eq!(profiles[1].avatar_url, "");
    }

    #[tokio::test]
    async fn test_query_candidates_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.query_candidates("1", &austin_filter()).await.unwrap_err();

        assert!(matches!(err, SupabaseError::ApiError(_)));
        assert!(matches!(StoreError::from(err), StoreError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_profile_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.9".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch_profile("9").await.unwrap_err();

        assert!(matches!(err, SupabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_match_posts_pair() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/matches")
            .match_body(Matcher::Json(serde_json::json!([{"user1": "1", "user2": "2"}])))
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server);
        client.insert_match(&MatchRecord::new("1", "2")).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_save_profile_upserts_on_id() {
        let mut server = mockito::Server::new_async().await;
        let profile = Profile {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
            city: "Lagos".to_string(),
            age: 24,
            phone: "+2348012345678".to_string(),
            avatar_url: "https://cdn.example.com/a.png".to_string(),
        };
        let mock = server
            .mock("POST", "/rest/v1/profiles")
            .match_query(Matcher::UrlEncoded("on_conflict".into(), "id".into()))
            .match_header("apikey", "service_key")
            .match_header("prefer", "resolution=merge-duplicates,return=representation")
            .match_body(Matcher::Json(serde_json::json!([{
                "id": "u-1",
                "name": "Ada",
                "city": "Lagos",
                "age": 24,
                "phone": "+2348012345678",
                "avatar_url": "https://cdn.example.com/a.png"
            }])))
            .with_status(201)
            .with_body(serde_json::to_string(&[&profile]).unwrap())
            .create_async()
            .await;

        let client = client_for(&server);
        let saved = client.save_profile(&profile).await.unwrap();

        mock.assert_async().await;
        assert_eq!(saved, profile);
    }

    #[tokio::test]
    async fn test_save_profile_empty_representation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(201)
            .with_body("[]")
            .create_async()
            .await;

        let client = client_for(&server);
        let profile = Profile {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
            city: "Lagos".to_string(),
            age: 24,
            phone: "+2348012345678".to_string(),
            avatar_url: String::new(),
        };
        let err = client.save_profile(&profile).await.unwrap_err();

        assert!(matches!(err, SupabaseError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_logout_sends_caller_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/logout")
            .match_header("apikey", "anon_key")
            .match_header("authorization", "Bearer user-token")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        client.logout("user-token").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_logout_rejected_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/logout")
            .with_status(401)
            .with_body(r#"{"message":"invalid JWT"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.logout("stale").await.unwrap_err();

        assert!(matches!(err, SupabaseError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_signup_anonymous_parses_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .match_header("apikey", "anon_key")
            .with_status(200)
            .with_body(
                r#"{"access_token":"tok","refresh_token":"ref","expires_in":3600,"user":{"id":"u-1"}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let session = client.signup_anonymous().await.unwrap();

        assert_eq!(session.access_token, "tok");
        assert_eq!(session.user_id, "u-1");
        assert_eq!(session.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_upload_object_returns_public_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/avatars/avatars/abc")
            .match_header("content-type", "image/png")
            .with_status(200)
            .with_body(r#"{"Key":"avatars/avatars/abc"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client
            .upload_object("avatars/abc", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, format!("{}/storage/v1/object/public/avatars/avatars/abc", server.url()));
    }
}
