use serde::{Deserialize, Deserializer, Serialize};

/// Lowest age accepted on a profile and the default lower filter bound
pub const MIN_AGE: i32 = 18;

/// Highest age accepted on a profile and the default upper filter bound
pub const MAX_AGE: i32 = 99;

/// A row of the `profiles` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: i32,
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar_url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A row of the append-only `matches` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "user1")]
    pub requester_id: String,
    #[serde(rename = "user2")]
    pub candidate_id: String,
}

impl MatchRecord {
    pub fn new(requester_id: impl Into<String>, candidate_id: impl Into<String>) -> Self {
        Self {
            requester_id: requester_id.into(),
            candidate_id: candidate_id.into(),
        }
    }
}

/// Normalized candidate filter
///
/// Built through [`crate::core::filters::normalize_filter`], which keeps
/// `min_age <= max_age` and trims the city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilter {
    pub city: Option<String>,
    #[serde(rename = "minAge")]
    pub min_age: i32,
    #[serde(rename = "maxAge")]
    pub max_age: i32,
}

impl Default for MatchFilter {
    fn default() -> Self {
        Self {
            city: None,
            min_age: MIN_AGE,
            max_age: MAX_AGE,
        }
    }
}

/// Authenticated session returned by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// The candidate returned from a spin, shaped for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub city: String,
    pub age: i32,
    pub phone: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: String,
}

impl From<Profile> for MatchedProfile {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.id,
            name: profile.name,
            city: profile.city,
            age: profile.age,
            phone: profile.phone,
            avatar_url: profile.avatar_url,
        }
    }
}
