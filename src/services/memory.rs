use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::core::filters::is_candidate;
use crate::models::{MatchFilter, MatchRecord, Profile, Session};
use crate::services::store::{FileStore, IdentityProvider, MatchLog, ProfileStore, StoreError};

/// In-process stand-in for the hosted backend
///
/// Used only by tests and benches; `main` always wires up Supabase. Its
/// sessions carry opaque tokens, not signed JWTs. Reads and writes can be
/// forced to fail to exercise transport error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Mutex<BTreeMap<String, Profile>>,
    matches: Mutex<Vec<MatchRecord>>,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with profiles
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let store = Self::default();
        if let Ok(mut map) = store.profiles.lock() {
            for profile in profiles {
                map.insert(profile.id.clone(), profile);
            }
        }
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the match log
    pub fn recorded_matches(&self) -> Vec<MatchRecord> {
        self.matches.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Stored object bytes by path
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(path).cloned()
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("profile store unavailable".into()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("write rejected".into()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Transport("store lock poisoned".into())
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_candidates(
        &self,
        requester_id: &str,
        filter: &MatchFilter,
    ) -> Result<Vec<Profile>, StoreError> {
        self.check_reads()?;
        let profiles = self.profiles.lock().map_err(poisoned)?;
        Ok(profiles
            .values()
            .filter(|p| is_candidate(p, requester_id, filter))
            .cloned()
            .collect())
    }

    async fn get_profile(&self, id: &str) -> Result<Profile, StoreError> {
        self.check_reads()?;
        let profiles = self.profiles.lock().map_err(poisoned)?;
        profiles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", id)))
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        self.check_writes()?;
        let mut profiles = self.profiles.lock().map_err(poisoned)?;
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile.clone())
    }
}

#[async_trait]
impl MatchLog for MemoryStore {
    async fn record_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        self.check_writes()?;
        self.matches.lock().map_err(poisoned)?.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        self.check_writes()?;
        self.objects.lock().map_err(poisoned)?.insert(path.to_string(), bytes);
        Ok(format!("memory://{}", path))
    }
}

#[async_trait]
impl IdentityProvider for MemoryStore {
    async fn sign_in_anonymously(&self) -> Result<Session, StoreError> {
        self.check_writes()?;
        Ok(Session {
            access_token: uuid::Uuid::new_v4().to_string(),
            refresh_token: uuid::Uuid::new_v4().to_string(),
            expires_in: 3600,
            user_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
