use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::core::filters::is_candidate;
use crate::models::{MatchFilter, MatchRecord, Profile};
use crate::services::store::{MatchLog, ProfileStore, StoreError};

/// Message surfaced when the filtered candidate set is empty
pub const NO_MATCH_MESSAGE: &str = "No match found in those filters.";

/// Reasons a spin can fail
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("No match found in those filters.")]
    NoMatch,

    #[error("{0}")]
    Transport(String),
}

impl From<StoreError> for SelectError {
    fn from(err: StoreError) -> Self {
        SelectError::Transport(err.to_string())
    }
}

/// Pick one element uniformly at random
///
/// Returns `None` for an empty slice.
pub fn choose_uniform<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    let index = rng.random_range(0..items.len());
    items.get(index)
}

/// Filtered random match selection
///
/// A spin is one read of the whole filtered candidate set followed by one
/// append to the match log. The append is best effort: its failure is logged
/// and the selection still stands.
#[derive(Clone)]
pub struct MatchSelector {
    profiles: Arc<dyn ProfileStore>,
    matches: Arc<dyn MatchLog>,
}

impl MatchSelector {
    pub fn new(profiles: Arc<dyn ProfileStore>, matches: Arc<dyn MatchLog>) -> Self {
        Self { profiles, matches }
    }

    /// Select a random candidate with a generator seeded from the thread rng
    pub async fn select_match(
        &self,
        requester_id: &str,
        filter: &MatchFilter,
    ) -> Result<Profile, SelectError> {
        // ThreadRng is not Send, so seed an owned generator from it
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.select_match_with_rng(requester_id, filter, &mut rng).await
    }

    /// Select a random candidate with a caller supplied generator
    pub async fn select_match_with_rng<R>(
        &self,
        requester_id: &str,
        filter: &MatchFilter,
        rng: &mut R,
    ) -> Result<Profile, SelectError>
    where
        R: Rng + Send + ?Sized,
    {
        let candidates = self.eligible_candidates(requester_id, filter).await?;

        let selected = choose_uniform(&candidates, rng)
            .cloned()
            .ok_or(SelectError::NoMatch)?;

        self.record(requester_id, &selected).await;
        Ok(selected)
    }

    async fn eligible_candidates(
        &self,
        requester_id: &str,
        filter: &MatchFilter,
    ) -> Result<Vec<Profile>, SelectError> {
        let fetched = self
            .profiles
            .find_candidates(requester_id, filter)
            .await
            .map_err(|e| {
                tracing::error!("Candidate query failed for {}: {}", requester_id, e);
                SelectError::from(e)
            })?;

        let fetched_count = fetched.len();
        let candidates: Vec<Profile> = fetched
            .into_iter()
            .filter(|p| is_candidate(p, requester_id, filter))
            .collect();

        if candidates.len() != fetched_count {
            tracing::warn!(
                "Store returned {} rows outside the filter for {}",
                fetched_count - candidates.len(),
                requester_id
            );
        }

        tracing::debug!(
            "Spin for {}: {} candidates (city: {:?}, age: {}-{})",
            requester_id,
            candidates.len(),
            filter.city,
            filter.min_age,
            filter.max_age
        );

        Ok(candidates)
    }

    async fn record(&self, requester_id: &str, selected: &Profile) {
        let record = MatchRecord::new(requester_id, selected.id.clone());
        if let Err(e) = self.matches.record_match(&record).await {
            tracing::warn!(
                "Failed to record match {} -> {}: {}",
                requester_id,
                selected.id,
                e
            );
        }
    }
}
