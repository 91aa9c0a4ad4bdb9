//! Spin Match - random friend matching service
//!
//! Signs users in anonymously against Supabase, stores their profiles, and
//! on each spin picks one random profile that fits the caller's age and
//! city filter, handing back a WhatsApp link to reach them.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchSelector, SelectError, normalize_filter, whatsapp_link};
pub use crate::models::{Profile, MatchFilter, MatchRecord, FilterInput, ProfileForm, SpinResponse};
