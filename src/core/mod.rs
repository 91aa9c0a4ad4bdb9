// Core algorithm exports
pub mod contact;
pub mod filters;
pub mod selector;

pub use contact::{whatsapp_link, placeholder_avatar};
pub use filters::{normalize_filter, parse_age, is_candidate, city_contains};
pub use selector::{MatchSelector, SelectError, choose_uniform, NO_MATCH_MESSAGE};
