// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Profile, MatchRecord, MatchFilter, MatchedProfile, Session, MIN_AGE, MAX_AGE};
pub use requests::{AgeInput, FilterInput, ProfileForm};
pub use responses::{SpinResponse, AvatarResponse, HealthResponse, ErrorResponse};
