use serde::{Deserialize, Serialize};
use validator::Validate;

/// An age bound as typed by the user: a JSON number or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(f64),
    Text(String),
}

impl From<i32> for AgeInput {
    fn from(value: i32) -> Self {
        AgeInput::Number(value as f64)
    }
}

impl From<&str> for AgeInput {
    fn from(value: &str) -> Self {
        AgeInput::Text(value.to_string())
    }
}

/// Request body for a spin, before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterInput {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "min_age", rename = "minAge")]
    pub min_age: Option<AgeInput>,
    #[serde(default, alias = "max_age", rename = "maxAge")]
    pub max_age: Option<AgeInput>,
}

/// Profile setup form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub city: String,
    /// Number or numeric text, as the age field is typed
    #[serde(default)]
    pub age: Option<AgeInput>,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub phone: String,
    #[serde(default, alias = "country_code", rename = "countryCode")]
    pub country_code: Option<String>,
    #[serde(default, alias = "avatar_url", rename = "avatarUrl")]
    pub avatar_url: Option<String>,
}

impl ProfileForm {
    /// True when any required field is blank
    pub fn is_incomplete(&self) -> bool {
        self.name.trim().is_empty()
            || self.city.trim().is_empty()
            || self.phone.trim().is_empty()
            || self.age.is_none()
    }

    /// Phone with the selected country code applied, if it lacks one
    pub fn full_phone(&self) -> String {
        let phone = self.phone.trim();
        match self.country_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() && !phone.starts_with('+') => {
                format!("{}{}", code, phone)
            }
            _ => phone.to_string(),
        }
    }
}
