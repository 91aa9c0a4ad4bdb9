use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub tables: TableSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    pub service_key: String,
    pub jwt_secret: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_profiles_table")]
    pub profiles: String,
    #[serde(default = "default_matches_table")]
    pub matches: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            profiles: default_profiles_table(),
            matches: default_matches_table(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_avatar_bucket")]
    pub avatar_bucket: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            avatar_bucket: default_avatar_bucket(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_timeout_secs() -> u64 { 30 }
fn default_profiles_table() -> String { "profiles".to_string() }
fn default_matches_table() -> String { "matches".to_string() }
fn default_avatar_bucket() -> String { "avatars".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Plain Supabase variables accepted alongside the prefixed ones
const SUPABASE_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SUPABASE_URL", "supabase.url"),
    ("SUPABASE_ANON_KEY", "supabase.anon_key"),
    ("SUPABASE_SERVICE_ROLE_KEY", "supabase.service_key"),
    ("SUPABASE_JWT_SECRET", "supabase.jwt_secret"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SPIN__)
    /// 5. Plain Supabase variables (SUPABASE_URL and friends)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SPIN__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SPIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_supabase_env(settings, |key| std::env::var(key).ok())?;

        settings.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)
    }
}

/// Override Supabase settings from plain environment variables when present
fn apply_supabase_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in SUPABASE_ENV_OVERRIDES {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
