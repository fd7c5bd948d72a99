use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path prefix that requires a session; anonymous requests are redirected.
    pub protected_prefix: String,
    /// Redirect target for anonymous requests to protected paths.
    pub login_path: String,
    /// Cookie name carrying the session token.
    pub session_cookie: String,
    pub session_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    /// S3-compatible endpoint, e.g. https://<account>.r2.cloudflarestorage.com
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Domain the bucket is publicly served from.
    pub public_domain: String,
    pub presign_expiry_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_upload_bytes: u64,
    pub max_comment_chars: usize,
    pub min_title_chars: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment defaults first, specific env vars override
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        if let Ok(v) = env::var("AUTH_PROTECTED_PREFIX") {
            self.auth.protected_prefix = v;
        }
        if let Ok(v) = env::var("AUTH_LOGIN_PATH") {
            self.auth.login_path = v;
        }
        if let Ok(v) = env::var("AUTH_SESSION_EXPIRY_HOURS") {
            self.auth.session_expiry_hours = v.parse().unwrap_or(self.auth.session_expiry_hours);
        }

        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Ok(v) = env::var("STORAGE_REGION") {
            self.storage.region = v;
        }
        if let Ok(v) = env::var("STORAGE_ACCESS_KEY_ID") {
            self.storage.access_key_id = v;
        }
        if let Ok(v) = env::var("STORAGE_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = v;
        }
        if let Ok(v) = env::var("STORAGE_PUBLIC_DOMAIN") {
            self.storage.public_domain = v;
        }
        if let Ok(v) = env::var("STORAGE_PRESIGN_EXPIRY_SECS") {
            self.storage.presign_expiry_secs =
                v.parse().unwrap_or(self.storage.presign_expiry_secs);
        }

        if let Ok(v) = env::var("MAX_UPLOAD_BYTES") {
            self.limits.max_upload_bytes = v.parse().unwrap_or(self.limits.max_upload_bytes);
        }

        self
    }

    fn base(environment: Environment) -> Self {
        Self {
            environment,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            auth: AuthConfig {
                protected_prefix: "/dashboard".to_string(),
                login_path: "/login".to_string(),
                session_cookie: "ladle_session".to_string(),
                session_expiry_hours: 24 * 7,
            },
            storage: StorageConfig {
                bucket: String::new(),
                endpoint: String::new(),
                region: "auto".to_string(),
                access_key_id: String::new(),
                secret_access_key: String::new(),
                public_domain: String::new(),
                presign_expiry_secs: 3600,
            },
            limits: LimitsConfig {
                max_upload_bytes: 10 * 1024 * 1024, // 10 MiB
                max_comment_chars: 500,
                min_title_chars: 3,
            },
        }
    }

    fn development() -> Self {
        Self::base(Environment::Development)
    }

    fn staging() -> Self {
        let mut cfg = Self::base(Environment::Staging);
        cfg.database.max_connections = 20;
        cfg.database.connection_timeout_secs = 10;
        cfg.auth.session_expiry_hours = 24;
        cfg
    }

    fn production() -> Self {
        let mut cfg = Self::base(Environment::Production);
        cfg.database.max_connections = 50;
        cfg.database.connection_timeout_secs = 5;
        cfg.auth.session_expiry_hours = 24;
        cfg
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
