use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub cookies: CookieConfig,
    pub gate: GateConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity API, without a trailing slash
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSitePolicy {
    Lax,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: SameSitePolicy,
    pub domain: Option<String>,
    pub max_age_days: i64,
}

/// How the server guard treats a cookie-encoded principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationPolicy {
    /// Trust the principal cookie until it expires.
    TrustCookie,
    /// Re-fetch the principal from the identity API on every resolution.
    Live,
}

impl ValidationPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cookie" | "trust-cookie" | "cached" => Some(ValidationPolicy::TrustCookie),
            "live" | "revalidate" => Some(ValidationPolicy::Live),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub validation: ValidationPolicy,
    pub admin_paths: Vec<String>,
    pub public_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins for the API namespace; empty means permissive.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Some(port) = env::var("GATE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Identity API
        if let Ok(v) = env::var("IDENTITY_API_URL").or_else(|_| env::var("NEXT_PUBLIC_STRAPI_URL")) {
            self.identity.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("IDENTITY_TIMEOUT_SECS") {
            self.identity.timeout_secs = v.parse().unwrap_or(self.identity.timeout_secs);
        }

        // Cookies
        if let Ok(v) = env::var("COOKIE_SECURE") {
            self.cookies.secure = v.parse().unwrap_or(self.cookies.secure);
        }
        if let Ok(v) = env::var("COOKIE_SAME_SITE") {
            self.cookies.same_site = match v.to_ascii_lowercase().as_str() {
                "none" => SameSitePolicy::None,
                "lax" => SameSitePolicy::Lax,
                _ => self.cookies.same_site,
            };
        }
        if let Ok(v) = env::var("COOKIE_DOMAIN") {
            // The cookie domain only applies to production deployments
            if self.environment == Environment::Production && !v.trim().is_empty() {
                self.cookies.domain = Some(v.trim().to_string());
            }
        }

        // Gate
        if let Ok(v) = env::var("SESSION_VALIDATION") {
            match ValidationPolicy::parse(&v) {
                Some(policy) => self.gate.validation = policy,
                None => tracing::warn!("Ignoring unknown SESSION_VALIDATION value '{}'", v),
            }
        }
        if let Ok(v) = env::var("GATE_ADMIN_PATHS") {
            self.gate.admin_paths = split_list(&v);
        }
        if let Ok(v) = env::var("GATE_PUBLIC_PATHS") {
            self.gate.public_paths = split_list(&v);
        }

        // Security
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGIN") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            identity: IdentityConfig {
                base_url: "http://localhost:1337".to_string(),
                timeout_secs: 5,
            },
            cookies: CookieConfig {
                secure: false,
                same_site: SameSitePolicy::Lax,
                domain: None,
                max_age_days: 7,
            },
            gate: default_gate(),
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            identity: IdentityConfig {
                base_url: "http://localhost:1337".to_string(),
                timeout_secs: 5,
            },
            cookies: CookieConfig {
                secure: true,
                same_site: SameSitePolicy::Lax,
                domain: None,
                max_age_days: 7,
            },
            gate: default_gate(),
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            identity: IdentityConfig {
                base_url: "http://localhost:1337".to_string(),
                timeout_secs: 3,
            },
            cookies: CookieConfig {
                secure: true,
                same_site: SameSitePolicy::None,
                domain: None,
                max_age_days: 7,
            },
            gate: default_gate(),
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }
}

fn default_gate() -> GateConfig {
    GateConfig {
        validation: ValidationPolicy::TrustCookie,
        admin_paths: vec!["/admin-*".to_string()],
        public_paths: [
            "/login",
            "/_next/*",
            "/favicon.ico",
            "/public/*",
            "/health",
            "/api/auth/*",
            "/api/public/*",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
