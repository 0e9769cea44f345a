use crate::config::GateConfig;
use crate::session::LOGIN_PATH;

const API_NAMESPACE: &str = "/api";

/// A configured path pattern.
///
/// - `/login` matches exactly.
/// - `/api/auth/*` matches `/api/auth` and anything below `/api/auth/`.
/// - `/admin-*` matches any path starting with `/admin-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Namespace(String),
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if let Some(base) = pattern.strip_suffix("/*") {
            PathPattern::Namespace(base.to_string())
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            PathPattern::Prefix(prefix.to_string())
        } else {
            PathPattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Namespace(base) => {
                path == base
                    || path
                        .strip_prefix(base.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// Classifies request paths for the gate.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    public: Vec<PathPattern>,
    admin: Vec<PathPattern>,
    api: PathPattern,
}

impl RoutePolicy {
    pub fn new(gate: &GateConfig) -> Self {
        Self {
            public: gate.public_paths.iter().map(|p| PathPattern::parse(p)).collect(),
            admin: gate.admin_paths.iter().map(|p| PathPattern::parse(p)).collect(),
            api: PathPattern::Namespace(API_NAMESPACE.to_string()),
        }
    }

    /// Allow-listed paths bypass every check.
    pub fn is_public(&self, path: &str) -> bool {
        self.is_login(path) || self.public.iter().any(|p| p.matches(path))
    }

    pub fn is_admin(&self, path: &str) -> bool {
        self.admin.iter().any(|p| p.matches(path))
    }

    pub fn is_api(&self, path: &str) -> bool {
        self.api.matches(path)
    }

    pub fn is_login(&self, path: &str) -> bool {
        path == LOGIN_PATH
    }
}
