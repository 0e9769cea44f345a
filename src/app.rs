use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{elevated, protected, public};
use crate::identity::IdentityClient;
use crate::middleware::{edge_filter, RoutePolicy};
use crate::services::SessionService;
use crate::session::cookies::SessionCookies;
use crate::session::SessionResolver;

/// Shared state handed to every handler and to the edge filter.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub routes: Arc<RoutePolicy>,
    pub identity: Arc<dyn IdentityClient>,
    pub resolver: SessionResolver,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(config: AppConfig, identity: Arc<dyn IdentityClient>) -> Self {
        let cookies = SessionCookies::new(&config.cookies);
        Self {
            routes: Arc::new(RoutePolicy::new(&config.gate)),
            resolver: SessionResolver::new(config.gate.validation, identity.clone()),
            sessions: SessionService::new(identity.clone(), cookies, config.cookies.max_age_days),
            identity,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .merge(elevated_routes())
        // The edge filter runs before any route handler
        .layer(from_fn_with_state(state.clone(), edge_filter))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/health", get(public::health))
        .route("/login", get(public::login_page))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session).delete(auth::logout))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(protected::home))
        .route("/dashboard", get(protected::dashboard))
        .route("/api/users/me", get(protected::me))
}

fn elevated_routes() -> Router<AppState> {
    Router::new().route("/admin-dashboard", get(elevated::admin_dashboard))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
