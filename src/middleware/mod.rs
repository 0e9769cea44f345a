pub mod edge_filter;
pub mod guard;
pub mod paths;
pub mod response;

pub use edge_filter::{decide, edge_filter, EdgeDecision};
pub use guard::{get_session, require_admin, require_auth, GuardRejection, RequireAdmin, RequireAuth};
pub use paths::{PathPattern, RoutePolicy};
pub use response::{ApiResponse, ApiResult};
