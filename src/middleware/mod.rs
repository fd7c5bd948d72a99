pub mod guard;
pub mod session;

pub use guard::{route_guard_middleware, RouteDecision};
pub use session::session_resolver_middleware;
