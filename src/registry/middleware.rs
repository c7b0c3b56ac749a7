//! Identity map middleware for axum servers.
//!
//! Requires the `http` feature. Resets the registry before each request so
//! repository snapshots never leak from one request into the next.
//!
//! ## Example
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use restmodel::identity_map;
//!
//! let app = Router::new()
//!     .route("/categories", get(list_categories))
//!     .layer(middleware::from_fn_with_state(registry.clone(), identity_map))
//!     .with_state(registry);
//! ```

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::Registry;

/// Reset `registry`, then run the rest of the stack.
pub async fn identity_map(
    State(registry): State<Registry>,
    request: Request,
    next: Next,
) -> Response {
    tracing::debug!(method = %request.method(), uri = %request.uri(), "identity map reset");
    registry.reset();
    next.run(request).await
}
