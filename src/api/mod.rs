//! Users API served by every worker.
//!
//! | Method | Path              | Success            |
//! |--------|-------------------|--------------------|
//! | GET    | `/api/users`      | 200, all users     |
//! | POST   | `/api/users`      | 201, created user  |
//! | GET    | `/api/users/{id}` | 200, one user      |
//! | PUT    | `/api/users/{id}` | 200, updated user  |
//! | DELETE | `/api/users/{id}` | 204, empty body    |
//!
//! Anything else is `404 {"message":"Route not found"}`.

pub mod error;
pub mod handlers;
pub mod model;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Router};

use self::handlers::*;
pub use self::error::ApiError;
pub use self::model::{User, UserFields, ValidationError};
pub use self::store::UserStore;

pub fn setup_api_router(store: Arc<UserStore>) -> Router {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .with_state(store)
}
