//! Order routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /orders | POST | Create an order |
//! | /orders/{id} | GET | Fetch an order |
//! | /users/{user_id}/orders | GET | List a user's orders, newest first |

pub mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/orders", post(handler::create))
        .route("/orders/{id}", get(handler::get_by_id))
        .route("/users/{user_id}/orders", get(handler::list_by_user))
}
