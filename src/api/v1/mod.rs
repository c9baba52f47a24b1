pub mod conversations;
pub mod messages;
pub mod subscriptions;

use crate::common::state::AppState;
use axum::Router;
use axum::routing::{get, patch, post};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            post(conversations::create).get(conversations::list),
        )
        .route(
            "/conversations/{conversation_id}/messages",
            get(messages::history).post(messages::send),
        )
        .route(
            "/conversations/{conversation_id}/read",
            post(messages::mark_read),
        )
        .route(
            "/messages/{message_id}",
            patch(messages::edit).delete(messages::delete),
        )
        .route("/messages/unread-counts", get(messages::unread_counts))
        .route(
            "/subscriptions",
            post(subscriptions::subscribe).delete(subscriptions::unsubscribe),
        )
        .route(
            "/subscriptions/{subscriber_id}/events",
            get(subscriptions::poll),
        )
}
