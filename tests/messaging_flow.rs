//! End-to-end messaging flows against live MySQL + Redis.
//!
//! All tests are ignored by default; set DATABASE_URL and REDIS_URL and run
//! `cargo test -- --ignored` with the schema from schema.sql applied.

use deadpool::Runtime;
use marketplace_chat_service::common::redis_pool::{RedisPool, RedisPoolManager};
use marketplace_chat_service::common::state::AppState;
use marketplace_chat_service::models::events::ChangeEvent;
use marketplace_chat_service::repositories::streams::Topic;
use marketplace_chat_service::usecases::{conversations, messages, streams};
use redis::AsyncConnectionConfig;
use sqlx::mysql::MySqlPoolOptions;
use std::env;
use uuid::Uuid;

async fn test_state() -> AppState {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = MySqlPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to MySQL");

    let redis_url = env::var("REDIS_URL").expect("REDIS_URL must be set");
    let redis_client = redis::Client::open(redis_url.as_str()).expect("Invalid REDIS_URL");
    let redis_manager = RedisPoolManager::new(redis_client, AsyncConnectionConfig::new());
    let redis = RedisPool::builder(redis_manager)
        .max_size(2)
        .runtime(Runtime::Tokio1)
        .build()
        .expect("Failed to build redis pool");

    AppState { db, redis }
}

async fn seed_user(state: &AppState, business_name: Option<&str>) -> i64 {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("test_{}", &suffix[..12]);
    let result = sqlx::query(
        "INSERT INTO users (username, display_name, avatar_url, business_name) \
         VALUES (?, ?, NULL, ?)",
    )
    .bind(&username)
    .bind(&username)
    .bind(business_name)
    .execute(&state.db)
    .await
    .expect("Failed to seed user");
    result.last_insert_id() as i64
}

async fn seed_listing(state: &AppState, seller_id: i64) -> i64 {
    let result = sqlx::query(
        "INSERT INTO listings (seller_id, title, price_cents, image_url, status) \
         VALUES (?, 'Vintage desk lamp', 4500, NULL, 'active')",
    )
    .bind(seller_id)
    .execute(&state.db)
    .await
    .expect("Failed to seed listing");
    result.last_insert_id() as i64
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn sequential_create_returns_the_same_conversation() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller = seed_user(&state, Some("Lamp Emporium")).await;
    let listing = seed_listing(&state, seller).await;

    let first = conversations::get_or_create(&state, buyer, seller, Some(listing))
        .await
        .expect("Failed to create conversation");
    let second = conversations::get_or_create(&state, buyer, seller, Some(listing))
        .await
        .expect("Failed to dedup conversation");
    assert_eq!(first.conversation_id, second.conversation_id);
    assert_eq!(first.listing_id, Some(listing));

    // A listing-less conversation between the same pair is a distinct triple
    let general = conversations::get_or_create(&state, buyer, seller, None)
        .await
        .expect("Failed to create listing-less conversation");
    assert_ne!(general.conversation_id, first.conversation_id);
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn sent_message_shows_up_unread_and_touches_the_conversation() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller = seed_user(&state, Some("Lamp Emporium")).await;
    let conversation = conversations::get_or_create(&state, buyer, seller, None)
        .await
        .unwrap();

    let sent = messages::send(
        &state,
        conversation.conversation_id,
        buyer,
        "Is this available?",
        None,
    )
    .await
    .expect("Failed to send message");
    assert!(!sent.read);
    assert!(!sent.edited);

    let history = messages::fetch_for_conversation(&state, conversation.conversation_id)
        .await
        .unwrap();
    let found = history
        .iter()
        .find(|m| m.message_id == sent.message_id)
        .expect("Sent message missing from history");
    assert_eq!(found.content, "Is this available?");
    assert!(!found.read);

    let refreshed = conversations::fetch_one(&state, conversation.conversation_id)
        .await
        .unwrap();
    assert!(refreshed.last_message_at >= conversation.last_message_at);
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn mark_read_zeroes_unread_for_the_reader_only() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller = seed_user(&state, Some("Lamp Emporium")).await;
    let other_seller = seed_user(&state, Some("Chair Depot")).await;

    let read_conv = conversations::get_or_create(&state, buyer, seller, None)
        .await
        .unwrap();
    let unread_conv = conversations::get_or_create(&state, buyer, other_seller, None)
        .await
        .unwrap();
    messages::send(&state, read_conv.conversation_id, buyer, "Hello", None)
        .await
        .unwrap();
    messages::send(&state, read_conv.conversation_id, buyer, "Still there?", None)
        .await
        .unwrap();
    messages::send(&state, unread_conv.conversation_id, buyer, "Hi", None)
        .await
        .unwrap();

    let ids = [read_conv.conversation_id, unread_conv.conversation_id];
    let counts = messages::unread_counts(&state, &ids, seller).await.unwrap();
    assert_eq!(counts[&read_conv.conversation_id], 2);

    let flipped = messages::mark_read(&state, read_conv.conversation_id, seller, None)
        .await
        .unwrap();
    assert_eq!(flipped, 2);

    let counts = messages::unread_counts(&state, &ids, seller).await.unwrap();
    assert_eq!(counts[&read_conv.conversation_id], 0);
    // The other seller's conversation is untouched
    let counts = messages::unread_counts(&state, &ids, other_seller)
        .await
        .unwrap();
    assert_eq!(counts[&unread_conv.conversation_id], 1);
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn edit_and_delete_are_sender_only_mutations() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller = seed_user(&state, Some("Lamp Emporium")).await;
    let conversation = conversations::get_or_create(&state, buyer, seller, None)
        .await
        .unwrap();
    let sent = messages::send(&state, conversation.conversation_id, buyer, "Helo", None)
        .await
        .unwrap();

    // The other participant may not edit
    let err = messages::edit(&state, sent.message_id, seller, "Hello", None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "messages.not_sender");

    let edited = messages::edit(&state, sent.message_id, buyer, "Hello", None)
        .await
        .unwrap();
    assert_eq!(edited.content, "Hello");
    assert!(edited.edited);

    messages::delete(&state, sent.message_id, buyer, None)
        .await
        .unwrap();
    let history = messages::fetch_for_conversation(&state, conversation.conversation_id)
        .await
        .unwrap();
    assert!(history.iter().all(|m| m.message_id != sent.message_id));
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn outsiders_and_malformed_content_are_rejected() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller = seed_user(&state, Some("Lamp Emporium")).await;
    let outsider = seed_user(&state, None).await;

    let err = conversations::get_or_create(&state, buyer, buyer, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "conversations.self_conversation");

    let conversation = conversations::get_or_create(&state, buyer, seller, None)
        .await
        .unwrap();

    let err = messages::send(&state, conversation.conversation_id, outsider, "Hi", None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "conversations.not_participant");
    let err = messages::mark_read(&state, conversation.conversation_id, outsider, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "conversations.not_participant");

    let err = messages::send(&state, conversation.conversation_id, buyer, "", None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "messages.invalid_length");
    let oversized = "x".repeat(2001);
    let err = messages::send(&state, conversation.conversation_id, buyer, &oversized, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "messages.invalid_length");

    // Nothing above made it into the conversation
    let history = messages::fetch_for_conversation(&state, conversation.conversation_id)
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn conversation_list_orders_by_latest_activity() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller_a = seed_user(&state, Some("Lamp Emporium")).await;
    let seller_b = seed_user(&state, Some("Chair Depot")).await;

    let older = conversations::get_or_create(&state, buyer, seller_a, None)
        .await
        .unwrap();
    conversations::get_or_create(&state, buyer, seller_b, None)
        .await
        .unwrap();
    messages::send(&state, older.conversation_id, buyer, "Bumping this", None)
        .await
        .unwrap();

    let views = conversations::fetch_for_user(&state, buyer).await.unwrap();
    assert_eq!(
        views[0].conversation.conversation_id,
        older.conversation_id
    );
    for pair in views.windows(2) {
        assert!(
            pair[0].conversation.last_message_at >= pair[1].conversation.last_message_at,
            "conversation list not ordered by last_message_at"
        );
    }
    // Enrichment carries the seller's business name
    assert!(views.iter().any(|view| {
        view.seller.business_name.as_deref() == Some("Lamp Emporium")
    }));
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn subscribers_receive_change_events_but_not_their_own() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller = seed_user(&state, Some("Lamp Emporium")).await;
    let conversation = conversations::get_or_create(&state, buyer, seller, None)
        .await
        .unwrap();

    let seller_client = Uuid::new_v4();
    let buyer_client = Uuid::new_v4();
    streams::subscribe(
        &state,
        seller_client,
        Topic::Conversation(conversation.conversation_id),
    )
    .await
    .unwrap();
    streams::subscribe(
        &state,
        buyer_client,
        Topic::Conversation(conversation.conversation_id),
    )
    .await
    .unwrap();
    streams::subscribe(&state, seller_client, Topic::UserConversations(seller))
        .await
        .unwrap();

    let sent = messages::send(
        &state,
        conversation.conversation_id,
        buyer,
        "Is this available?",
        Some(buyer_client),
    )
    .await
    .unwrap();

    let events = streams::poll(&state, seller_client).await.unwrap();
    assert!(events.iter().any(|event| matches!(
        event,
        ChangeEvent::MessageInserted { message } if message.message_id == sent.message_id
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        ChangeEvent::ConversationUpdated { conversation: c }
            if c.conversation_id == conversation.conversation_id
    )));

    // The sender's own client was excluded from the fan-out
    let events = streams::poll(&state, buyer_client).await.unwrap();
    assert!(events.is_empty());

    // Unsubscribed clients stop receiving
    streams::unsubscribe_all(&state, seller_client).await.unwrap();
    messages::send(&state, conversation.conversation_id, buyer, "Hello?", None)
        .await
        .unwrap();
    let events = streams::poll(&state, seller_client).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
#[ignore] // Requires MySQL + Redis
async fn resubscribing_does_not_skip_buffered_events() {
    let state = test_state().await;
    let buyer = seed_user(&state, None).await;
    let seller = seed_user(&state, Some("Lamp Emporium")).await;
    let conversation = conversations::get_or_create(&state, buyer, seller, None)
        .await
        .unwrap();
    let topic = Topic::Conversation(conversation.conversation_id);

    let seller_client = Uuid::new_v4();
    streams::subscribe(&state, seller_client, topic).await.unwrap();

    // Buffered between the two subscribe calls
    let sent = messages::send(
        &state,
        conversation.conversation_id,
        buyer,
        "Is this available?",
        None,
    )
    .await
    .unwrap();
    streams::subscribe(&state, seller_client, topic).await.unwrap();

    let events = streams::poll(&state, seller_client).await.unwrap();
    assert!(events.iter().any(|event| matches!(
        event,
        ChangeEvent::MessageInserted { message } if message.message_id == sent.message_id
    )));
}
