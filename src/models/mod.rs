pub mod conversations;
pub mod events;
pub mod listings;
pub mod messages;
pub mod users;
