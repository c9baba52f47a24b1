pub mod conversations;
pub mod listings;
pub mod messages;
pub mod streams;
pub mod users;
