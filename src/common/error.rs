use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug)]
pub enum AppError {
    Unexpected,
    Unauthorized,
    DecodingRequestFailed,

    ConversationsNotFound,
    ConversationsSelfConversation,
    ConversationsNotParticipant,

    MessagesNotFound,
    MessagesInvalidLength,
    MessagesNotSender,

    UsersNotFound,

    ListingsNotFound,

    StreamsInvalidTopic,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn as_str(&self) -> &str {
        self.code()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::Unauthorized => "unauthorized",
            AppError::DecodingRequestFailed => "decoding_request_failed",

            AppError::ConversationsNotFound => "conversations.not_found",
            AppError::ConversationsSelfConversation => "conversations.self_conversation",
            AppError::ConversationsNotParticipant => "conversations.not_participant",

            AppError::MessagesNotFound => "messages.not_found",
            AppError::MessagesInvalidLength => "messages.invalid_length",
            AppError::MessagesNotSender => "messages.not_sender",

            AppError::UsersNotFound => "users.not_found",

            AppError::ListingsNotFound => "listings.not_found",

            AppError::StreamsInvalidTopic => "streams.invalid_topic",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::Unauthorized => "You are not authorized to perform this action.",
            AppError::DecodingRequestFailed => "Failed to decode request",

            AppError::ConversationsNotFound => "Conversation could not be found.",
            AppError::ConversationsSelfConversation => {
                "You cannot start a conversation with yourself."
            }
            AppError::ConversationsNotParticipant => {
                "You are not a participant of this conversation."
            }

            AppError::MessagesNotFound => "Message could not be found.",
            AppError::MessagesInvalidLength => {
                "Your message was too short/long. It has not been sent."
            }
            AppError::MessagesNotSender => "Only the sender may modify this message.",

            AppError::UsersNotFound => "This user does not exist.",

            AppError::ListingsNotFound => "Listing could not be found.",

            AppError::StreamsInvalidTopic => "Invalid subscription topic",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed
            | AppError::ConversationsSelfConversation
            | AppError::MessagesInvalidLength
            | AppError::StreamsInvalidTopic => StatusCode::BAD_REQUEST,

            AppError::Unauthorized => StatusCode::UNAUTHORIZED,

            AppError::ConversationsNotParticipant | AppError::MessagesNotSender => {
                StatusCode::FORBIDDEN
            }

            AppError::ConversationsNotFound
            | AppError::MessagesNotFound
            | AppError::UsersNotFound
            | AppError::ListingsNotFound => StatusCode::NOT_FOUND,

            AppError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_namespaced_by_domain() {
        assert_eq!(AppError::ConversationsNotFound.code(), "conversations.not_found");
        assert_eq!(AppError::MessagesNotSender.code(), "messages.not_sender");
        assert_eq!(AppError::StreamsInvalidTopic.code(), "streams.invalid_topic");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::MessagesInvalidLength.http_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ConversationsNotParticipant.http_status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::ConversationsNotFound.http_status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unexpected.http_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
