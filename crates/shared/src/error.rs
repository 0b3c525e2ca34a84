use serde::{Deserialize, Serialize};

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCode {
    MethodNotAllowed,
    Validation,
    #[default]
    Internal,
}

impl ErrorCode {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorCode::MethodNotAllowed => 405,
            ErrorCode::Validation => 400,
            ErrorCode::Internal => 500,
        }
    }
}

/// Error body returned by the chat endpoint. Only `error` goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: ErrorCode,
    pub error: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            error: message.into(),
        }
    }

    pub fn method_not_allowed() -> Self {
        Self::new(ErrorCode::MethodNotAllowed, METHOD_NOT_ALLOWED_MESSAGE)
    }

    pub fn invalid_body() -> Self {
        Self::new(ErrorCode::Validation, INVALID_BODY_MESSAGE)
    }

    pub fn internal() -> Self {
        Self::new(ErrorCode::Internal, GENERIC_FAILURE_MESSAGE)
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_message_is_serialized() {
        let body = serde_json::to_value(ApiError::method_not_allowed()).expect("json");
        assert_eq!(body, serde_json::json!({ "error": "Method not allowed" }));
    }

    #[test]
    fn status_codes_follow_error_code() {
        assert_eq!(ApiError::method_not_allowed().status_code(), 405);
        assert_eq!(ApiError::invalid_body().status_code(), 400);
        assert_eq!(ApiError::internal().status_code(), 500);
    }
}
