//! Non-record response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const WELCOME_MESSAGE: &str = "Welcome to the Patient Registry API";

/// Body of `GET /`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WelcomeRes {
    #[schema(example = "Welcome to the Patient Registry API")]
    pub message: String,
}

impl Default for WelcomeRes {
    fn default() -> Self {
        Self {
            message: WELCOME_MESSAGE.into(),
        }
    }
}

/// Confirmation or error body: a human-readable `message`, plus diagnostic detail in `error`
/// when a failure has any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
        }
    }
}
