//! Normalized response shapes returned by every query function.
//!
//! Query functions never return `Err`: transport and status failures are
//! folded into a `{message, code}` pair here, ready to be shown as an alert.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;

pub const SERVER_ERROR_MSG: &str = "Server error. Try again later.";
pub const UNAUTHORIZED_MSG: &str = "Invalid credentials.";
pub const UNKNOWN_ERROR_MSG: &str = "Unknown error. Try again later.";

/// Outcome of a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    pub message: String,
    pub code: u16,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Outcome of a read. `data` is `None` when the service had nothing to
/// return (reported as 204) or the call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataResponse<T> {
    pub data: Option<T>,
    pub message: String,
    pub code: u16,
}

impl<T> DataResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    fn failure(error: &ApiError) -> Self {
        let QueryResponse { message, code } = from_error(error, Entity::Generic);
        Self {
            data: None,
            message,
            code,
        }
    }
}

/// Entity name used in conflict messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Category,
    File,
    Generic,
}

impl Entity {
    pub fn label(self) -> &'static str {
        match self {
            Entity::User => "User",
            Entity::Category => "Category",
            Entity::File => "File",
            Entity::Generic => "Entity",
        }
    }
}

/// Messages for the found / not-found cases of a read.
#[derive(Debug, Clone, Copy)]
pub struct ReadMessages {
    pub found: &'static str,
    pub missing: &'static str,
}

/// Convert a failure into the normalized `{message, code}` pair.
pub fn from_error(error: &ApiError, entity: Entity) -> QueryResponse {
    let message = match error {
        ApiError::Unreachable(_) => SERVER_ERROR_MSG.to_string(),
        ApiError::Unauthorized => UNAUTHORIZED_MSG.to_string(),
        ApiError::Conflict => format!("{} already exists.", entity.label()),
        ApiError::Unknown(_) | ApiError::Decode { .. } => UNKNOWN_ERROR_MSG.to_string(),
    };
    QueryResponse {
        message,
        code: error.status_code(),
    }
}

/// Decode a JSON body, treating 204, an empty body and `null` as no data.
pub async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<Option<T>, ApiError> {
    let status = resp.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let bytes = resp.bytes().await.map_err(|e| ApiError::Decode {
        status: status.as_u16(),
        message: e.to_string(),
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Option<T>>(&bytes).map_err(|e| ApiError::Decode {
        status: status.as_u16(),
        message: e.to_string(),
    })
}

/// Extract a human-readable message from a response body.
///
/// Accepts a JSON string, a JSON object with a `message` field, or raw text.
pub async fn read_message(resp: Response) -> Result<String, ApiError> {
    let status = resp.status();
    let text = resp.text().await.map_err(|e| ApiError::Decode {
        status: status.as_u16(),
        message: e.to_string(),
    })?;
    Ok(message_from_body(&text))
}

fn message_from_body(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => match map.get("message") {
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => text.trim().to_string(),
        },
        _ => text.trim().to_string(),
    }
}

/// Normalize the outcome of a create call.
///
/// User creation answers with `{"message": ...}`; categories and files answer
/// with a bare JSON string. Both keep the HTTP status.
pub async fn created(result: Result<Response, ApiError>, entity: Entity) -> QueryResponse {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => return from_error(&e, entity),
    };
    let code = resp.status().as_u16();
    match read_message(resp).await {
        Ok(message) => QueryResponse { message, code },
        Err(e) => {
            log::warn!("Create response could not be read: {}", e);
            from_error(&e, entity)
        }
    }
}

/// Normalize the outcome of an update or delete call.
pub async fn acknowledged(result: Result<Response, ApiError>) -> QueryResponse {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => return from_error(&e, Entity::Generic),
    };
    let code = resp.status().as_u16();
    match read_message(resp).await {
        Ok(message) => QueryResponse { message, code },
        Err(e) => from_error(&e, Entity::Generic),
    }
}

/// Normalize the outcome of a read call.
pub async fn read<T: DeserializeOwned>(
    result: Result<Response, ApiError>,
    messages: ReadMessages,
) -> DataResponse<T> {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => return DataResponse::failure(&e),
    };
    match read_json::<T>(resp).await {
        Ok(Some(data)) => DataResponse {
            data: Some(data),
            message: messages.found.to_string(),
            code: 200,
        },
        Ok(None) => DataResponse {
            data: None,
            message: messages.missing.to_string(),
            code: 204,
        },
        Err(e) => {
            log::warn!("Read response could not be decoded: {}", e);
            DataResponse::failure(&e)
        }
    }
}
