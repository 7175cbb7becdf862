//! Request and response types for the file repository API.
//!
//! Field names follow the service's snake_case JSON. Timestamps are kept as
//! opaque strings; the service has sent both RFC 3339 strings and Unix
//! seconds, so either is accepted.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Login credentials, kept in memory for silent token refresh.
///
/// The password is wiped when the value is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of POST /login responses.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Identity returned by GET /auth/session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub admin: bool,
}

impl SessionIdentity {
    /// Name to greet the user with: display name, else username.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.username.as_deref())
    }

    /// The identity id if present and non-empty.
    pub fn user_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, deserialize_with = "opaque_timestamp")]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "categ_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "opaque_timestamp")]
    pub updated_at: String,
}

/// A stored file. `content` is base64 text when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "file_id")]
    pub id: String,
    #[serde(default)]
    pub categ_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub mimetype: String,
    #[serde(rename = "blob", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opaque_timestamp")]
    pub updated_at: String,
}

/// Body for creating or updating a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// Category update; `user_id` may move the category to another owner.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCategoryRequest {
    pub name: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRequest {
    pub name: String,
    pub extension: String,
    pub mimetype: String,
    /// Base64-encoded file content.
    pub content: String,
}

/// File update; `categ_id` may move the file to another category.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateFileRequest {
    #[serde(flatten)]
    pub file: FileRequest,
    pub categ_id: String,
}

fn opaque_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
