//! User queries.
//!
//! `/auth/user` and `/auth/user/{id}`. Each function performs exactly one
//! request and returns a normalized response.

use urlencoding::encode;

use super::client::ApiClient;
use super::response::{self, DataResponse, Entity, QueryResponse, ReadMessages};
use super::types::{User, UserRequest};

const ALL_USERS: ReadMessages = ReadMessages {
    found: "Users retrieved successfully.",
    missing: "No users found.",
};

const ONE_USER: ReadMessages = ReadMessages {
    found: "User retrieved successfully.",
    missing: "User not found.",
};

fn user_path(user_id: &str) -> String {
    format!("/auth/user/{}", encode(user_id))
}

/// `POST /auth/user`
pub async fn create_user(client: &ApiClient, body: &UserRequest) -> QueryResponse {
    let result = client.post("/auth/user", body).await;
    response::created(result, Entity::User).await
}

/// `GET /auth/user`
pub async fn get_all_users(client: &ApiClient) -> DataResponse<Vec<User>> {
    response::read(client.get("/auth/user").await, ALL_USERS).await
}

/// `GET /auth/user/{id}`
pub async fn get_user_by_id(client: &ApiClient, user_id: &str) -> DataResponse<User> {
    response::read(client.get(&user_path(user_id)).await, ONE_USER).await
}

/// `PATCH /auth/user/{id}`
pub async fn update_user(client: &ApiClient, user_id: &str, body: &UserRequest) -> QueryResponse {
    response::acknowledged(client.patch(&user_path(user_id), body).await).await
}

/// `DELETE /auth/user/{id}`
pub async fn delete_user(client: &ApiClient, user_id: &str) -> QueryResponse {
    response::acknowledged(client.delete(&user_path(user_id)).await).await
}
