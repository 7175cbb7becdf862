//! Category queries, scoped to an owning user.

use urlencoding::encode;

use super::client::ApiClient;
use super::response::{self, DataResponse, Entity, QueryResponse, ReadMessages};
use super::types::{Category, CategoryRequest, UpdateCategoryRequest};

const ALL_CATEGORIES: ReadMessages = ReadMessages {
    found: "Categories retrieved successfully.",
    missing: "No categories found.",
};

const ONE_CATEGORY: ReadMessages = ReadMessages {
    found: "Category retrieved successfully.",
    missing: "Category not found.",
};

fn categories_path(user_id: &str) -> String {
    format!("/auth/user/{}/category", encode(user_id))
}

fn category_path(user_id: &str, categ_id: &str) -> String {
    format!("{}/{}", categories_path(user_id), encode(categ_id))
}

/// Create a category owned by `user_id`. The service answers with a bare
/// JSON string.
pub async fn create_category(
    client: &ApiClient,
    user_id: &str,
    body: &CategoryRequest,
) -> QueryResponse {
    let result = client.post(&categories_path(user_id), body).await;
    response::created(result, Entity::Category).await
}

/// `GET /auth/user/{id}/category`
pub async fn get_all_categories(client: &ApiClient, user_id: &str) -> DataResponse<Vec<Category>> {
    response::read(client.get(&categories_path(user_id)).await, ALL_CATEGORIES).await
}

/// `GET /auth/user/{id}/category/{categ_id}`
pub async fn get_category_by_id(
    client: &ApiClient,
    user_id: &str,
    categ_id: &str,
) -> DataResponse<Category> {
    response::read(
        client.get(&category_path(user_id, categ_id)).await,
        ONE_CATEGORY,
    )
    .await
}

/// Rename a category or hand it to another user (`body.user_id`).
pub async fn update_category(
    client: &ApiClient,
    user_id: &str,
    categ_id: &str,
    body: &UpdateCategoryRequest,
) -> QueryResponse {
    response::acknowledged(client.patch(&category_path(user_id, categ_id), body).await).await
}

/// `DELETE /auth/user/{id}/category/{categ_id}`
pub async fn delete_category(client: &ApiClient, user_id: &str, categ_id: &str) -> QueryResponse {
    response::acknowledged(client.delete(&category_path(user_id, categ_id)).await).await
}
