//! File queries, scoped to a user and category.
//!
//! File content travels as base64 text inside the JSON body; see
//! [`crate::codec`] for the conversion.

use urlencoding::encode;

use super::client::ApiClient;
use super::response::{self, DataResponse, Entity, QueryResponse, ReadMessages};
use super::types::{FileRequest, StoredFile, UpdateFileRequest};

const ALL_FILES: ReadMessages = ReadMessages {
    found: "Files retrieved successfully.",
    missing: "No files found.",
};

const ONE_FILE: ReadMessages = ReadMessages {
    found: "File retrieved successfully.",
    missing: "File not found.",
};

fn files_path(user_id: &str, categ_id: &str) -> String {
    format!(
        "/auth/user/{}/category/{}/file",
        encode(user_id),
        encode(categ_id)
    )
}

fn file_path(user_id: &str, categ_id: &str, file_id: &str) -> String {
    format!("{}/{}", files_path(user_id, categ_id), encode(file_id))
}

/// Upload a file into a category. `body.content` is base64.
pub async fn create_file(
    client: &ApiClient,
    user_id: &str,
    categ_id: &str,
    body: &FileRequest,
) -> QueryResponse {
    let result = client.post(&files_path(user_id, categ_id), body).await;
    response::created(result, Entity::File).await
}

/// `GET /auth/user/{id}/category/{categ_id}/file`
pub async fn get_all_files(
    client: &ApiClient,
    user_id: &str,
    categ_id: &str,
) -> DataResponse<Vec<StoredFile>> {
    response::read(client.get(&files_path(user_id, categ_id)).await, ALL_FILES).await
}

/// `GET /auth/user/{id}/category/{categ_id}/file/{file_id}`, content included.
pub async fn get_file_by_id(
    client: &ApiClient,
    user_id: &str,
    categ_id: &str,
    file_id: &str,
) -> DataResponse<StoredFile> {
    response::read(
        client.get(&file_path(user_id, categ_id, file_id)).await,
        ONE_FILE,
    )
    .await
}

/// Replace a file's fields; a different `categ_id` moves it.
pub async fn update_file(
    client: &ApiClient,
    user_id: &str,
    categ_id: &str,
    file_id: &str,
    body: &UpdateFileRequest,
) -> QueryResponse {
    let path = file_path(user_id, categ_id, file_id);
    response::acknowledged(client.patch(&path, body).await).await
}

/// `DELETE /auth/user/{id}/category/{categ_id}/file/{file_id}`
pub async fn delete_file(
    client: &ApiClient,
    user_id: &str,
    categ_id: &str,
    file_id: &str,
) -> QueryResponse {
    let path = file_path(user_id, categ_id, file_id);
    response::acknowledged(client.delete(&path).await).await
}

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::api::auth::TokenStore;
    use crate::route::Route;
    use crate::testing::spawn_stub;

    fn sample_file() -> FileRequest {
        FileRequest {
            name: "notes".to_string(),
            extension: ".txt".to_string(),
            mimetype: "text/plain".to_string(),
            content: "aGVsbG8=".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_file_posts_base64_body() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["content"], "aGVsbG8=");
                assert_eq!(body["mimetype"], "text/plain");
                (StatusCode::CREATED, Json(json!({"message": "File created"})))
            }),
        );
        let ctx = spawn_stub(router).await;

        let res = create_file(&ctx.api, "u1", "c1", &sample_file()).await;
        assert_eq!(res, QueryResponse { message: "File created".into(), code: 201 });
    }

    #[tokio::test]
    async fn test_create_file_bare_string_body() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file",
            post(|| async { (StatusCode::CREATED, Json(json!("File created"))) }),
        );
        let ctx = spawn_stub(router).await;

        let res = create_file(&ctx.api, "u1", "c1", &sample_file()).await;
        assert_eq!(res, QueryResponse { message: "File created".into(), code: 201 });
    }

    #[tokio::test]
    async fn test_create_file_conflict() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file",
            post(|| async { StatusCode::CONFLICT }),
        );
        let ctx = spawn_stub(router).await;

        let res = create_file(&ctx.api, "u1", "c1", &sample_file()).await;
        assert_eq!(res.message, "File already exists.");
        assert_eq!(res.code, 409);
    }

    #[tokio::test]
    async fn test_get_file_by_id() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file/:file",
            get(|Path((_, categ, file)): Path<(String, String, String)>| async move {
                Json(json!({
                    "file_id": file,
                    "categ_id": categ,
                    "name": "notes",
                    "extension": ".txt",
                    "mimetype": "text/plain",
                    "blob": "aGVsbG8=",
                    "updated_at": "2024-01-01"
                }))
            }),
        );
        let ctx = spawn_stub(router).await;

        let res = get_file_by_id(&ctx.api, "u1", "c1", "f1").await;
        assert_eq!(res.code, 200);
        assert_eq!(res.message, "File retrieved successfully.");
        let file = res.data.unwrap();
        assert_eq!(file.id, "f1");
        assert_eq!(file.categ_id, "c1");
        assert_eq!(file.content.as_deref(), Some("aGVsbG8="));
    }

    #[tokio::test]
    async fn test_list_files_empty_body() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file",
            get(|| async { "" }),
        );
        let ctx = spawn_stub(router).await;

        let res = get_all_files(&ctx.api, "u1", "c1").await;
        assert_eq!(res.code, 204);
        assert_eq!(res.message, "No files found.");
    }

    #[tokio::test]
    async fn test_update_and_delete_file() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file/:file",
            axum::routing::patch(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["categ_id"], "c2");
                Json(json!("File updated"))
            })
            .delete(|| async { Json(json!("File deleted")) }),
        );
        let ctx = spawn_stub(router).await;

        let body = UpdateFileRequest {
            file: sample_file(),
            categ_id: "c2".to_string(),
        };
        let res = update_file(&ctx.api, "u1", "c1", "f1", &body).await;
        assert_eq!(res.message, "File updated");

        let res = delete_file(&ctx.api, "u1", "c1", "f1").await;
        assert_eq!(res, QueryResponse { message: "File deleted".into(), code: 200 });
    }

    #[tokio::test]
    async fn test_file_queries_unauthorized_redirect() {
        let router = Router::new()
            .route(
                "/auth/user/:user/category/:categ/file",
                get(|| async { StatusCode::UNAUTHORIZED }),
            )
            .route(
                "/auth/user/:user/category/:categ/file/:file",
                axum::routing::delete(|| async { StatusCode::UNAUTHORIZED }),
            );
        let ctx = spawn_stub(router).await;

        ctx.tokens.store("expired").unwrap();
        let res = get_all_files(&ctx.api, "u1", "c1").await;
        assert!(res.data.is_none());
        assert_eq!(res.code, 401);
        assert_eq!(res.message, response::UNAUTHORIZED_MSG);
        assert_eq!(ctx.tokens.load().unwrap(), None);
        assert_eq!(ctx.navigator.current(), Some(Route::Login));

        ctx.tokens.store("expired-again").unwrap();
        let res = delete_file(&ctx.api, "u1", "c1", "f1").await;
        assert_eq!(res.code, 401);
        assert_eq!(ctx.tokens.load().unwrap(), None);
        assert_eq!(ctx.navigator.last().map(|n| n.route), Some(Route::Login));
    }

    #[test]
    fn test_file_paths() {
        assert_eq!(files_path("u", "c"), "/auth/user/u/category/c/file");
        assert_eq!(file_path("u", "c", "f"), "/auth/user/u/category/c/file/f");
    }
}
