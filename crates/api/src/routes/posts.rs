//! Post and attachment routes.
//!
//! Create and update accept `multipart/form-data` and answer with a
//! redirect back to the page the form was posted from.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::Field},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use garde::Validate;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{error_response, validation_response},
    middleware::AuthUser,
};
use postboard_core::post::{
    Attachment, CreatePostInput, FilePayload, PostError, PostService, UpdatePostInput,
};
use postboard_core::storage::StorageService;
use postboard_db::PostRepository;

/// Body returned when a non-owner tries to delete a post.
pub const DELETE_FORBIDDEN_MESSAGE: &str = "You do not have permission to delete this post";

/// Creates the post routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route(
            "/posts/{post_id}",
            axum::routing::put(update_post)
                .patch(update_post)
                .delete(delete_post),
        )
        .route("/posts/{post_id}/attachments", get(list_attachments))
        .route(
            "/attachments/{attachment_id}/download",
            get(download_attachment),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Fields of the create and update forms.
#[derive(Debug, Default, Validate)]
struct PostForm {
    #[garde(length(chars, max = 65_535))]
    body: String,
    #[garde(skip)]
    group_id: Option<Uuid>,
    #[garde(length(max = 100))]
    deleted_file_ids: Vec<Uuid>,
    #[garde(length(max = 20))]
    attachments: Vec<FilePayload>,
}

/// Response for an attachment.
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    /// Attachment ID.
    pub id: Uuid,
    /// Parent post ID.
    pub post_id: Uuid,
    /// Original filename.
    pub name: String,
    /// MIME type.
    pub mime: String,
    /// File size in bytes.
    pub size: i64,
    /// Uploader.
    pub created_by: Uuid,
    /// Created at timestamp (ISO 8601).
    pub created_at: String,
    /// Download path.
    pub download_url: String,
}

impl From<Attachment> for AttachmentResponse {
    fn from(a: Attachment) -> Self {
        Self {
            download_url: format!("/api/v1/attachments/{}/download", a.id),
            id: a.id,
            post_id: a.post_id,
            name: a.name,
            mime: a.mime,
            size: a.size,
            created_by: a.created_by,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn post_service(state: &AppState) -> PostService<PostRepository, StorageService> {
    PostService::new(
        Arc::new(PostRepository::new((*state.db).clone())),
        Arc::clone(&state.storage),
    )
}

/// 303 to the `Referer`, or to `/` without one.
fn redirect_back(headers: &HeaderMap) -> Response {
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("/");
    Redirect::to(target).into_response()
}

/// `attachment; filename="..."` with quotes, backslashes and non-ASCII replaced.
fn content_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, Response> {
    value
        .trim()
        .parse()
        .map_err(|_| validation_response(format!("{field} must be a UUID")))
}

async fn field_text(field: Field<'_>) -> Result<String, Response> {
    field.text().await.map_err(IntoResponse::into_response)
}

/// Read the form. Array-style names such as `attachments[]` are accepted.
async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, Response> {
    let mut form = PostForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let name = field
            .name()
            .unwrap_or_default()
            .trim_end_matches("[]")
            .to_string();

        match name.as_str() {
            "body" => form.body = field_text(field).await?,
            "group_id" => {
                let value = field_text(field).await?;
                if !value.trim().is_empty() {
                    form.group_id = Some(parse_uuid("group_id", &value)?);
                }
            }
            "deleted_file_ids" => {
                let value = field_text(field).await?;
                form.deleted_file_ids
                    .push(parse_uuid("deleted_file_ids", &value)?);
            }
            "attachments" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;

                // Browsers send an empty part when no file was picked
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.attachments
                    .push(FilePayload::new(filename, content_type, bytes));
            }
            _ => {}
        }
    }

    form.validate()
        .map_err(|report| validation_response(report.to_string()))?;
    Ok(form)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/posts`
/// Create a post with its attachments.
async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let form = match read_post_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let input = CreatePostInput {
        user_id: auth.user_id(),
        group_id: form.group_id,
        body: form.body,
        attachments: form.attachments,
    };

    match post_service(&state).create(input).await {
        Ok(_) => redirect_back(&headers),
        Err(e) => error_response(e),
    }
}

/// PUT/PATCH `/posts/{post_id}`
/// Update a post, deleting and adding attachments.
async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let form = match read_post_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let input = UpdatePostInput {
        post_id,
        actor_id: auth.user_id(),
        body: form.body,
        deleted_attachment_ids: form.deleted_file_ids,
        attachments: form.attachments,
    };

    match post_service(&state).update(input).await {
        Ok(_) => redirect_back(&headers),
        Err(e) => error_response(e),
    }
}

/// DELETE `/posts/{post_id}`
/// Delete a post. Only its owner may.
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    match post_service(&state).delete(post_id, auth.user_id()).await {
        Ok(()) => redirect_back(&headers),
        Err(PostError::PermissionDenied { .. }) => {
            (StatusCode::FORBIDDEN, DELETE_FORBIDDEN_MESSAGE).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/posts/{post_id}/attachments`
/// List a post's attachments.
async fn list_attachments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Response {
    match post_service(&state).list_attachments(post_id).await {
        Ok(attachments) => {
            let data: Vec<AttachmentResponse> =
                attachments.into_iter().map(AttachmentResponse::from).collect();
            Json(data).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/attachments/{attachment_id}/download`
/// Send the file under its original name.
async fn download_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<Uuid>,
) -> Response {
    match post_service(&state).download(attachment_id).await {
        Ok(download) => {
            info!(
                attachment_id = %attachment_id,
                user_id = %auth.user_id(),
                "Attachment downloaded"
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, download.mime),
                    (
                        header::CONTENT_DISPOSITION,
                        content_disposition(&download.name),
                    ),
                ],
                download.content,
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use rstest::rstest;

    use super::*;
    use crate::routes::test_support::*;

    fn multipart_request(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Body,
    ) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", bearer(state))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    #[rstest]
    #[case("report.pdf", "attachment; filename=\"report.pdf\"")]
    #[case("say \"hi\".txt", "attachment; filename=\"say _hi_.txt\"")]
    #[case("отчёт.pdf", "attachment; filename=\"_____.pdf\"")]
    fn test_content_disposition(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(content_disposition(name), expected);
    }

    #[test]
    fn test_redirect_back_uses_referer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, "/groups/rust".parse().unwrap());

        let response = redirect_back(&headers);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/groups/rust");
    }

    #[test]
    fn test_redirect_back_defaults_to_root() {
        let response = redirect_back(&HeaderMap::new());
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let state = test_state();
        let response = send(
            app(&state),
            Request::post("/posts")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(multipart_body(&[("body", "Hello")], &[]))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_group_id() {
        let state = test_state();
        let body = multipart_body(&[("body", "Hello"), ("group_id", "not-a-uuid")], &[]);
        let response = send(app(&state), multipart_request(&state, "POST", "/posts", body)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].as_str().unwrap().contains("group_id"));
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_body_text() {
        let state = test_state();
        let long = "a".repeat(65_536);
        let body = multipart_body(&[("body", &long)], &[]);
        let response = send(app(&state), multipart_request(&state, "POST", "/posts", body)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[rstest]
    #[case("a", 65_535, true)]
    #[case("a", 65_536, false)]
    #[case("ж", 65_535, true)]
    #[case("ж", 65_536, false)]
    fn test_body_limit_counts_characters(
        #[case] unit: &str,
        #[case] count: usize,
        #[case] valid: bool,
    ) {
        let form = PostForm {
            body: unit.repeat(count),
            ..PostForm::default()
        };
        assert_eq!(form.validate().is_ok(), valid);
    }

    #[tokio::test]
    async fn test_create_accepts_long_multibyte_body() {
        let state = test_state();
        let text = "ж".repeat(40_000);
        let body = multipart_body(&[("body", &text)], &[]);
        let response = send(app(&state), multipart_request(&state, "POST", "/posts", body)).await;

        // Passes validation and reaches the (disconnected) database.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_deleted_file_id() {
        let state = test_state();
        let body = multipart_body(
            &[("body", "Edited"), ("deleted_file_ids[]", "42")],
            &[("attachments[]", "a.pdf", "application/pdf", "%PDF")],
        );
        let uri = format!("/posts/{}", Uuid::new_v4());
        let response = send(app(&state), multipart_request(&state, "PUT", &uri, body)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_delete_with_unavailable_database() {
        let state = test_state();
        let response = send(
            app(&state),
            Request::delete(format!("/posts/{}", Uuid::new_v4()))
                .header("Authorization", bearer(&state))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "database_error");
    }

    #[tokio::test]
    async fn test_download_requires_token() {
        let state = test_state();
        let response = send(
            app(&state),
            Request::get(format!("/attachments/{}/download", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!body_text(response).await.is_empty());
    }

    #[test]
    fn test_forbidden_message_is_literal() {
        assert_eq!(
            DELETE_FORBIDDEN_MESSAGE,
            "You do not have permission to delete this post"
        );
    }
}
