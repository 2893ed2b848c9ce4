//! Post reaction route.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::{error_response, validation_response},
    middleware::AuthUser,
};
use postboard_core::reaction::{ReactionService, ReactionType};
use postboard_db::ReactionRepository;

/// Creates the reaction routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/posts/{post_id}/reaction", post(toggle_reaction))
}

/// Request body for a reaction toggle.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    /// Reaction type, e.g. `like`. Unknown names fail deserialization.
    pub reaction: ReactionType,
}

/// POST `/posts/{post_id}/reaction`
/// Add the user's reaction, or remove the one they already have.
async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<Uuid>,
    payload: Result<Json<ReactionRequest>, JsonRejection>,
) -> Response {
    let reaction_type = match payload {
        Ok(Json(request)) => request.reaction,
        Err(JsonRejection::JsonDataError(e)) => return validation_response(e.body_text()),
        Err(rejection) => return rejection.into_response(),
    };

    let service = ReactionService::new(Arc::new(ReactionRepository::new((*state.db).clone())));

    match service.toggle(auth.user_id(), post_id, reaction_type).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use rstest::rstest;
    use uuid::Uuid;

    use crate::routes::test_support::*;

    fn reaction_request(state: &crate::AppState, body: &str) -> Request<Body> {
        Request::post(format!("/posts/{}/reaction", Uuid::new_v4()))
            .header("Authorization", bearer(state))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[rstest]
    #[case(r#"{"reaction":"dislike"}"#)]
    #[case(r#"{"reaction":"LIKE"}"#)]
    #[tokio::test]
    async fn test_unknown_reaction_type_is_rejected(#[case] body: &str) {
        let state = test_state();
        let response = send(app(&state), reaction_request(&state, body)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_missing_reaction_field_is_rejected() {
        let state = test_state();
        let response = send(app(&state), reaction_request(&state, "{}")).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_bad_request() {
        let state = test_state();
        let response = send(app(&state), reaction_request(&state, "{\"reaction\":")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_database_failure_is_hidden() {
        let state = test_state();
        let response = send(
            app(&state),
            reaction_request(&state, r#"{"reaction":"like"}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "An error occurred");
    }
}
