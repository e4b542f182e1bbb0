//! Inbound HTTP surface
//!
//! REST controllers for roles and users plus a `/graphql` endpoint backed by
//! [`crate::schema`]. Not-found results render as 404; gateway errors are
//! translated here and nowhere else.

use async_graphql::{Request, Response};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tracing::error;
use uuid::Uuid;

use crate::gateway::Gateway;
use crate::model::{NewRole, NewUser, Role, RoleId, RolePatch, User, UserPatch};
use crate::outcome::{DeleteOutcome, STATUS_ERROR};
use crate::schema::GatewaySchema;
use crate::GatewayError;

impl GatewayError {
    /// HTTP status used when this error reaches a REST caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::Transport(_) | GatewayError::Protocol(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Mapping(_)
            | GatewayError::Outcome(_)
            | GatewayError::Config(_)
            | GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> HttpResponse {
        let status = self.status_code();
        error!(%status, error = %self, "Request failed");
        (status, Json(json!({ "message": self.to_string(), "status": STATUS_ERROR }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, GatewayError>;

fn found<T: serde::Serialize>(entity: Option<T>) -> HttpResponse {
    match entity {
        Some(entity) => Json(entity).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Router exposing REST routes and the GraphQL endpoint
pub fn router(gateway: Gateway, schema: GatewaySchema) -> Router {
    Router::new()
        .route("/api/roles", get(list_roles).post(create_role))
        .route(
            "/api/roles/{id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/graphql", post(graphql_handler))
        .layer(Extension(schema))
        .with_state(gateway)
}

/// Execute a GraphQL request against the gateway schema
pub async fn graphql_handler(
    Extension(schema): Extension<GatewaySchema>,
    req: Json<Request>,
) -> Json<Response> {
    Json(schema.execute(req.0).await)
}

async fn list_roles(State(gateway): State<Gateway>) -> ApiResult<Json<Vec<Role>>> {
    Ok(Json(gateway.roles.get_all().await?))
}

async fn get_role(State(gateway): State<Gateway>, Path(id): Path<RoleId>) -> ApiResult<HttpResponse> {
    Ok(found(gateway.roles.get_by_id(id).await?))
}

async fn create_role(
    State(gateway): State<Gateway>,
    Json(role): Json<NewRole>,
) -> ApiResult<(StatusCode, Json<Role>)> {
    let created = gateway.roles.create(&role).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_role(
    State(gateway): State<Gateway>,
    Path(id): Path<RoleId>,
    Json(updates): Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let patch = RolePatch::from_map(&updates)?;
    Ok(found(gateway.roles.update(id, &patch).await?))
}

async fn delete_role(State(gateway): State<Gateway>, Path(id): Path<RoleId>) -> ApiResult<HttpResponse> {
    let outcome = gateway.roles.delete(id).await?;
    if outcome == DeleteOutcome::NotFound {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(outcome.into_response())).into_response())
}

async fn list_users(State(gateway): State<Gateway>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(gateway.users.get_all().await?))
}

async fn get_user(State(gateway): State<Gateway>, Path(id): Path<Uuid>) -> ApiResult<HttpResponse> {
    Ok(found(gateway.users.get_by_id(id).await?))
}

async fn create_user(
    State(gateway): State<Gateway>,
    Json(user): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let created = gateway.users.create(&user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_user(
    State(gateway): State<Gateway>,
    Path(id): Path<Uuid>,
    Json(updates): Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let patch = UserPatch::from_map(&updates)?;
    Ok(found(gateway.users.update(id, &patch).await?))
}

async fn delete_user(State(gateway): State<Gateway>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    match gateway.users.delete(id).await?.into_result()? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Ok(StatusCode::NOT_FOUND),
        _ => Ok(StatusCode::OK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BindingStyle;
    use crate::roles::tests::ScriptedTransport;
    use crate::roles::RoleGraphQLService;
    use crate::schema::build_schema;
    use crate::users::UserGraphQLService;
    use std::sync::Arc;

    fn gateway(reply: Value) -> Gateway {
        let transport = ScriptedTransport::new(reply);
        Gateway::new(
            Arc::new(RoleGraphQLService::new(transport.clone(), BindingStyle::Variables)),
            Arc::new(UserGraphQLService::new(transport, BindingStyle::Variables)),
        )
    }

    async fn serve(gateway: Gateway) -> String {
        let app = router(gateway.clone(), build_schema(gateway));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            GatewayError::InvalidInput("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Protocol(vec!["x".to_string()]).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Mapping("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_missing_role_is_404() {
        let base = serve(gateway(Value::Null)).await;
        let response = reqwest::get(format!("{}/api/roles/4", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_with_bad_type_is_400() {
        let base = serve(gateway(Value::Null)).await;
        let response = reqwest::Client::new()
            .put(format!("{}/api/roles/4", base))
            .json(&json!({ "name": false }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_role_renders_outcome_body() {
        let base = serve(gateway(json!(true))).await;
        let response = reqwest::Client::new()
            .delete(format!("{}/api/roles/4", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], json!("SUCCESS"));
    }

    #[tokio::test]
    async fn test_delete_missing_role_is_404() {
        let base = serve(gateway(Value::Null)).await;
        let response = reqwest::Client::new()
            .delete(format!("{}/api/roles/4", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_404() {
        let base = serve(gateway(Value::Null)).await;
        let response = reqwest::Client::new()
            .delete(format!("{}/api/users/6f1c1d2e-8a43-4f4e-9a0b-2a3f1e6b7c8d", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_user_is_204() {
        let base = serve(gateway(json!(true))).await;
        let response = reqwest::Client::new()
            .delete(format!("{}/api/users/6f1c1d2e-8a43-4f4e-9a0b-2a3f1e6b7c8d", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_graphql_endpoint_delegates_to_gateway() {
        let base = serve(gateway(json!({ "roleId": 4, "name": "ops" }))).await;
        let response = reqwest::Client::new()
            .post(format!("{}/graphql", base))
            .json(&json!({ "query": "{ getRole(id: 4) { roleId name } }" }))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["data"]["getRole"], json!({ "roleId": 4, "name": "ops" }));
    }

    #[tokio::test]
    async fn test_graphql_rejects_invalid_user_id() {
        let base = serve(gateway(Value::Null)).await;
        let response = reqwest::Client::new()
            .post(format!("{}/graphql", base))
            .json(&json!({ "query": "{ getUser(id: \"nope\") { userId } }" }))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert!(body["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("not a valid user id"));
    }
}
