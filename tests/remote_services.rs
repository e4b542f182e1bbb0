use std::sync::Arc;
use std::time::Duration;

use rm_gateway::config::GatewayConfig;
use rm_gateway::rest::RestClient;
use rm_gateway::{
    BindingStyle, DeleteOutcome, Gateway, GatewayError, HttpGraphQLTransport, NewRole, Role,
    RoleGraphQLService, RolePatch, RoleRestService, RoleService, UserRestService, UserService,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api", server.uri())).unwrap()
}

fn graphql_roles(server: &MockServer, timeout: Duration) -> RoleGraphQLService<HttpGraphQLTransport> {
    let transport = HttpGraphQLTransport::new(base_url(server), timeout).unwrap();
    RoleGraphQLService::new(Arc::new(transport), BindingStyle::Variables)
}

fn rest_roles(server: &MockServer) -> RoleRestService {
    RoleRestService::new(RestClient::new(base_url(server), Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn test_graphql_get_role_binds_variables() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/getRoleFunctionGraphQL"))
        .and(header("X-REQUEST-TYPE", "GraphQL"))
        .and(body_partial_json(json!({ "variables": { "id": 5 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "getRole": { "roleId": 5, "name": "auditor" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let role = graphql_roles(&server, Duration::from_secs(5)).get_by_id(5).await.unwrap();
    assert_eq!(role, Some(Role { id: Some(5), name: Some("auditor".to_string()) }));
}

#[tokio::test]
async fn test_graphql_errors_array_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createRoleFunctionGraphQL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "saveRole": { "roleId": 1, "name": "dup" } },
            "errors": [{ "message": "name already taken" }]
        })))
        .mount(&server)
        .await;

    let err = graphql_roles(&server, Duration::from_secs(5))
        .create(&NewRole { name: "dup".to_string() })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "GraphQL error: name already taken");
}

#[tokio::test]
async fn test_graphql_http_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/getAllRolesFunctionGraphQL"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = graphql_roles(&server, Duration::from_secs(5)).get_all().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(message) if message == "status 503: unavailable"));
}

#[tokio::test]
async fn test_graphql_timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "getAllRoles": [] } }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let result = graphql_roles(&server, Duration::from_millis(50)).get_all().await;
    let err = assert_err!(result);
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let transport = HttpGraphQLTransport::new(
        Url::parse("http://127.0.0.1:1/api").unwrap(),
        Duration::from_secs(1),
    )
    .unwrap();
    let service = RoleGraphQLService::new(Arc::new(transport), BindingStyle::Variables);

    let err = service.get_all().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn test_graphql_partial_update_only_sends_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/updateRoleFunctionGraphQL"))
        .and(body_partial_json(json!({ "variables": { "id": 2 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "updateRole": { "roleId": 2, "name": "keeper" } }
        })))
        .mount(&server)
        .await;

    let service = graphql_roles(&server, Duration::from_secs(5));
    let updated = service.update(2, &RolePatch::default()).await.unwrap();
    assert_eq!(updated.and_then(|role| role.name), Some("keeper".to_string()));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["variables"], json!({ "id": 2 }));
    assert!(body["query"].as_str().unwrap().contains("input: {}"));
}

#[tokio::test]
async fn test_rest_delete_role_outcomes() {
    let server = MockServer::start().await;
    for (role_id, status, body) in [
        ("1", 204_u16, ""),
        ("2", 200, "{\"reassigned\":2}"),
        ("3", 422, "conflict"),
        ("4", 404, "no such role"),
    ] {
        Mock::given(method("DELETE"))
            .and(path("/api/deleteRoleFunction"))
            .and(query_param("roleId", role_id))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
    }

    let service = rest_roles(&server);
    assert_eq!(service.delete(1).await.unwrap(), DeleteOutcome::DeletedNoReassignment);
    assert_eq!(service.delete(2).await.unwrap(), DeleteOutcome::DeletedWithReassignment);
    assert_eq!(
        service.delete(3).await.unwrap(),
        DeleteOutcome::Error("conflict".to_string())
    );
    assert_eq!(
        service.delete(4).await.unwrap(),
        DeleteOutcome::Error("no such role".to_string())
    );
}

#[tokio::test]
async fn test_rest_delete_missing_user_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/deleteUserFunction"))
        .and(query_param("userId", "6f1c1d2e-8a43-4f4e-9a0b-2a3f1e6b7c8d"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let service =
        UserRestService::new(RestClient::new(base_url(&server), Duration::from_secs(5)).unwrap());
    let id = "6f1c1d2e-8a43-4f4e-9a0b-2a3f1e6b7c8d".parse().unwrap();
    assert_eq!(service.delete(id).await.unwrap(), DeleteOutcome::NotFound);
}

#[tokio::test]
async fn test_rest_get_missing_role_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getRoleFunction"))
        .and(query_param("roleId", "8"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such role"))
        .mount(&server)
        .await;

    let role = assert_ok!(rest_roles(&server).get_by_id(8).await);
    assert_eq!(role, None);
}

#[tokio::test]
async fn test_gateway_from_config_uses_selected_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getAllUsersFunction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "userId": "6f1c1d2e-8a43-4f4e-9a0b-2a3f1e6b7c8d",
                "username": "ada",
                "email": "ada@example.com",
                "role": { "roleId": 1, "name": "admin" }
            }
        ])))
        .mount(&server)
        .await;

    let config = GatewayConfig::from_toml_str(&format!(
        r#"
        [environments.test]
        graphql_url = "{uri}/graphql"
        rest_url = "{uri}/api"
        transport = "rest"
        "#,
        uri = server.uri()
    ))
    .unwrap();
    let gateway = Gateway::from_settings(config.select("test").unwrap()).unwrap();

    let users = gateway.users.get_all().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role.as_ref().and_then(|role| role.id), Some(1));
}
