//! User operations over GraphQL or REST

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use crate::document::{BindingStyle, DocumentBuilder, Field, Scalar};
use crate::mapper::{map_confirmation, map_many, map_one};
use crate::model::{NewUser, User, UserId, UserPatch};
use crate::outcome::DeleteOutcome;
use crate::rest::{RestClient, RestReply};
use crate::roles::ROLE_SELECTION;
use crate::transport::GraphQLTransport;
use crate::{GatewayError, Result};

/// Fields selected for every user result
pub const USER_SELECTION: &[Field] = &[
    Field::Leaf("userId"),
    Field::Leaf("username"),
    Field::Leaf("email"),
    Field::Nested("role", ROLE_SELECTION),
];

/// The five user operations, independent of transport
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_all(&self) -> Result<Vec<User>>;

    /// `None` when the remote has no such user
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn create(&self, user: &NewUser) -> Result<User>;

    /// Apply only the fields present in `patch`
    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<Option<User>>;

    async fn delete(&self, id: UserId) -> Result<DeleteOutcome>;
}

// Field names only; values may carry a password.
fn patched_fields(patch: &UserPatch) -> Vec<&'static str> {
    patch.bindings().into_iter().map(|(name, _)| name).collect()
}

/// User operations through hand-built GraphQL documents
pub struct UserGraphQLService<T> {
    transport: Arc<T>,
    style: BindingStyle,
}

impl<T: GraphQLTransport> UserGraphQLService<T> {
    pub fn new(transport: Arc<T>, style: BindingStyle) -> Self {
        Self { transport, style }
    }
}

#[async_trait]
impl<T: GraphQLTransport> UserService for UserGraphQLService<T> {
    async fn get_all(&self) -> Result<Vec<User>> {
        info!("Fetching all users");
        let doc = DocumentBuilder::query("getAllUsers")
            .select(USER_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/getAllUsersFunctionGraphQL", &doc).await?;
        map_many(raw)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        info!(user_id = %id, "Fetching user");
        let doc = DocumentBuilder::query("getUser")
            .argument("id", Scalar::Id(id.to_string()))
            .select(USER_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/getUserFunctionGraphQL", &doc).await?;
        map_one(raw)
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        info!(username = %user.username, "Creating user");
        let doc = DocumentBuilder::mutation("saveUser")
            .input(user.bindings(), true)
            .select(USER_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/createUserFunctionGraphQL", &doc).await?;
        map_one(raw)?.ok_or_else(|| GatewayError::Mapping("saveUser returned no user".to_string()))
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<Option<User>> {
        info!(user_id = %id, fields = ?patched_fields(patch), "Updating user");
        let doc = DocumentBuilder::mutation("updateUser")
            .argument("id", Scalar::Id(id.to_string()))
            .input(patch.bindings(), false)
            .select(USER_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/updateUserFunctionGraphQL", &doc).await?;
        map_one(raw)
    }

    async fn delete(&self, id: UserId) -> Result<DeleteOutcome> {
        info!(user_id = %id, "Deleting user");
        let doc = DocumentBuilder::mutation("deleteUser")
            .argument("id", Scalar::Id(id.to_string()))
            .build(self.style);
        let raw = self.transport.execute("/deleteUserFunctionGraphQL", &doc).await?;
        Ok(match map_confirmation(raw)? {
            Some(true) => DeleteOutcome::Deleted,
            Some(false) => DeleteOutcome::Error(format!("User {} was not deleted", id)),
            None => DeleteOutcome::NotFound,
        })
    }
}

/// User operations through the REST function endpoints
pub struct UserRestService {
    client: RestClient,
}

impl UserRestService {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

fn user_query(id: UserId) -> [(&'static str, String); 1] {
    [("userId", id.to_string())]
}

#[async_trait]
impl UserService for UserRestService {
    async fn get_all(&self) -> Result<Vec<User>> {
        info!("Fetching all users");
        match self.client.fetch("/getAllUsersFunction", &[]).await? {
            RestReply::Json(raw) => map_many(raw),
            RestReply::Empty | RestReply::NotFound => Ok(Vec::new()),
        }
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        info!(user_id = %id, "Fetching user");
        match self.client.fetch("/getUserFunction", &user_query(id)).await? {
            RestReply::Json(raw) => map_one(raw),
            RestReply::Empty | RestReply::NotFound => Ok(None),
        }
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        info!(username = %user.username, "Creating user");
        match self
            .client
            .send(Method::POST, "/createUserFunction", &[], user)
            .await?
        {
            RestReply::Json(raw) => map_one(raw)?.ok_or_else(|| {
                GatewayError::Mapping("createUserFunction returned no user".to_string())
            }),
            RestReply::Empty | RestReply::NotFound => Err(GatewayError::Mapping(
                "createUserFunction returned an empty body".to_string(),
            )),
        }
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<Option<User>> {
        info!(user_id = %id, fields = ?patched_fields(patch), "Updating user");
        match self
            .client
            .send(Method::PUT, "/updateUserFunction", &user_query(id), patch)
            .await?
        {
            RestReply::NotFound => Ok(None),
            RestReply::Json(raw) => map_one(raw),
            RestReply::Empty => Err(GatewayError::Mapping(
                "updateUserFunction returned an empty body".to_string(),
            )),
        }
    }

    async fn delete(&self, id: UserId) -> Result<DeleteOutcome> {
        info!(user_id = %id, "Deleting user");
        let (status, body) = self.client.delete("/deleteUserFunction", &user_query(id)).await?;
        Ok(match status {
            200..=299 => DeleteOutcome::Deleted,
            404 => DeleteOutcome::NotFound,
            _ => DeleteOutcome::Error(String::from_utf8_lossy(&body).into_owned()),
        })
    }
}
