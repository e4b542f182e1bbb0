//! Role operations over GraphQL or REST

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::{error, info};

use crate::document::{BindingStyle, DocumentBuilder, Field, Scalar};
use crate::mapper::{map_confirmation, map_many, map_one};
use crate::model::{NewRole, Role, RoleId, RolePatch};
use crate::outcome::{classify_delete, DeleteOutcome};
use crate::rest::{RestClient, RestReply};
use crate::transport::GraphQLTransport;
use crate::{GatewayError, Result};

/// Fields selected for every role result
pub const ROLE_SELECTION: &[Field] = &[Field::Leaf("roleId"), Field::Leaf("name")];

/// The five role operations, independent of transport
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Role>>;

    /// `None` when the remote has no such role
    async fn get_by_id(&self, id: RoleId) -> Result<Option<Role>>;

    async fn create(&self, role: &NewRole) -> Result<Role>;

    /// Apply only the fields present in `patch`
    async fn update(&self, id: RoleId, patch: &RolePatch) -> Result<Option<Role>>;

    async fn delete(&self, id: RoleId) -> Result<DeleteOutcome>;
}

/// Role operations through hand-built GraphQL documents
pub struct RoleGraphQLService<T> {
    transport: Arc<T>,
    style: BindingStyle,
}

impl<T: GraphQLTransport> RoleGraphQLService<T> {
    pub fn new(transport: Arc<T>, style: BindingStyle) -> Self {
        Self { transport, style }
    }
}

#[async_trait]
impl<T: GraphQLTransport> RoleService for RoleGraphQLService<T> {
    async fn get_all(&self) -> Result<Vec<Role>> {
        info!("Fetching all roles");
        let doc = DocumentBuilder::query("getAllRoles")
            .select(ROLE_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/getAllRolesFunctionGraphQL", &doc).await?;
        map_many(raw)
    }

    async fn get_by_id(&self, id: RoleId) -> Result<Option<Role>> {
        info!(role_id = id, "Fetching role");
        let doc = DocumentBuilder::query("getRole")
            .argument("id", Scalar::Int(id))
            .select(ROLE_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/getRoleFunctionGraphQL", &doc).await?;
        map_one(raw)
    }

    async fn create(&self, role: &NewRole) -> Result<Role> {
        info!(name = %role.name, "Creating role");
        let doc = DocumentBuilder::mutation("saveRole")
            .input(role.bindings(), true)
            .select(ROLE_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/createRoleFunctionGraphQL", &doc).await?;
        map_one(raw)?.ok_or_else(|| GatewayError::Mapping("saveRole returned no role".to_string()))
    }

    async fn update(&self, id: RoleId, patch: &RolePatch) -> Result<Option<Role>> {
        info!(role_id = id, ?patch, "Updating role");
        let doc = DocumentBuilder::mutation("updateRole")
            .argument("id", Scalar::Int(id))
            .input(patch.bindings(), false)
            .select(ROLE_SELECTION)
            .build(self.style);
        let raw = self.transport.execute("/updateRoleFunctionGraphQL", &doc).await?;
        map_one(raw)
    }

    async fn delete(&self, id: RoleId) -> Result<DeleteOutcome> {
        info!(role_id = id, "Deleting role");
        let doc = DocumentBuilder::mutation("deleteRole")
            .argument("id", Scalar::Int(id))
            .build(self.style);
        let raw = self.transport.execute("/deleteRoleFunctionGraphQL", &doc).await?;
        Ok(match map_confirmation(raw)? {
            Some(true) => DeleteOutcome::Deleted,
            Some(false) => DeleteOutcome::Error(format!("Role {} was not deleted", id)),
            None => DeleteOutcome::NotFound,
        })
    }
}

/// Role operations through the REST function endpoints
pub struct RoleRestService {
    client: RestClient,
}

impl RoleRestService {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

fn role_query(id: RoleId) -> [(&'static str, String); 1] {
    [("roleId", id.to_string())]
}

fn echoed_role(reply: RestReply, operation: &str) -> Result<Option<Role>> {
    match reply {
        RestReply::NotFound => Ok(None),
        RestReply::Json(raw) => map_one(raw),
        RestReply::Empty => Err(GatewayError::Mapping(format!(
            "{} returned an empty body",
            operation
        ))),
    }
}

#[async_trait]
impl RoleService for RoleRestService {
    async fn get_all(&self) -> Result<Vec<Role>> {
        info!("Fetching all roles");
        match self.client.fetch("/getAllRolesFunction", &[]).await? {
            RestReply::Json(raw) => map_many(raw),
            RestReply::Empty | RestReply::NotFound => Ok(Vec::new()),
        }
    }

    async fn get_by_id(&self, id: RoleId) -> Result<Option<Role>> {
        info!(role_id = id, "Fetching role");
        match self.client.fetch("/getRoleFunction", &role_query(id)).await? {
            RestReply::Json(raw) => map_one(raw),
            RestReply::Empty | RestReply::NotFound => Ok(None),
        }
    }

    async fn create(&self, role: &NewRole) -> Result<Role> {
        info!(name = %role.name, "Creating role");
        let reply = self
            .client
            .send(Method::POST, "/createRoleFunction", &[], role)
            .await?;
        echoed_role(reply, "createRoleFunction")?
            .ok_or_else(|| GatewayError::Mapping("createRoleFunction returned no role".to_string()))
    }

    async fn update(&self, id: RoleId, patch: &RolePatch) -> Result<Option<Role>> {
        info!(role_id = id, ?patch, "Updating role");
        let reply = self
            .client
            .send(Method::PUT, "/updateRoleFunction", &role_query(id), patch)
            .await?;
        echoed_role(reply, "updateRoleFunction")
    }

    async fn delete(&self, id: RoleId) -> Result<DeleteOutcome> {
        info!(role_id = id, "Deleting role");
        let (status, body) = self.client.delete("/deleteRoleFunction", &role_query(id)).await?;
        info!(role_id = id, status, "Delete role response");
        let outcome = classify_delete(status, &body);
        if let DeleteOutcome::Error(message) = &outcome {
            error!(role_id = id, %message, "Remote declined role delete");
        }
        Ok(outcome)
    }
}
