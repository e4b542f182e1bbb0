//! Entity records for users and roles
//!
//! Every field of a mapped entity is an `Option`: `None` means the remote
//! did not send the field, never a zero value standing in for real data.

use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::document::{Binding, Scalar};
use crate::{GatewayError, Result};

/// Role identifier as issued by the remote side
pub type RoleId = i64;

/// User identifier as issued by the remote side
pub type UserId = Uuid;

/// Role record
#[derive(SimpleObject, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Role {
    #[serde(rename = "roleId")]
    #[graphql(name = "roleId")]
    pub id: Option<RoleId>,
    pub name: Option<String>,
}

/// User record with a denormalized copy of its role
#[derive(SimpleObject, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userId")]
    #[graphql(name = "userId")]
    pub id: Option<UserId>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[graphql(skip)]
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Input for creating a role
#[derive(InputObject, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "RoleInput")]
pub struct NewRole {
    pub name: String,
}

impl NewRole {
    /// Fields sent on create, in declaration order
    pub fn bindings(&self) -> Vec<Binding> {
        vec![("name", Scalar::String(self.name.clone()))]
    }
}

/// Input for creating a user
#[derive(InputObject, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "UserInput")]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: RoleId,
}

impl NewUser {
    /// Fields sent on create, in declaration order
    pub fn bindings(&self) -> Vec<Binding> {
        vec![
            ("username", Scalar::String(self.username.clone())),
            ("email", Scalar::String(self.email.clone())),
            ("password", Scalar::String(self.password.clone())),
            ("roleId", Scalar::Int(self.role_id)),
        ]
    }
}

impl TryFrom<&User> for NewUser {
    type Error = GatewayError;

    fn try_from(user: &User) -> Result<Self> {
        fn required<T: Clone>(value: &Option<T>, field: &str) -> Result<T> {
            value
                .clone()
                .ok_or_else(|| GatewayError::InvalidInput(format!("'{}' is required", field)))
        }

        let role_id = user.role.as_ref().and_then(|role| role.id);
        Ok(Self {
            username: required(&user.username, "username")?,
            email: required(&user.email, "email")?,
            password: required(&user.password, "password")?,
            role_id: required(&role_id, "role.roleId")?,
        })
    }
}

/// Sparse update for a role; `None` fields are left untouched remotely
#[derive(InputObject, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[graphql(name = "RoleUpdateInput")]
pub struct RolePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RolePatch {
    /// Build a patch from an update map, keeping only recognised keys
    pub fn from_map(updates: &Map<String, Value>) -> Result<Self> {
        patch_from_map(updates)
    }

    /// Present fields in declaration order
    pub fn bindings(&self) -> Vec<Binding> {
        self.name
            .iter()
            .map(|name| ("name", Scalar::String(name.clone())))
            .collect()
    }
}

/// Sparse update for a user; `None` fields are left untouched remotely
#[derive(InputObject, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[graphql(name = "UserUpdateInput")]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
}

impl UserPatch {
    /// Build a patch from an update map, keeping only recognised keys
    pub fn from_map(updates: &Map<String, Value>) -> Result<Self> {
        patch_from_map(updates)
    }

    /// Present fields in declaration order
    pub fn bindings(&self) -> Vec<Binding> {
        let mut bindings = Vec::new();
        if let Some(username) = &self.username {
            bindings.push(("username", Scalar::String(username.clone())));
        }
        if let Some(email) = &self.email {
            bindings.push(("email", Scalar::String(email.clone())));
        }
        if let Some(password) = &self.password {
            bindings.push(("password", Scalar::String(password.clone())));
        }
        if let Some(role_id) = self.role_id {
            bindings.push(("roleId", Scalar::Int(role_id)));
        }
        bindings
    }
}

// Unknown keys are ignored and explicit nulls count as absent.
fn patch_from_map<T: serde::de::DeserializeOwned>(updates: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(updates.clone()))
        .map_err(|e| GatewayError::InvalidInput(format!("Invalid update: {}", e)))
}
