//! Response mapping into typed entities
//!
//! Raw root-field values are decoded through per-entity DTOs first, then
//! converted into domain records in one pass. A value of the wrong shape is
//! a [`GatewayError::Mapping`], never a silently defaulted entity.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::model::{Role, RoleId, User};
use crate::transport::json_kind;
use crate::{GatewayError, Result};

/// Entity kinds decodable from a remote payload
pub trait FromRemote: Sized {
    /// Kind name used in error messages
    const KIND: &'static str;

    /// Decode one non-null value
    fn from_remote(value: Value) -> Result<Self>;
}

/// Map a single entity; `null` means absent
pub fn map_one<T: FromRemote>(value: Value) -> Result<Option<T>> {
    match value {
        Value::Null => Ok(None),
        value => T::from_remote(value).map(Some),
    }
}

/// Map a list of entities; `null` is an empty list
///
/// The first malformed element aborts the whole conversion.
pub fn map_many<T: FromRemote>(value: Value) -> Result<Vec<T>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_remote(item).map_err(|e| match e {
                    GatewayError::Mapping(message) => {
                        GatewayError::Mapping(format!("element {}: {}", index, message))
                    }
                    other => other,
                })
            })
            .collect(),
        other => Err(GatewayError::Mapping(format!(
            "Expected a list of {}, found {}",
            T::KIND,
            json_kind(&other)
        ))),
    }
}

/// Map a delete confirmation
///
/// Accepts a boolean or its string form (case-insensitive `"true"`); any
/// other string or scalar is `false`. This leniency mirrors remotes that
/// answer either way and could hide a contract mismatch.
pub fn map_confirmation(value: Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::String(s) => Ok(Some(s.trim().eq_ignore_ascii_case("true"))),
        Value::Number(_) => Ok(Some(false)),
        other => Err(GatewayError::Mapping(format!(
            "Expected a boolean confirmation, found {}",
            json_kind(&other)
        ))),
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RemoteId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RoleDto {
    role_id: Option<RemoteId>,
    name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    user_id: Option<String>,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<RoleDto>,
}

impl RoleDto {
    fn into_domain(self) -> Result<Role> {
        let id = match self.role_id {
            None => None,
            Some(RemoteId::Number(id)) => Some(id),
            Some(RemoteId::Text(text)) => Some(text.trim().parse::<RoleId>().map_err(|_| {
                GatewayError::Mapping(format!("Invalid roleId '{}'", text))
            })?),
        };
        Ok(Role { id, name: self.name })
    }
}

impl UserDto {
    fn into_domain(self) -> Result<User> {
        let id = self
            .user_id
            .map(|raw| {
                Uuid::parse_str(&raw)
                    .map_err(|_| GatewayError::Mapping(format!("Invalid userId '{}'", raw)))
            })
            .transpose()?;
        let role = self.role.map(RoleDto::into_domain).transpose()?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password: self.password,
            role,
        })
    }
}

fn decode<D: DeserializeOwned>(kind: &str, value: Value) -> Result<D> {
    if !value.is_object() {
        return Err(GatewayError::Mapping(format!(
            "Expected an object for {}, found {}",
            kind,
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| GatewayError::Mapping(format!("{}: {}", kind, e)))
}

impl FromRemote for Role {
    const KIND: &'static str = "Role";

    fn from_remote(value: Value) -> Result<Self> {
        decode::<RoleDto>(Self::KIND, value)?.into_domain()
    }
}

impl FromRemote for User {
    const KIND: &'static str = "User";

    fn from_remote(value: Value) -> Result<Self> {
        decode::<UserDto>(Self::KIND, value)?.into_domain()
    }
}
