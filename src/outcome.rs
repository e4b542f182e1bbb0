//! Delete outcome classification
//!
//! A role delete succeeds in distinct ways depending on whether dependent
//! users had to be reassigned first; the remote signals this through the
//! HTTP status code alone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GatewayError, Result};

const NO_REASSIGNMENT_MESSAGE: &str = "Role deleted successfully. No users required reassignment.";
const REASSIGNMENT_MESSAGE: &str = "Role deleted successfully after reassigning users.";
const DELETED_MESSAGE: &str = "Deleted successfully.";
const NOT_FOUND_MESSAGE: &str = "Not found.";

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_ERROR: &str = "ERROR";

/// Result of a delete call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The remote confirmed deletion without further detail
    Deleted,
    /// 204: nothing depended on the role
    DeletedNoReassignment,
    /// 200: dependent users were reassigned before deletion
    DeletedWithReassignment,
    /// Any other 2xx, carrying the remote payload through
    Acknowledged(BTreeMap<String, String>),
    /// The remote has no such entity
    NotFound,
    /// The remote declined the delete
    Error(String),
}

/// Classify a raw delete response
pub fn classify_delete(status: u16, body: &[u8]) -> DeleteOutcome {
    match status {
        204 => DeleteOutcome::DeletedNoReassignment,
        200 => DeleteOutcome::DeletedWithReassignment,
        400..=u16::MAX => DeleteOutcome::Error(String::from_utf8_lossy(body).into_owned()),
        201..=299 => match decode_payload(body) {
            Ok(payload) => DeleteOutcome::Acknowledged(payload),
            Err(message) => DeleteOutcome::Error(message),
        },
        other => DeleteOutcome::Error(format!("Unexpected status {}", other)),
    }
}

fn decode_payload(body: &[u8]) -> std::result::Result<BTreeMap<String, String>, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let raw: BTreeMap<String, Value> = serde_json::from_slice(body)
        .map_err(|e| format!("Undecodable delete response: {}", e))?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect())
}

impl DeleteOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, DeleteOutcome::Error(_) | DeleteOutcome::NotFound)
    }

    /// Human-readable message for callers
    pub fn message(&self) -> String {
        match self {
            DeleteOutcome::Deleted => DELETED_MESSAGE.to_string(),
            DeleteOutcome::DeletedNoReassignment => NO_REASSIGNMENT_MESSAGE.to_string(),
            DeleteOutcome::DeletedWithReassignment => REASSIGNMENT_MESSAGE.to_string(),
            DeleteOutcome::Acknowledged(payload) => payload
                .get("message")
                .cloned()
                .unwrap_or_else(|| DELETED_MESSAGE.to_string()),
            DeleteOutcome::NotFound => NOT_FOUND_MESSAGE.to_string(),
            DeleteOutcome::Error(message) => message.clone(),
        }
    }

    /// Caller-facing `{message, status}` body
    ///
    /// An acknowledged payload is rendered as the remote sent it, with
    /// `status` filled in only when the remote left it out.
    pub fn into_response(self) -> DeleteResponse {
        if let DeleteOutcome::Acknowledged(mut details) = self {
            return DeleteResponse {
                message: details.remove("message"),
                status: details
                    .remove("status")
                    .unwrap_or_else(|| STATUS_SUCCESS.to_string()),
                details,
            };
        }
        let status = if self.is_success() {
            STATUS_SUCCESS
        } else {
            STATUS_ERROR
        };
        DeleteResponse {
            message: Some(self.message()),
            status: status.to_string(),
            details: BTreeMap::new(),
        }
    }

    /// Turn a declined delete into [`GatewayError::Outcome`]
    ///
    /// [`DeleteOutcome::NotFound`] stays an `Ok` value.
    pub fn into_result(self) -> Result<Self> {
        match self {
            DeleteOutcome::Error(message) => Err(GatewayError::Outcome(message)),
            outcome => Ok(outcome),
        }
    }
}

/// Delete result body, a flat string map on the wire
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeleteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: String,
    /// Remaining keys of a pass-through payload
    #[serde(flatten)]
    pub details: BTreeMap<String, String>,
}
