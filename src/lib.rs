//! # rm-gateway
//!
//! Gateway exposing REST and GraphQL endpoints for `User` and `Role`
//! entities, forwarding every operation to remote function endpoints.
//!
//! ## Features
//!
//! - **Query Documents** - GraphQL query/mutation synthesis with bound variables
//! - **Transports** - GraphQL-over-HTTP and REST fallback clients
//! - **Response Mapping** - Typed decoding of semi-structured remote payloads
//! - **Delete Outcomes** - Status-code driven classification of role deletes
//! - **Services** - Five CRUD operations per entity behind either transport
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rm_gateway::config::GatewayConfig;
//! use rm_gateway::Gateway;
//!
//! # async fn example() -> rm_gateway::Result<()> {
//! let config = GatewayConfig::load("gateway.toml")?;
//! let gateway = Gateway::from_settings(config.select("dev")?)?;
//! let roles = gateway.roles.get_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod gateway;
pub mod http;
pub mod mapper;
pub mod model;
pub mod outcome;
pub mod rest;
pub mod roles;
pub mod schema;
pub mod telemetry;
pub mod transport;
pub mod users;

pub use document::{BindingStyle, DocumentBuilder, OperationKind, QueryDocument, Scalar};
pub use gateway::Gateway;
pub use model::{NewRole, NewUser, Role, RoleId, RolePatch, User, UserId, UserPatch};
pub use outcome::{classify_delete, DeleteOutcome, DeleteResponse};
pub use roles::{RoleGraphQLService, RoleRestService, RoleService};
pub use transport::{GraphQLTransport, HttpGraphQLTransport};
pub use users::{UserGraphQLService, UserRestService, UserService};

use thiserror::Error;

/// Gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The HTTP exchange itself failed (connection, timeout, non-2xx status).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a GraphQL `errors` array.
    #[error("GraphQL error: {}", .0.join("; "))]
    Protocol(Vec<String>),

    /// The remote payload did not match the expected shape.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// The remote declined the operation.
    #[error("Operation declined: {0}")]
    Outcome(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
