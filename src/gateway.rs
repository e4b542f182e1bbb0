//! Service wiring for the selected environment

use std::sync::Arc;

use tracing::info;

use crate::config::{ClientSettings, TransportKind};
use crate::rest::RestClient;
use crate::roles::{RoleGraphQLService, RoleRestService, RoleService};
use crate::transport::HttpGraphQLTransport;
use crate::users::{UserGraphQLService, UserRestService, UserService};
use crate::Result;

/// Role and user services sharing one configured transport
#[derive(Clone)]
pub struct Gateway {
    pub roles: Arc<dyn RoleService>,
    pub users: Arc<dyn UserService>,
}

impl Gateway {
    pub fn new(roles: Arc<dyn RoleService>, users: Arc<dyn UserService>) -> Self {
        Self { roles, users }
    }

    /// Build both services over the transport named in `settings`
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        match settings.transport {
            TransportKind::GraphQL => {
                info!(endpoint = %settings.graphql_url, binding = ?settings.binding, "Using GraphQL transport");
                let transport = Arc::new(HttpGraphQLTransport::new(
                    settings.graphql_url.clone(),
                    settings.timeout(),
                )?);
                Ok(Self::new(
                    Arc::new(RoleGraphQLService::new(transport.clone(), settings.binding)),
                    Arc::new(UserGraphQLService::new(transport, settings.binding)),
                ))
            }
            TransportKind::Rest => {
                info!(endpoint = %settings.rest_url, "Using REST transport");
                let client = RestClient::new(settings.rest_url.clone(), settings.timeout())?;
                Ok(Self::new(
                    Arc::new(RoleRestService::new(client.clone())),
                    Arc::new(UserRestService::new(client)),
                ))
            }
        }
    }
}
