//! Inbound GraphQL schema
//!
//! Resolvers delegate straight to the [`Gateway`] services held in the
//! schema data.

use async_graphql::{Context, EmptySubscription, Object, Schema, ID};
use uuid::Uuid;

use crate::gateway::Gateway;
use crate::model::{NewRole, NewUser, Role, RoleId, RolePatch, User, UserPatch};
use crate::outcome::DeleteOutcome;
use crate::GatewayError;

pub type GatewaySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with `gateway` injected as context data
pub fn build_schema(gateway: Gateway) -> GatewaySchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(gateway)
        .finish()
}

// `null` when there was nothing to delete; a declined delete is an error.
fn confirmed(outcome: DeleteOutcome) -> Result<Option<bool>, GatewayError> {
    match outcome.into_result()? {
        DeleteOutcome::NotFound => Ok(None),
        _ => Ok(Some(true)),
    }
}

fn user_id(id: &ID) -> Result<Uuid, GatewayError> {
    Uuid::parse_str(id.as_str())
        .map_err(|_| GatewayError::InvalidInput(format!("'{}' is not a valid user id", id.as_str())))
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn get_all_roles(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Role>> {
        Ok(ctx.data::<Gateway>()?.roles.get_all().await?)
    }

    async fn get_role(&self, ctx: &Context<'_>, id: RoleId) -> async_graphql::Result<Option<Role>> {
        Ok(ctx.data::<Gateway>()?.roles.get_by_id(id).await?)
    }

    async fn get_all_users(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<User>> {
        Ok(ctx.data::<Gateway>()?.users.get_all().await?)
    }

    async fn get_user(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<User>> {
        let id = user_id(&id)?;
        Ok(ctx.data::<Gateway>()?.users.get_by_id(id).await?)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn save_role(&self, ctx: &Context<'_>, input: NewRole) -> async_graphql::Result<Role> {
        Ok(ctx.data::<Gateway>()?.roles.create(&input).await?)
    }

    async fn update_role(
        &self,
        ctx: &Context<'_>,
        id: RoleId,
        input: RolePatch,
    ) -> async_graphql::Result<Option<Role>> {
        Ok(ctx.data::<Gateway>()?.roles.update(id, &input).await?)
    }

    async fn delete_role(&self, ctx: &Context<'_>, id: RoleId) -> async_graphql::Result<Option<bool>> {
        let outcome = ctx.data::<Gateway>()?.roles.delete(id).await?;
        Ok(confirmed(outcome)?)
    }

    async fn save_user(&self, ctx: &Context<'_>, input: NewUser) -> async_graphql::Result<User> {
        Ok(ctx.data::<Gateway>()?.users.create(&input).await?)
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UserPatch,
    ) -> async_graphql::Result<Option<User>> {
        let id = user_id(&id)?;
        Ok(ctx.data::<Gateway>()?.users.update(id, &input).await?)
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<bool>> {
        let id = user_id(&id)?;
        let outcome = ctx.data::<Gateway>()?.users.delete(id).await?;
        Ok(confirmed(outcome)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BindingStyle;
    use crate::roles::tests::ScriptedTransport;
    use crate::roles::RoleGraphQLService;
    use crate::users::UserGraphQLService;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn schema(reply: Value) -> GatewaySchema {
        let transport = ScriptedTransport::new(reply);
        build_schema(Gateway::new(
            Arc::new(RoleGraphQLService::new(transport.clone(), BindingStyle::Variables)),
            Arc::new(UserGraphQLService::new(transport, BindingStyle::Variables)),
        ))
    }

    #[tokio::test]
    async fn test_user_password_is_not_selectable() {
        let response = schema(json!([]))
            .execute("{ getAllUsers { userId password } }")
            .await;
        assert!(!response.errors.is_empty());
        assert!(response.errors[0].message.contains("password"));
    }

    #[tokio::test]
    async fn test_delete_missing_role_is_null() {
        let response = schema(Value::Null).execute("mutation { deleteRole(id: 4) }").await;
        assert!(response.errors.is_empty());
        let data = response.data.into_json().unwrap();
        assert_eq!(data, json!({ "deleteRole": null }));
    }

    #[tokio::test]
    async fn test_declined_delete_is_graphql_error() {
        let response = schema(json!(false)).execute("mutation { deleteRole(id: 4) }").await;
        assert_eq!(response.errors.len(), 1);
    }
}
