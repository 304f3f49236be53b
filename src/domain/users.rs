//! User directory
//!
//! Principals are usernames. [`UserService`] resolves them to user ids for
//! the owner-scoped services.

use crate::core::auth::{AuthContext, OwnerResolver};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::example::Example;
use crate::core::query::Sort;
use crate::core::service::EntityService;
use crate::entities::{User, UserDto};
use async_trait::async_trait;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct UserService {
    inner: EntityService<User, UserDto>,
}

impl UserService {
    pub fn new(inner: EntityService<User, UserDto>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &EntityService<User, UserDto> {
        &self.inner
    }

    /// Register a user; a taken username fails with the storage `Conflict`
    pub async fn create(&self, ctx: &AuthContext, dto: UserDto) -> ServiceResult<UserDto> {
        self.inner.create(ctx, dto).await
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> ServiceResult<UserDto> {
        self.inner.find_by_id(ctx, id).await
    }

    pub async fn update(&self, ctx: &AuthContext, dto: UserDto) -> ServiceResult<UserDto> {
        self.inner.update(ctx, dto).await
    }

    async fn lookup(&self, username: &str) -> ServiceResult<Option<User>> {
        let example = Example::matching_all().and_equals("username", username);
        let mut found = self
            .inner
            .repository()
            .find_all_by_example(&example, &Sort::unsorted())
            .await?;
        Ok(found.pop())
    }

    pub async fn find_by_username(&self, ctx: &AuthContext, username: &str) -> ServiceResult<UserDto> {
        let user = self
            .lookup(username)
            .await?
            .ok_or_else(|| ServiceError::not_found(self.inner.names().resource_type.clone(), username))?;
        if let Some(id) = user.id {
            self.inner.record_access(ctx, &id);
        }
        Ok(self.inner.mapper().to_dto(&user))
    }
}

#[async_trait]
impl OwnerResolver<i64> for UserService {
    async fn resolve_owner_id(&self, principal: &str) -> ServiceResult<i64> {
        match self.lookup(principal).await? {
            Some(User {
                id: Some(id),
                enabled: Some(true) | None,
                ..
            }) => Ok(id),
            _ => {
                warn!("principal '{}' has no enabled user", principal);
                Err(ServiceError::access_denied("user", principal))
            }
        }
    }
}
