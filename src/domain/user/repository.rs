use async_trait::async_trait;

use super::{CreateUserDto, UpdateUserDto, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a new user. Must be atomic with respect to the unique
    /// `internal_id` constraint: a duplicate yields `DomainError::Conflict`
    /// without a separate find-then-create round trip.
    async fn insert_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_internal_id(&self, internal_id: &str) -> DomainResult<Option<User>>;

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    /// Attach the remote identifier issued by the consent manager.
    async fn set_consent_identifier(
        &self,
        id: &str,
        consent_identifier: &str,
    ) -> DomainResult<Option<User>>;
    async fn delete_user(&self, id: &str) -> DomainResult<()>;
}
