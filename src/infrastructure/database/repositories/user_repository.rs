use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::domain::{CreateUserDto, DomainError, DomainResult, UpdateUserDto, User,
    UserRepositoryInterface};
use crate::infrastructure::database::entities::user;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    let attributes = match model.attributes {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    User {
        id: model.id,
        internal_id: model.internal_id,
        email: model.email,
        consent_identifier: model.consent_identifier,
        attributes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn insert_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();

        let new_user = user::ActiveModel {
            id: Set(id.clone()),
            internal_id: Set(dto.internal_id.clone()),
            email: Set(dto.email),
            consent_identifier: Set(None),
            attributes: Set(serde_json::Value::Object(dto.attributes)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Atomic duplicate check: the unique constraint decides, not a
        // separate find-then-create round trip.
        let insert = user::Entity::insert(new_user)
            .on_conflict(
                OnConflict::column(user::Column::InternalId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match insert {
            Ok(_) => {}
            Err(DbErr::RecordNotInserted) => {
                return Err(DomainError::Conflict(format!(
                    "Internal ID '{}' already exists",
                    dto.internal_id
                )))
            }
            Err(e) => return Err(db_err(e)),
        }

        let created = user::Entity::find_by_id(&id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                DomainError::Storage("User inserted but could not be read back".to_string())
            })?;

        Ok(user_model_to_domain(created))
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let users = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(users.into_iter().map(user_model_to_domain).collect())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let user = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(user.map(user_model_to_domain))
    }

    async fn get_user_by_internal_id(&self, internal_id: &str) -> DomainResult<Option<User>> {
        let user = user::Entity::find()
            .filter(user::Column::InternalId.eq(internal_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(user.map(user_model_to_domain))
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let Some(existing) = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        active.updated_at = Set(Utc::now());

        if let Some(internal_id) = dto.internal_id {
            active.internal_id = Set(internal_id);
        }
        if let Some(email) = dto.email {
            active.email = Set(email);
        }
        if let Some(attributes) = dto.attributes {
            active.attributes = Set(serde_json::Value::Object(attributes));
        }

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(user_model_to_domain(updated)))
    }

    async fn set_consent_identifier(
        &self,
        id: &str,
        consent_identifier: &str,
    ) -> DomainResult<Option<User>> {
        let Some(existing) = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        active.consent_identifier = Set(Some(consent_identifier.to_string()));
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(user_model_to_domain(updated)))
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        }

        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> UserRepository {
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        Migrator::up(&db, None).await.expect("migrations");
        UserRepository::new(db)
    }

    fn dto(internal_id: &str, email: &str) -> CreateUserDto {
        CreateUserDto {
            internal_id: internal_id.to_string(),
            email: email.to_string(),
            attributes: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_by_internal_id() {
        let repo = repo().await;

        let created = repo.insert_user(dto("A1", "a@x.com")).await.unwrap();
        assert_eq!(created.internal_id, "A1");
        assert!(created.consent_identifier.is_none());

        let fetched = repo
            .get_user_by_internal_id("A1")
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_internal_id_is_conflict() {
        let repo = repo().await;

        repo.insert_user(dto("A1", "a@x.com")).await.unwrap();
        let err = repo.insert_user(dto("A1", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // No second record was created
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn consent_identifier_is_attached() {
        let repo = repo().await;

        let created = repo.insert_user(dto("A1", "a@x.com")).await.unwrap();
        let updated = repo
            .set_consent_identifier(&created.id, "remote-42")
            .await
            .unwrap()
            .expect("user exists");

        assert_eq!(updated.consent_identifier.as_deref(), Some("remote-42"));
    }

    #[tokio::test]
    async fn update_applies_patch_fields_only() {
        let repo = repo().await;

        let created = repo.insert_user(dto("A1", "a@x.com")).await.unwrap();
        let updated = repo
            .update_user(
                &created.id,
                UpdateUserDto {
                    email: Some("new@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("user exists");

        assert_eq!(updated.email, "new@x.com");
        assert_eq!(updated.internal_id, "A1");
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let repo = repo().await;
        let err = repo.delete_user("no-such-id").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
