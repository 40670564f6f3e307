//! User directory service — application-layer orchestration
//!
//! All user-management business logic lives here: CRUD, bulk
//! import/export, and synchronization with the consent manager.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserRepositoryInterface,
};
use crate::infrastructure::consent::ConsentApi;
use crate::infrastructure::tabular;

/// Result of a bulk import.
///
/// Rows whose `internal_id` already existed are skipped without an
/// update and reported here rather than silently dropped.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub created: Vec<User>,
    pub skipped: Vec<String>,
}

/// User directory service.
///
/// Generic over `R: UserRepositoryInterface` and `C: ConsentApi` so it
/// stays decoupled from the concrete persistence layer and the HTTP
/// consent client.
pub struct UserDirectoryService<R: UserRepositoryInterface, C: ConsentApi> {
    repo: Arc<R>,
    consent: Arc<C>,
}

impl<R: UserRepositoryInterface, C: ConsentApi> UserDirectoryService<R, C> {
    pub fn new(repo: Arc<R>, consent: Arc<C>) -> Self {
        Self { repo, consent }
    }

    fn require_consent_configured(&self) -> DomainResult<()> {
        if self.consent.is_configured() {
            Ok(())
        } else {
            Err(DomainError::NotConfigured(
                "Please add a consent URI to your config file or with the configuration route"
                    .to_string(),
            ))
        }
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Create a user and register it with the consent manager.
    ///
    /// The write sequence is create, then attach the remote identifier.
    /// A consent failure aborts the request; the local record stays
    /// without a `consent_identifier`.
    pub async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        self.require_consent_configured()?;

        if dto.internal_id.trim().is_empty() {
            return Err(DomainError::Validation("internal_id is required".into()));
        }
        if !dto.email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }

        let user = self.repo.insert_user(dto).await?;

        let token = self.consent.login().await?;
        let identifier = self
            .consent
            .register_user(&user.email, &user.internal_id, &token)
            .await?;

        let user = self
            .repo
            .set_consent_identifier(&user.id, &identifier)
            .await?
            .ok_or_else(|| {
                DomainError::Storage("User vanished while attaching consent identifier".into())
            })?;

        info!(
            user_id = %user.id,
            internal_id = %user.internal_id,
            "User created and registered with consent manager"
        );
        Ok(user)
    }

    /// Apply patch fields to a user. Does not cascade identifier or
    /// email changes to the consent manager.
    pub async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        self.repo.update_user(id, dto).await
    }

    /// Delete a user. The remote consent identifier is not cleaned up.
    pub async fn delete_user(&self, id: &str) -> DomainResult<()> {
        self.repo.delete_user(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    /// All users, no filtering or pagination.
    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn get_user(&self, id: &str) -> DomainResult<Option<User>> {
        self.repo.get_user_by_id(id).await
    }

    // ── Bulk transfer ───────────────────────────────────────────

    /// Header-only template file for bulk import.
    pub fn export_template(&self) -> DomainResult<Vec<u8>> {
        tabular::write_template().map_err(|e| DomainError::Storage(e.to_string()))
    }

    /// Import users from an uploaded tabular file.
    ///
    /// One consent login serves every row. Rows are processed strictly
    /// sequentially; a consent failure aborts the import and rows
    /// already committed stay committed.
    pub async fn import_users(&self, file: &[u8]) -> DomainResult<ImportOutcome> {
        self.require_consent_configured()?;

        let rows = tabular::read_rows(file).map_err(|e| DomainError::Validation(e.to_string()))?;

        let token = self.consent.login().await?;

        let mut outcome = ImportOutcome::default();
        for row in rows {
            let dto = CreateUserDto {
                internal_id: row.internal_id.clone(),
                email: row.email,
                attributes: row
                    .extra
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::String(value)))
                    .collect(),
            };

            match self.repo.insert_user(dto).await {
                Ok(user) => {
                    let identifier = self
                        .consent
                        .register_user(&user.email, &user.internal_id, &token)
                        .await?;

                    let user = self
                        .repo
                        .set_consent_identifier(&user.id, &identifier)
                        .await?
                        .ok_or_else(|| {
                            DomainError::Storage(
                                "User vanished while attaching consent identifier".into(),
                            )
                        })?;

                    outcome.created.push(user);
                }
                Err(DomainError::Conflict(_)) => outcome.skipped.push(row.internal_id),
                Err(e) => return Err(e),
            }
        }

        info!(
            created = outcome.created.len(),
            skipped = outcome.skipped.len(),
            "Bulk user import finished"
        );
        Ok(outcome)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::infrastructure::consent::{ConsentError, ConsentToken};

    #[derive(Default)]
    struct MemoryRepo {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepositoryInterface for MemoryRepo {
        async fn insert_user(&self, dto: CreateUserDto) -> DomainResult<User> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.internal_id == dto.internal_id) {
                return Err(DomainError::Conflict(format!(
                    "Internal ID '{}' already exists",
                    dto.internal_id
                )));
            }

            let now = Utc::now();
            let user = User {
                id: uuid::Uuid::new_v4().to_string(),
                internal_id: dto.internal_id,
                email: dto.email,
                consent_identifier: None,
                attributes: dto.attributes,
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn list_users(&self) -> DomainResult<Vec<User>> {
            Ok(self.users.lock().unwrap().clone())
        }

        async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }

        async fn get_user_by_internal_id(&self, internal_id: &str) -> DomainResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.internal_id == internal_id)
                .cloned())
        }

        async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
            let mut users = self.users.lock().unwrap();
            let Some(user) = users.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            if let Some(internal_id) = dto.internal_id {
                user.internal_id = internal_id;
            }
            if let Some(email) = dto.email {
                user.email = email;
            }
            if let Some(attributes) = dto.attributes {
                user.attributes = attributes;
            }
            user.updated_at = Utc::now();
            Ok(Some(user.clone()))
        }

        async fn set_consent_identifier(
            &self,
            id: &str,
            consent_identifier: &str,
        ) -> DomainResult<Option<User>> {
            let mut users = self.users.lock().unwrap();
            let Some(user) = users.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            user.consent_identifier = Some(consent_identifier.to_string());
            user.updated_at = Utc::now();
            Ok(Some(user.clone()))
        }

        async fn delete_user(&self, id: &str) -> DomainResult<()> {
            let mut users = self.users.lock().unwrap();
            let before = users.len();
            users.retain(|u| u.id != id);
            if users.len() == before {
                return Err(DomainError::NotFound {
                    entity: "User",
                    field: "id",
                    value: id.to_string(),
                });
            }
            Ok(())
        }
    }

    struct FakeConsent {
        configured: bool,
        fail_register: bool,
        logins: AtomicUsize,
    }

    impl FakeConsent {
        fn working() -> Self {
            Self {
                configured: true,
                fail_register: false,
                logins: AtomicUsize::new(0),
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                fail_register: false,
                logins: AtomicUsize::new(0),
            }
        }

        fn failing_registration() -> Self {
            Self {
                configured: true,
                fail_register: true,
                logins: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ConsentApi for FakeConsent {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn login(&self) -> Result<ConsentToken, ConsentError> {
            if !self.configured {
                return Err(ConsentError::NotConfigured);
            }
            self.logins.fetch_add(1, Ordering::SeqCst);
            Ok(ConsentToken::new("test-jwt"))
        }

        async fn register_user(
            &self,
            _email: &str,
            internal_id: &str,
            _token: &ConsentToken,
        ) -> Result<String, ConsentError> {
            if self.fail_register {
                return Err(ConsentError::Api {
                    status: 500,
                    message: "registration failed".into(),
                });
            }
            Ok(format!("remote-{internal_id}"))
        }
    }

    fn service(
        consent: FakeConsent,
    ) -> UserDirectoryService<MemoryRepo, FakeConsent> {
        UserDirectoryService::new(Arc::new(MemoryRepo::default()), Arc::new(consent))
    }

    fn create_dto(internal_id: &str, email: &str) -> CreateUserDto {
        CreateUserDto {
            internal_id: internal_id.to_string(),
            email: email.to_string(),
            attributes: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn create_attaches_consent_identifier() {
        let svc = service(FakeConsent::working());

        let user = svc.create_user(create_dto("A1", "a@x.com")).await.unwrap();

        assert_eq!(user.consent_identifier.as_deref(), Some("remote-A1"));
        let stored = svc.get_user(&user.id).await.unwrap().expect("stored");
        assert_eq!(stored.consent_identifier.as_deref(), Some("remote-A1"));
    }

    #[tokio::test]
    async fn duplicate_internal_id_is_rejected() {
        let svc = service(FakeConsent::working());

        svc.create_user(create_dto("A1", "a@x.com")).await.unwrap();
        let err = svc
            .create_user(create_dto("A1", "other@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(svc.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_without_consent_uri_is_rejected() {
        let svc = service(FakeConsent::unconfigured());

        let err = svc
            .create_user(create_dto("A1", "a@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotConfigured(_)));
        assert!(svc.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn consent_failure_aborts_create() {
        let svc = service(FakeConsent::failing_registration());

        let err = svc
            .create_user(create_dto("A1", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Consent(_)));

        // The record was created before registration failed and stays
        // without a remote identifier.
        let users = svc.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].consent_identifier.is_none());
    }

    #[tokio::test]
    async fn import_creates_all_rows_with_one_login() {
        let svc = service(FakeConsent::working());

        let file = b"internalID,email\nA1,a@x.com\nA2,b@x.com\n";
        let outcome = svc.import_users(file).await.unwrap();

        assert_eq!(outcome.created.len(), 2);
        assert!(outcome.skipped.is_empty());
        assert!(outcome
            .created
            .iter()
            .all(|u| u.consent_identifier.is_some()));
        assert_eq!(svc.consent.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn import_skips_existing_rows_without_update() {
        let svc = service(FakeConsent::working());
        svc.create_user(create_dto("A1", "a@x.com")).await.unwrap();

        let file = b"internalID,email\nA1,changed@x.com\nA2,b@x.com\n";
        let outcome = svc.import_users(file).await.unwrap();

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].internal_id, "A2");
        assert_eq!(outcome.skipped, vec!["A1".to_string()]);

        // The existing row was neither duplicated nor updated
        let existing = svc
            .repo
            .get_user_by_internal_id("A1")
            .await
            .unwrap()
            .expect("still present");
        assert_eq!(existing.email, "a@x.com");
        assert_eq!(svc.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn import_with_missing_email_column_creates_nothing() {
        let svc = service(FakeConsent::working());

        let file = b"internalID,name\nA1,Alice\n";
        let err = svc.import_users(file).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.list_users().await.unwrap().is_empty());
        // No login was attempted for an invalid file
        assert_eq!(svc.consent.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn import_carries_extra_columns_into_attributes() {
        let svc = service(FakeConsent::working());

        let file = b"internalID,email,department\nA1,a@x.com,engineering\n";
        let outcome = svc.import_users(file).await.unwrap();

        assert_eq!(
            outcome.created[0].attributes.get("department"),
            Some(&serde_json::Value::String("engineering".into()))
        );
    }

    #[tokio::test]
    async fn template_is_header_only() {
        let svc = service(FakeConsent::working());
        let bytes = svc.export_template().unwrap();
        assert_eq!(bytes, b"internalID,email\n");
    }
}
