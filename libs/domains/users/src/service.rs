//! User Service - Business logic layer

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use email::{ACCOUNT_ACTIVATION, Email, EmailProvider};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthOutcome;
use crate::clock::{Clock, SystemClock};
use crate::error::{CredentialErrorKind, UserError, UserResult};
use crate::models::{
    ActivateRequest, ActivationResponse, CreateUser, CreatedResponse, DeleteAck, RegisterRequest,
    UpdateAck, UpdateUser, User, UserPage, UserResponse, to_chrono,
};
use crate::pagination::PageRequest;
use crate::query;
use crate::repository::UserRepository;

pub const DEFAULT_CODE_TTL: Duration = Duration::from_secs(300);

/// How activation codes are issued and announced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationSettings {
    /// Lifetime of a freshly issued code
    pub code_ttl: Duration,
    /// Product name shown in the activation mail
    pub app_name: String,
}

impl Default for ActivationSettings {
    fn default() -> Self {
        Self {
            code_ttl: DEFAULT_CODE_TTL,
            app_name: "Admin".to_string(),
        }
    }
}

impl ActivationSettings {
    fn ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.code_ttl).unwrap_or(chrono::Duration::MAX)
    }

    fn ttl_minutes(&self) -> u64 {
        self.code_ttl.as_secs().div_ceil(60)
    }
}

/// User service providing business logic operations
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    mailer: Arc<dyn EmailProvider>,
    clock: Arc<dyn Clock>,
    activation: ActivationSettings,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, mailer: Arc<dyn EmailProvider>) -> Self {
        Self {
            repository: Arc::new(repository),
            mailer,
            clock: Arc::new(SystemClock),
            activation: ActivationSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_activation_settings(mut self, settings: ActivationSettings) -> Self {
        self.activation = settings;
        self
    }

    /// Create an active user on behalf of an administrator
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<CreatedResponse> {
        input.validate()?;

        if self.repository.exists_by_email(&input.email).await? {
            return Err(UserError::Conflict(input.email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = User {
            phone: input.phone,
            address: input.address,
            image: input.image,
            ..User::new(input.name, input.email, password_hash, self.clock.now())
        };

        let id = self.repository.insert(user).await?;
        Ok(CreatedResponse { id: id.to_hex() })
    }

    /// One page of users for a raw query string such as
    /// `current=2&pageSize=5&sort=-createdAt&name=/ann/i`
    #[instrument(skip(self))]
    pub async fn list_users(&self, raw_query: &str) -> UserResult<UserPage> {
        let parsed = query::parse(raw_query);
        let page = PageRequest::from_raw(parsed.current.as_deref(), parsed.page_size.as_deref());

        let total = self.repository.count(&parsed.filter).await?;
        let users = self
            .repository
            .find_page(&parsed.filter, &parsed.sort, page.skip(), page.limit())
            .await?;

        Ok(UserPage {
            result: users.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages(total),
            meta: page.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> UserResult<UserResponse> {
        let object_id = parse_object_id(id)?;
        self.repository
            .find_profile(object_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    #[instrument(skip(self, input), fields(user_id = %input.id))]
    pub async fn update_user(&self, input: UpdateUser) -> UserResult<UpdateAck> {
        input.validate()?;
        let id = parse_object_id(&input.id)?;
        self.repository
            .update_one(id, input.into(), self.clock.now())
            .await
    }

    /// Delete a user; a malformed id never reaches the store
    #[instrument(skip(self))]
    pub async fn remove_user(&self, id: &str) -> UserResult<DeleteAck> {
        let object_id = parse_object_id(id)?;
        self.repository.delete_one(object_id).await
    }

    /// Create an inactive account and mail its activation code
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<CreatedResponse> {
        input.validate()?;

        if self.repository.exists_by_email(&input.email).await? {
            return Err(UserError::Conflict(input.email));
        }

        let password_hash = hash_password(&input.password)?;
        let now = self.clock.now();
        let code = Uuid::new_v4().to_string();
        let user = User::pending(
            input.name,
            input.email,
            password_hash,
            code,
            now.checked_add_signed(self.activation.ttl())
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            now,
        );

        let id = self.repository.insert(user.clone()).await?;
        self.send_activation_email(&user).await;

        Ok(CreatedResponse { id: id.to_hex() })
    }

    /// Activate the account if `code` matches and has not expired
    #[instrument(skip(self, input), fields(user_id = %input.id))]
    pub async fn activate(&self, input: ActivateRequest) -> UserResult<ActivationResponse> {
        input.validate()?;
        let id = ObjectId::parse_str(&input.id).map_err(|_| UserError::InvalidCode)?;

        let user = self
            .repository
            .find_by_id_and_code(id, &input.code)
            .await?
            .ok_or(UserError::InvalidCode)?;

        let now = self.clock.now();
        let expires_at = user.code_expired.ok_or(UserError::CodeExpired)?;
        if now >= to_chrono(expires_at) {
            tracing::info!(user_id = %id, "Activation code expired");
            return Err(UserError::CodeExpired);
        }

        self.repository.mark_active(id, now).await?;

        tracing::info!(user_id = %id, "Account activated");
        Ok(ActivationResponse { activated: true })
    }

    /// Check a password sign-in; `username` is the account email
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> UserResult<UserResponse> {
        let invalid = UserError::InvalidCredentials(CredentialErrorKind::InvalidEmailPassword);

        let Some(user) = self.repository.find_by_email(username).await? else {
            return Err(invalid);
        };

        if !verify_password(password, &user.password)? {
            return Err(invalid);
        }

        if !user.is_active {
            return Err(UserError::InvalidCredentials(
                CredentialErrorKind::InactiveAccount,
            ));
        }

        Ok(user.into())
    }

    /// Like [`verify_credentials`](Self::verify_credentials) but never fails
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthOutcome {
        match self.verify_credentials(username, password).await {
            Ok(user) => AuthOutcome::Authenticated { user },
            Err(err) => {
                tracing::info!(error = %err, "Sign-in rejected");
                AuthOutcome::rejected(&err)
            }
        }
    }

    /// A failed send is logged and otherwise ignored
    async fn send_activation_email(&self, user: &User) {
        let Some(code) = &user.code_id else {
            return;
        };

        let message = Email::new(&user.email, "Activate your account").with_template(
            ACCOUNT_ACTIVATION,
            json!({
                "name": user.name,
                "activationCode": code,
                "expiresInMinutes": self.activation.ttl_minutes(),
                "appName": self.activation.app_name,
            }),
        );

        match self.mailer.send(&message).await {
            Ok(result) => tracing::info!(
                user_id = %user.id,
                message_id = %result.message_id,
                provider = self.mailer.name(),
                "Activation email sent"
            ),
            Err(e) => tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Failed to send activation email"
            ),
        }
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            mailer: Arc::clone(&self.mailer),
            clock: Arc::clone(&self.clock),
            activation: self.activation.clone(),
        }
    }
}

fn parse_object_id(id: &str) -> UserResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| UserError::InvalidIdentifier(id.to_string()))
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use std::sync::atomic::{AtomicI64, Ordering};
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use email::{MockSmtpProvider, TemplateEngine, TemplateMailer};

    struct Harness {
        service: UserService<InMemoryUserRepository>,
        repo: InMemoryUserRepository,
        outbox: MockSmtpProvider,
        clock: ManualClock,
    }

    fn harness_with(outbox: MockSmtpProvider) -> Harness {
        let repo = InMemoryUserRepository::new();
        let clock = ManualClock::new(Utc::now());
        let mailer = TemplateMailer::new(outbox.clone(), TemplateEngine::new().unwrap());
        let service = UserService::new(repo.clone(), Arc::new(mailer))
            .with_clock(Arc::new(clock.clone()))
            .with_activation_settings(ActivationSettings {
                code_ttl: DEFAULT_CODE_TTL,
                app_name: "Admin Test".into(),
            });
        Harness {
            service,
            repo,
            outbox,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(MockSmtpProvider::new())
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            name: "A".into(),
            password: "p".into(),
        }
    }

    fn create_request(email: &str) -> CreateUser {
        CreateUser {
            name: "Ann".into(),
            email: email.into(),
            password: "secret".into(),
            phone: Some("555-0100".into()),
            address: None,
            image: None,
        }
    }

    /// Inserts directly, skipping password hashing
    async fn seed(repo: &InMemoryUserRepository, count: usize) {
        for i in 0..count {
            let user = User::new(
                format!("User {i}"),
                format!("user{i}@x.com"),
                "$argon2id$unused".into(),
                Utc::now(),
            );
            repo.insert(user).await.unwrap();
        }
    }

    async fn stored(repo: &InMemoryUserRepository, email: &str) -> User {
        repo.find_by_email(email).await.unwrap().unwrap()
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_creates_pending_user_and_mails_code() {
        let h = harness();

        let created = h.service.register(register_request("a@x.com")).await.unwrap();

        let user = stored(&h.repo, "a@x.com").await;
        assert_eq!(user.id.to_hex(), created.id);
        assert!(!user.is_active);
        assert_ne!(user.password, "p");

        let code = user.code_id.clone().unwrap();
        assert_eq!(code.len(), 36);

        let expected = h.clock.now() + chrono::Duration::minutes(5);
        let expires_at = to_chrono(user.code_expired.unwrap());
        assert!((expires_at - expected).num_milliseconds().abs() <= 1);

        let mail = h.outbox.last_sent().await.unwrap();
        assert_eq!(mail.to, "a@x.com");
        assert!(mail.body_text.unwrap().contains(&code));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts_without_side_effects() {
        let h = harness();
        h.service.register(register_request("a@x.com")).await.unwrap();

        let err = h
            .service
            .register(register_request("a@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Conflict(ref e) if e == "a@x.com"));
        assert_eq!(h.outbox.sent_count().await, 1);
        assert_eq!(
            h.repo.count(&query::Filter::new()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_register_survives_mail_failure() {
        let h = harness_with(MockSmtpProvider::failing("smtp down"));

        let created = h.service.register(register_request("a@x.com")).await;

        assert!(created.is_ok());
        assert!(h.repo.exists_by_email("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_activate_before_expiry() {
        let h = harness();
        let created = h.service.register(register_request("a@x.com")).await.unwrap();
        let code = stored(&h.repo, "a@x.com").await.code_id.unwrap();

        let response = h
            .service
            .activate(ActivateRequest {
                id: created.id,
                code,
            })
            .await
            .unwrap();

        assert!(response.activated);
        assert!(stored(&h.repo, "a@x.com").await.is_active);
    }

    #[tokio::test]
    async fn test_activate_after_expiry_leaves_user_inactive() {
        let h = harness();
        let created = h.service.register(register_request("a@x.com")).await.unwrap();
        let code = stored(&h.repo, "a@x.com").await.code_id.unwrap();

        h.clock.advance(chrono::Duration::minutes(6));
        let err = h
            .service
            .activate(ActivateRequest {
                id: created.id,
                code,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::CodeExpired));
        assert!(!stored(&h.repo, "a@x.com").await.is_active);
    }

    #[tokio::test]
    async fn test_activate_at_exact_deadline_is_expired() {
        let h = harness();
        let created = h.service.register(register_request("a@x.com")).await.unwrap();
        let user = stored(&h.repo, "a@x.com").await;

        h.clock.set(to_chrono(user.code_expired.unwrap()));
        let err = h
            .service
            .activate(ActivateRequest {
                id: created.id,
                code: user.code_id.unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::CodeExpired));
    }

    #[tokio::test]
    async fn test_activate_with_wrong_code_or_id() {
        let h = harness();
        let created = h.service.register(register_request("a@x.com")).await.unwrap();

        let wrong_code = h
            .service
            .activate(ActivateRequest {
                id: created.id,
                code: Uuid::new_v4().to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong_code, UserError::InvalidCode));

        let malformed_id = h
            .service
            .activate(ActivateRequest {
                id: "not-an-id".into(),
                code: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(malformed_id, UserError::InvalidCode));
    }

    #[tokio::test]
    async fn test_activation_code_can_be_reused_while_valid() {
        let h = harness();
        let created = h.service.register(register_request("a@x.com")).await.unwrap();
        let code = stored(&h.repo, "a@x.com").await.code_id.unwrap();
        let request = ActivateRequest {
            id: created.id,
            code,
        };

        h.service.activate(request.clone()).await.unwrap();
        assert!(h.service.activate(request).await.unwrap().activated);
    }

    #[tokio::test]
    async fn test_create_user_is_active_and_conflicts_on_duplicate() {
        let h = harness();
        let created = h.service.create_user(create_request("ann@x.com")).await.unwrap();

        let user = h.service.get_user(&created.id).await.unwrap();
        assert!(user.is_active);
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_eq!(h.outbox.sent_count().await, 0);

        let err = h
            .service
            .create_user(create_request("ann@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_email() {
        let h = harness();
        let err = h
            .service
            .create_user(create_request("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_user_errors() {
        let h = harness();
        assert!(matches!(
            h.service.get_user("123").await.unwrap_err(),
            UserError::InvalidIdentifier(_)
        ));
        assert!(matches!(
            h.service.get_user(&ObjectId::new().to_hex()).await.unwrap_err(),
            UserError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_users_paginates_and_hides_passwords() {
        let h = harness();
        seed(&h.repo, 12).await;

        let page = h.service.list_users("current=2&pageSize=5").await.unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.result.len(), 5);
        assert_eq!(page.meta.total, 12);
        assert_eq!(page.result[0].email, "user5@x.com");

        let last = h.service.list_users("current=3&pageSize=5").await.unwrap();
        assert_eq!(last.result.len(), 2);

        let json = serde_json::to_value(&page).unwrap();
        assert!(json["result"][0].get("password").is_none());
    }

    #[tokio::test]
    async fn test_list_users_defaults_invalid_paging() {
        let h = harness();
        seed(&h.repo, 11).await;

        let page = h.service.list_users("current=0&pageSize=abc").await.unwrap();
        assert_eq!(page.meta.current, 1);
        assert_eq!(page.meta.page_size, 10);
        assert_eq!(page.result.len(), 10);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_list_users_filters() {
        let h = harness();
        h.service.create_user(create_request("ann@x.com")).await.unwrap();
        h.service.register(register_request("bob@x.com")).await.unwrap();

        let page = h.service.list_users("isActive=false").await.unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.result[0].email, "bob@x.com");
    }

    #[tokio::test]
    async fn test_update_user_sets_fields_and_bumps_timestamp() {
        let h = harness();
        let created = h.service.create_user(create_request("ann@x.com")).await.unwrap();
        let before = h.service.get_user(&created.id).await.unwrap();

        h.clock.advance(chrono::Duration::seconds(30));
        let ack = h
            .service
            .update_user(UpdateUser {
                id: created.id.clone(),
                name: Some("Annie".into()),
                phone: None,
                address: Some("Main St".into()),
                image: None,
            })
            .await
            .unwrap();
        assert_eq!(ack.matched_count, 1);

        let after = h.service.get_user(&created.id).await.unwrap();
        assert_eq!(after.name, "Annie");
        assert_eq!(after.address.as_deref(), Some("Main St"));
        assert_eq!(after.phone, before.phone);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_user_invalid_id() {
        let h = harness();
        let err = h
            .service
            .update_user(UpdateUser {
                id: "xyz".into(),
                name: None,
                phone: None,
                address: None,
                image: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_remove_invalid_id_never_reaches_store() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete_one().times(0);

        let service = UserService::new(repo, Arc::new(MockSmtpProvider::new()));
        let err = service.remove_user("definitely-not-an-id").await.unwrap_err();

        assert!(matches!(err, UserError::InvalidIdentifier(ref id) if id == "definitely-not-an-id"));
    }

    #[tokio::test]
    async fn test_remove_valid_id_returns_store_ack() {
        let id = ObjectId::new();
        let mut repo = MockUserRepository::new();
        repo.expect_delete_one()
            .withf(move |arg| *arg == id)
            .times(1)
            .returning(|_| Ok(DeleteAck { deleted_count: 1 }));

        let service = UserService::new(repo, Arc::new(MockSmtpProvider::new()));
        let ack = service.remove_user(&id.to_hex()).await.unwrap();

        assert_eq!(ack.deleted_count, 1);
    }

    /// Moves one second forward on every read
    struct TickingClock {
        start: DateTime<Utc>,
        reads: AtomicI64,
    }

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            self.start + chrono::Duration::seconds(n)
        }
    }

    #[tokio::test]
    async fn test_activate_stamps_the_instant_it_checked() {
        let start = DateTime::<Utc>::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap();
        let pending = User::pending(
            "Ann".into(),
            "ann@example.com".into(),
            "hash".into(),
            "code-1".into(),
            start + chrono::Duration::seconds(1),
            start,
        );
        let id = pending.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id_and_code()
            .returning(move |_, _| Ok(Some(pending.clone())));
        repo.expect_mark_active()
            .withf(move |arg, at| *arg == id && *at == start)
            .times(1)
            .returning(|_, _| {
                Ok(UpdateAck {
                    matched_count: 1,
                    modified_count: 1,
                })
            });

        let clock = Arc::new(TickingClock {
            start,
            reads: AtomicI64::new(0),
        });
        let service =
            UserService::new(repo, Arc::new(MockSmtpProvider::new())).with_clock(clock.clone());

        let response = service
            .activate(ActivateRequest {
                id: id.to_hex(),
                code: "code-1".into(),
            })
            .await
            .unwrap();

        assert!(response.activated);
        assert_eq!(clock.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_register_conflict_skips_insert() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email().returning(|_| Ok(true));
        repo.expect_insert().times(0);

        let outbox = MockSmtpProvider::new();
        let service = UserService::new(repo, Arc::new(outbox.clone()));
        let err = service.register(register_request("a@x.com")).await.unwrap_err();

        assert!(matches!(err, UserError::Conflict(_)));
        assert_eq!(outbox.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_verify_credentials_order() {
        let h = harness();
        h.service.register(register_request("pending@x.com")).await.unwrap();
        h.service.create_user(create_request("ann@x.com")).await.unwrap();

        // wrong password on an inactive account reports the password
        let err = h
            .service
            .verify_credentials("pending@x.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UserError::InvalidCredentials(CredentialErrorKind::InvalidEmailPassword)
        ));

        let err = h
            .service
            .verify_credentials("pending@x.com", "p")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UserError::InvalidCredentials(CredentialErrorKind::InactiveAccount)
        ));

        let err = h
            .service
            .verify_credentials("ghost@x.com", "p")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UserError::InvalidCredentials(CredentialErrorKind::InvalidEmailPassword)
        ));

        let user = h.service.verify_credentials("ann@x.com", "secret").await.unwrap();
        assert_eq!(user.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_authenticate_maps_errors() {
        let h = harness();
        h.service.register(register_request("pending@x.com")).await.unwrap();
        h.service.create_user(create_request("ann@x.com")).await.unwrap();

        let inactive = h.service.authenticate("pending@x.com", "p").await;
        assert_eq!(inactive.error(), Some("InactiveAccountError"));

        let wrong = h.service.authenticate("ann@x.com", "bad").await;
        assert_eq!(wrong.error(), Some("InvalidEmailPasswordError"));

        let ok = h.service.authenticate("ann@x.com", "secret").await;
        assert!(ok.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticate_store_failure_is_generic() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Err(UserError::Database("connection reset".into())));

        let service = UserService::new(repo, Arc::new(MockSmtpProvider::new()));
        let outcome = service.authenticate("ann@x.com", "secret").await;

        assert_eq!(outcome.error(), Some(crate::auth::GENERIC_SIGN_IN_ERROR));
    }
}
