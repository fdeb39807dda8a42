#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use campus_identity::campus_config::HashingConfig;
use campus_identity::campus_core::{AuthError, Clock, PasswordHasher};
use campus_identity::campus_db::{IdentityStore, MemoryStore, RoleStore};
use campus_identity::campus_models::{
    AccountStatus, Email, IssuedResetToken, NewPermission, NewRole, NewUserAccount, RoleId,
    RoleStatus, UserAccount, Username,
};
use campus_identity::config::AppConfig;
use campus_identity::modules::auth::{RandomTokenGenerator, ResetTokenNotifier, TokenGenerator};
use campus_identity::router::init_router;
use campus_identity::state::AppState;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fake::Fake;
use fake::faker::name::en::FirstName;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const STRONG_PASSWORD: &str = "Str0ng@Pass";

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Hands out queued tokens first, then random ones.
#[derive(Default)]
pub struct SequenceTokenGenerator {
    queue: Mutex<VecDeque<String>>,
}

impl SequenceTokenGenerator {
    pub fn push(&self, token: &str) {
        self.queue.lock().unwrap().push_back(token.to_string());
    }
}

impl TokenGenerator for SequenceTokenGenerator {
    fn generate(&self) -> String {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RandomTokenGenerator.generate())
    }
}

/// Keeps every issued token so tests can redeem it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<IssuedResetToken>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<IssuedResetToken> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_token(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|t| t.token.clone())
    }

    pub fn fail_deliveries(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl ResetTokenNotifier for RecordingNotifier {
    async fn send_reset_token(
        &self,
        _account: &UserAccount,
        token: &IssuedResetToken,
    ) -> Result<(), AuthError> {
        self.sent.lock().unwrap().push(token.clone());
        if *self.fail.lock().unwrap() {
            return Err(AuthError::Transient("mail relay unreachable".into()));
        }
        Ok(())
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        hashing: HashingConfig {
            bcrypt_cost: PasswordHasher::MIN_COST,
        },
        ..AppConfig::default()
    }
}

pub struct TestApp {
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<SequenceTokenGenerator>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let clock = Arc::new(ManualClock::new(t0()));
        let tokens = Arc::new(SequenceTokenGenerator::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let state = AppState::builder(store.clone())
            .with_config(config)
            .with_clock(clock.clone())
            .with_token_generator(tokens.clone())
            .with_notifier(notifier.clone())
            .build()
            .expect("state builds");

        Self {
            store,
            clock,
            tokens,
            notifier,
            state,
        }
    }

    pub fn router(&self) -> Router {
        init_router(self.state.clone())
    }

    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        status: AccountStatus,
    ) -> UserAccount {
        self.insert_account(username, password, status, false).await
    }

    pub async fn create_super_admin(&self, username: &str, password: &str) -> UserAccount {
        self.insert_account(username, password, AccountStatus::Active, true)
            .await
    }

    async fn insert_account(
        &self,
        username: &str,
        password: &str,
        status: AccountStatus,
        is_super_admin: bool,
    ) -> UserAccount {
        let hash = PasswordHasher::new(PasswordHasher::MIN_COST)
            .hash(password)
            .unwrap();
        let account = self
            .store
            .insert_user(NewUserAccount {
                username: Username::new(username).unwrap(),
                email: Email::new(format!("{}@example.com", username)).unwrap(),
                password_hash: hash,
                is_super_admin,
            })
            .await
            .unwrap();

        if status != AccountStatus::Active {
            assert!(self.store.update_user_status(account.id, status).await.unwrap());
        }
        self.store.find_user_by_id(account.id).await.unwrap().unwrap()
    }

    /// Creates a role holding `codes` and assigns it to `account`.
    pub async fn grant(
        &self,
        account: &UserAccount,
        role_name: &str,
        status: RoleStatus,
        codes: &[&str],
    ) -> RoleId {
        let role = self
            .store
            .insert_role(NewRole {
                name: role_name.to_string(),
                description: None,
                status,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for code in codes {
            let permission = self
                .store
                .insert_permission(NewPermission {
                    code: code.to_string(),
                    module: code.split(':').next().unwrap().to_string(),
                    description: None,
                })
                .await
                .unwrap();
            ids.push(permission.id);
        }

        self.store.grant_permissions(role.id, &ids).await.unwrap();
        self.store.assign_role(account.id, role.id).await.unwrap();
        role.id
    }

    /// Signs in over HTTP and returns the bearer token.
    pub async fn bearer(&self, username: &str, password: &str) -> String {
        let (status, body) = send(
            self.router(),
            "POST",
            "/api/auth/signin",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }
}

/// A username unique within the test run.
pub fn unique_username() -> String {
    let base: String = FirstName()
        .fake::<String>()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
    if base.is_empty() {
        format!("user-{}", suffix)
    } else {
        format!("{}-{}", base, suffix)
    }
}

pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
