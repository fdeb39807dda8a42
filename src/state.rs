use std::sync::Arc;

use anyhow::Context;
use campus_config::{CorsConfig, JwtConfig, StoreBackend};
use campus_core::{AuthError, Clock, PasswordHasher, PasswordPolicy, StrengthPolicy, SystemClock};
use campus_db::{IdentityStore, MemoryStore, PgStore, RoleStore, init_db_pool};
use campus_models::{Email, Username};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use crate::config::{AppConfig, BootstrapAdmin};
use crate::modules::auth::{
    AuthService, AuthenticationGate, LogNotifier, PasswordResetTokenManager, RandomTokenGenerator,
    ResetTokenNotifier, TokenGenerator,
};
use crate::modules::roles::RoleService;
use crate::modules::users::AccountService;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub accounts: AccountService,
    pub roles: RoleService,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Starts wiring services over `store`, which serves both the identity and
    /// the role side.
    pub fn builder<S>(store: S) -> AppStateBuilder
    where
        S: IdentityStore + RoleStore + 'static,
    {
        let store = Arc::new(store);
        AppStateBuilder {
            identities: store.clone(),
            roles: store,
            config: AppConfig::default(),
            clock: Arc::new(SystemClock),
            generator: Arc::new(RandomTokenGenerator),
            notifier: Arc::new(LogNotifier),
            policy: None,
            metrics: None,
        }
    }
}

pub struct AppStateBuilder {
    identities: Arc<dyn IdentityStore>,
    roles: Arc<dyn RoleStore>,
    config: AppConfig,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn TokenGenerator>,
    notifier: Arc<dyn ResetTokenNotifier>,
    policy: Option<Arc<dyn PasswordPolicy>>,
    metrics: Option<PrometheusHandle>,
}

impl AppStateBuilder {
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_token_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ResetTokenNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the strength policy built from `PasswordPolicyConfig`.
    pub fn with_password_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    pub fn build(self) -> Result<AppState, AuthError> {
        let config = self.config;

        let policy: Arc<dyn PasswordPolicy> = match self.policy {
            Some(policy) => policy,
            None => Arc::new(StrengthPolicy::with_lengths(
                config.password_policy.min_length,
                config.password_policy.max_length,
            )),
        };

        let gate = Arc::new(AuthenticationGate::new(
            self.identities.clone(),
            self.roles.clone(),
            PasswordHasher::new(config.hashing.bcrypt_cost),
            policy,
        )?);

        let resets = Arc::new(PasswordResetTokenManager::new(
            self.identities.clone(),
            gate.clone(),
            self.generator,
            self.clock,
            config.reset.clone(),
        ));

        Ok(AppState {
            auth: AuthService::new(
                self.identities.clone(),
                gate,
                resets,
                self.notifier,
                config.jwt.clone(),
            ),
            accounts: AccountService::new(self.identities.clone()),
            roles: RoleService::new(self.roles, self.identities),
            jwt_config: config.jwt,
            cors_config: config.cors,
            metrics: self.metrics,
        })
    }
}

/// Connects the configured store, runs migrations and wires every service.
pub async fn init_app_state(
    config: AppConfig,
    metrics: Option<PrometheusHandle>,
) -> anyhow::Result<AppState> {
    let bootstrap = config.bootstrap_admin.clone();

    let builder = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = init_db_pool(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            info!("Database migrations applied");
            AppState::builder(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; all data is lost on restart");
            AppState::builder(MemoryStore::new())
        }
    };

    let state = builder.with_config(config).with_metrics(metrics).build()?;

    if let Some(admin) = bootstrap {
        bootstrap_super_admin(&state, admin).await?;
    }

    Ok(state)
}

async fn bootstrap_super_admin(state: &AppState, admin: BootstrapAdmin) -> anyhow::Result<()> {
    let username = Username::new(admin.username).context("BOOTSTRAP_ADMIN_USERNAME")?;
    let email = Email::new(admin.email).context("BOOTSTRAP_ADMIN_EMAIL")?;

    if state
        .auth
        .bootstrap_super_admin(username, email, &admin.password)
        .await?
    {
        info!("Bootstrap super-admin created");
    }
    Ok(())
}
