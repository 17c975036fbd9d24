//! Service wiring.
//!
//! Builds the credential/role store, session cache, token issuer, and the
//! two services from configuration, and hands back the endpoint state. All
//! components are constructed here and injected explicitly; nothing reaches
//! for process-global registries.

use std::sync::Arc;

use tracing::info;

use gatehouse_auth::http::ApiState;
use gatehouse_auth::login::LoginService;
use gatehouse_auth::registration::RegistrationService;
use gatehouse_auth::store::credentials::CredentialStore;
use gatehouse_auth::store::memory::MemoryAuthStore;
use gatehouse_auth::store::roles::RoleStore;
use gatehouse_auth::token::issuer::TokenIssuer;
use gatehouse_auth_postgres::{PgCredentialStore, PgRoleStore};
use gatehouse_cache::{CacheBackend, MemoryBackend, RedisBackend, SessionCache, StringCodec};

use crate::config::{CacheMode, ServerConfig, StorageMode};

/// Builds the HTTP endpoint state from configuration.
///
/// # Errors
///
/// Returns an error if the storage or cache backend cannot be constructed.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<ApiState> {
    let backend: Arc<dyn CacheBackend> = match config.cache.mode {
        CacheMode::Redis => {
            info!(url = %config.cache.url, "using redis session cache");
            Arc::new(RedisBackend::from_url(&config.cache.url)?)
        }
        CacheMode::Memory => {
            info!("using in-memory session cache");
            Arc::new(MemoryBackend::new())
        }
    };
    let sessions = Arc::new(SessionCache::with_codec(
        backend,
        StringCodec,
        Some(config.cache.default_ttl),
    ));

    let (credentials, roles): (Arc<dyn CredentialStore>, Arc<dyn RoleStore>) =
        match config.storage.mode {
            StorageMode::Postgres => {
                info!("using postgres credential/role store");
                let pool = gatehouse_auth_postgres::connect(
                    &config.storage.url,
                    config.storage.max_connections,
                )
                .await?;
                (
                    Arc::new(PgCredentialStore::new(
                        pool.clone(),
                        config.auth.password_policy.clone(),
                        config.auth.lockout.clone(),
                    )),
                    Arc::new(PgRoleStore::new(pool)),
                )
            }
            StorageMode::Memory => {
                info!("using in-memory credential/role store");
                let store = Arc::new(MemoryAuthStore::new(
                    config.auth.password_policy.clone(),
                    config.auth.lockout.clone(),
                ));
                (store.clone(), store)
            }
        };

    let issuer = Arc::new(TokenIssuer::new(
        &config.auth.token.secret_key,
        config.auth.token.ttl,
    ));

    let login = Arc::new(LoginService::new(
        credentials.clone(),
        roles.clone(),
        issuer,
        sessions,
    ));
    let registration = Arc::new(RegistrationService::new(
        credentials,
        roles,
        config.auth.registration.default_role.as_str(),
    ));

    Ok(ApiState::new(login, registration))
}
