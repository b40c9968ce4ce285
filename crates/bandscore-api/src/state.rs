//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. `EvaluationService` is generic over the criteria store; AppState pins
//! it to the filesystem store from bandscore-infra.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use bandscore_core::evaluation::{EvaluationService, EvaluationSettings};
use bandscore_core::llm::provider::ProviderFactory;
use bandscore_core::service::secret::SecretService;
use bandscore_infra::config::{config_path, load_app_config};
use bandscore_infra::criteria::FsCriteriaStore;
use bandscore_infra::crypto::criteria_cipher::CriteriaCipher;
use bandscore_infra::data_dir::resolve_data_dir;
use bandscore_infra::llm::gemini::GeminiProviderFactory;
use bandscore_infra::secret::chain::build_secret_chain;
use bandscore_types::config::AppConfig;
use bandscore_types::secret::CRITERIA_ENCRYPTION_KEY;
use bandscore_types::session::{EvaluationSession, SessionId};

/// Evaluation service pinned to the filesystem criteria store.
pub type ConcreteEvaluationService = EvaluationService<FsCriteriaStore>;

/// Shared application state.
///
/// Cloning is cheap; every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub evaluation_service: Arc<ConcreteEvaluationService>,
    /// In-memory wizard sessions for the web UI.
    pub sessions: Arc<DashMap<SessionId, EvaluationSession>>,
}

/// Data directory, config file location and the parsed config.
///
/// Commands that never touch secrets or the model stop here instead of
/// building a full [`AppState`].
pub struct LoadedConfig {
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: AppConfig,
}

impl LoadedConfig {
    pub async fn load(config_override: Option<&Path>) -> Self {
        let data_dir = resolve_data_dir();
        let config_path = config_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_path(&data_dir));
        let config = load_app_config(&config_path).await;
        Self {
            data_dir,
            config_path,
            config,
        }
    }

    /// Environment first, then `secrets.toml` in the data directory.
    pub fn secret_service(&self) -> SecretService {
        SecretService::new(build_secret_chain(&self.data_dir, true))
    }
}

impl AppState {
    /// Load config and secrets, then wire the Gemini-backed evaluation service.
    pub async fn init(config_override: Option<&Path>) -> anyhow::Result<Self> {
        let loaded = LoadedConfig::load(config_override).await;
        let secret_service = Arc::new(loaded.secret_service());
        let factory = Arc::new(GeminiProviderFactory::from_config(&loaded.config.model));

        Self::from_parts(
            loaded.config,
            loaded.data_dir,
            loaded.config_path,
            secret_service,
            factory,
        )
        .await
    }

    /// Wire state from already-resolved pieces.
    pub async fn from_parts(
        config: AppConfig,
        data_dir: PathBuf,
        config_path: PathBuf,
        secret_service: Arc<SecretService>,
        factory: Arc<dyn ProviderFactory>,
    ) -> anyhow::Result<Self> {
        let cipher = match secret_service.get_secret(CRITERIA_ENCRYPTION_KEY).await? {
            Some(key) => {
                let cipher = CriteriaCipher::from_encoded_key(&key)
                    .with_context(|| format!("{CRITERIA_ENCRYPTION_KEY} is not a usable key"))?;
                tracing::debug!(key = cipher.fingerprint(), "Criteria encryption key loaded");
                Some(cipher)
            }
            None => None,
        };

        let store = FsCriteriaStore::new(config.criteria_dir.clone(), cipher);
        let evaluation_service = EvaluationService::new(
            store,
            secret_service.clone(),
            factory,
            EvaluationSettings::from_config(&config),
        );

        Ok(Self {
            config: Arc::new(config),
            data_dir,
            config_path,
            evaluation_service: Arc::new(evaluation_service),
            sessions: Arc::new(DashMap::new()),
        })
    }

    fn session_idle_limit(&self) -> TimeDelta {
        i64::try_from(self.config.server.session_idle_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// True when `session` has been idle longer than the configured limit.
    pub fn is_expired(&self, session: &EvaluationSession, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.updated_at) > self.session_idle_limit()
    }

    /// Drop idle sessions, returning how many were removed.
    pub fn prune_sessions(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !self.is_expired(session, now));
        before.saturating_sub(self.sessions.len())
    }

    /// Store a new session. Idle sessions are pruned first; at the cap the
    /// least recently updated session is evicted.
    pub fn insert_session(&self, session: EvaluationSession) {
        self.prune_sessions(Utc::now());

        let cap = self.config.server.max_sessions.max(1);
        while self.sessions.len() >= cap {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().updated_at)
                .map(|entry| *entry.key());
            let Some(id) = oldest else { break };
            self.sessions.remove(&id);
            tracing::debug!(session = %id, cap, "Evicted least recently used session");
        }

        self.sessions.insert(session.id, session);
    }

    /// Periodically prune idle sessions for the lifetime of the server.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let period = Duration::from_secs((self.config.server.session_idle_secs / 4).clamp(1, 60));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = state.prune_sessions(Utc::now());
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        remaining = state.sessions.len(),
                        "Pruned idle sessions"
                    );
                }
            }
        })
    }
}
