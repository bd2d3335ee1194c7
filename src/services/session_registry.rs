use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{sync::RwLock, task::JoinHandle};
use uuid::Uuid;

use crate::{
    config::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_TTL_SECS},
    errors::{AppError, AppResult},
    services::{
        acquisition_controller::AcquisitionController, ingestion::DocumentIngestor,
        question_provider::QuestionProvider,
    },
};

struct SessionEntry {
    controller: Arc<AcquisitionController>,
    last_access: Instant,
}

/// In-memory sessions keyed by id. Nothing is persisted.
///
/// Sessions idle for longer than `idle_ttl` are evicted by [`SessionRegistry::evict_idle`],
/// and the map never holds more than `max_sessions` entries: creating one past the cap
/// evicts the least recently used session.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    provider: Arc<dyn QuestionProvider>,
    ingestor: Arc<dyn DocumentIngestor>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(provider: Arc<dyn QuestionProvider>, ingestor: Arc<dyn DocumentIngestor>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            provider,
            ingestor,
            idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_limits(mut self, idle_ttl: Duration, max_sessions: usize) -> Self {
        self.idle_ttl = idle_ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub async fn create(&self) -> Arc<AcquisitionController> {
        let id = Uuid::new_v4();
        let session = Arc::new(AcquisitionController::new(
            id,
            Arc::clone(&self.provider),
            Arc::clone(&self.ingestor),
        ));

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            self.remove_idle(&mut sessions, Instant::now());
        }
        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                log::warn!("Session limit {} reached, evicted session {}", self.max_sessions, oldest);
            }
        }
        sessions.insert(
            id,
            SessionEntry {
                controller: Arc::clone(&session),
                last_access: Instant::now(),
            },
        );
        log::info!("Created session {}", id);
        session
    }

    /// Looks up a session and marks it as recently used.
    pub async fn get(&self, id: &Uuid) -> AppResult<Arc<AcquisitionController>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        entry.last_access = Instant::now();
        Ok(Arc::clone(&entry.controller))
    }

    /// Drops the session; work still running for it finishes against the detached controller.
    pub async fn remove(&self, id: &Uuid) -> AppResult<()> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                log::info!("Removed session {}", id);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {} not found", id))),
        }
    }

    pub async fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now()).await
    }

    /// Removes every session whose last access is at least `idle_ttl` before `now`.
    pub async fn evict_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        self.remove_idle(&mut sessions, now)
    }

    fn remove_idle(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_access) < self.idle_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            log::info!("Evicted {} idle sessions, {} remaining", evicted, sessions.len());
        }
        evicted
    }

    /// Runs [`SessionRegistry::evict_idle`] every `every` until the runtime shuts down.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                registry.evict_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
