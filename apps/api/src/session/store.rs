use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::machine::Session;

/// Upper bound on the sweep period; short TTLs sweep more often.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    session: Session,
    last_seen: Instant,
}

type Sessions = Arc<RwLock<HashMap<Uuid, Entry>>>;

/// In-memory session registry. Nothing is persisted: sessions are dropped on
/// explicit delete, after sitting idle past the TTL, or when the process exits.
///
/// Closures run under the write lock and must not await.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Sessions,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.inner.write().await.insert(
            session.id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        session
    }

    /// Read-only access. Still takes the write lock to refresh `last_seen`.
    pub async fn read<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&Session) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.inner.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_seen = Instant::now();
        f(&entry.session)
    }

    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.inner.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_seen = Instant::now();
        f(&mut entry.session)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Drops every session idle for longer than `ttl`. Returns how many went.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= ttl);
        before - sessions.len()
    }

    /// Background task that runs `evict_idle` periodically.
    pub fn spawn_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = ttl.min(MAX_SWEEP_INTERVAL).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle sessions");
                }
            }
        })
    }

    /// Runs `release` against the session if the guard is dropped while armed.
    /// Used to clear a loading flag when a request is cancelled mid-call.
    pub fn release_on_drop<F>(&self, id: Uuid, release: F) -> ReleaseGuard
    where
        F: FnOnce(&mut Session) + Send + 'static,
    {
        ReleaseGuard {
            sessions: self.inner.clone(),
            id,
            release: Some(Box::new(release)),
        }
    }
}

type Release = Box<dyn FnOnce(&mut Session) + Send>;

#[must_use = "dropping the guard immediately runs its release"]
pub struct ReleaseGuard {
    sessions: Sessions,
    id: Uuid,
    release: Option<Release>,
}

impl ReleaseGuard {
    /// The call finished normally; the caller applies the outcome itself.
    pub fn disarm(mut self) {
        self.release = None;
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        let Some(release) = self.release.take() else {
            return;
        };
        let id = self.id;
        debug!("Session {id}: request dropped mid-call, releasing its loading flag");

        if let Ok(mut sessions) = self.sessions.try_write() {
            if let Some(entry) = sessions.get_mut(&id) {
                release(&mut entry.session);
            }
            return;
        }

        // Lock is contended; finish the release on the runtime instead.
        let sessions = self.sessions.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Some(entry) = sessions.write().await.get_mut(&id) {
                    release(&mut entry.session);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchParams;
    use crate::session::machine::AppStep;

    #[tokio::test]
    async fn test_create_update_remove() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        store
            .update(id, |s| s.standalone_create())
            .await
            .unwrap();
        let step = store.read(id, |s| Ok(s.step)).await.unwrap();
        assert_eq!(step, AppStep::ProfileInput);

        store.remove(id).await.unwrap();
        assert!(matches!(
            store.read(id, |s| Ok(s.step)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_update_reports_not_found() {
        let store = SessionStore::new();
        let err = store.update(Uuid::new_v4(), |_| Ok(())).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_keeps_recently_used_sessions() {
        let store = SessionStore::new();
        let ttl = Duration::from_secs(600);
        let idle = store.create().await.id;
        let active = store.create().await.id;

        tokio::time::advance(Duration::from_secs(400)).await;
        store.read(active, |_| Ok(())).await.unwrap();
        tokio::time::advance(Duration::from_secs(300)).await;

        assert_eq!(store.evict_idle(ttl).await, 1);
        assert!(matches!(
            store.read(idle, |_| Ok(())).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.read(active, |_| Ok(())).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_abandoned_sessions() {
        let store = SessionStore::new();
        let ttl = Duration::from_secs(30);
        let id = store.create().await.id;
        let sweeper = store.spawn_sweeper(ttl);

        tokio::time::sleep(Duration::from_secs(90)).await;

        assert!(matches!(
            store.read(id, |_| Ok(())).await,
            Err(AppError::NotFound(_))
        ));
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_dropped_guard_runs_release() {
        let store = SessionStore::new();
        let id = store.create().await.id;
        let ticket = store
            .update(id, |s| {
                s.begin_search(SearchParams {
                    role: "Rust".to_string(),
                    location: "上海".to_string(),
                })
            })
            .await
            .unwrap();

        drop(store.release_on_drop(id, move |s| {
            s.fail_search(&ticket);
        }));

        let loading = store
            .read(id, |s| Ok(s.snapshot().loading.search))
            .await
            .unwrap();
        assert!(!loading);
    }

    #[tokio::test]
    async fn test_disarmed_guard_leaves_session_alone() {
        let store = SessionStore::new();
        let id = store.create().await.id;
        store.release_on_drop(id, |s| s.upload_requested = true).disarm();

        let requested = store
            .read(id, |s| Ok(s.upload_requested))
            .await
            .unwrap();
        assert!(!requested);
    }
}
