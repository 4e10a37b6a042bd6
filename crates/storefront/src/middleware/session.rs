//! Session middleware configuration.
//!
//! Sessions only carry toast notifications between a cart mutation and the
//! page it redirects to. Records live in a bounded `moka` cache and are
//! evicted once their expiry date passes, so cookieless clients cannot grow
//! the store without limit.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::OffsetDateTime},
    session::{Id, Record},
    session_store,
};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dm_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Maximum number of session records held at once.
pub const SESSION_CAPACITY: u64 = 10_000;

// =============================================================================
// SessionCache
// =============================================================================

/// Bounded in-memory session store.
///
/// Least-used records are evicted when the cache is full; every record is
/// dropped when its `expiry_date` passes.
#[derive(Debug, Clone)]
pub struct SessionCache {
    records: Cache<Id, Record>,
}

impl SessionCache {
    /// Create a store holding at most `capacity` records.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(capacity)
                .expire_after(RecordExpiry)
                .build(),
        }
    }

    /// Number of stored records once pending evictions have run.
    pub async fn record_count(&self) -> u64 {
        self.records.run_pending_tasks().await;
        self.records.entry_count()
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(SESSION_CAPACITY)
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Per-entry TTL taken from the record's own expiry date.
struct RecordExpiry;

impl moka::Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(
        &self,
        _id: &Id,
        record: &Record,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(time_until(record.expiry_date))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(time_until(record.expiry_date))
    }
}

/// Time left before `expiry_date`; zero once it has passed.
fn time_until(expiry_date: OffsetDateTime) -> Duration {
    Duration::try_from(expiry_date - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO)
}

// =============================================================================
// Layer
// =============================================================================

/// Create the session layer with a bounded in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<SessionCache> {
    session_layer(SessionCache::default(), config.is_secure())
}

/// Session layer over `store`; `secure` marks the cookie HTTPS-only.
#[must_use]
pub fn session_layer(store: SessionCache, secure: bool) -> SessionManagerLayer<SessionCache> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::post};
    use tower::ServiceExt;
    use tower_sessions::{Session, cookie::time};

    use super::*;
    use crate::models::{Toast, push_toast};

    fn record(ttl: time::Duration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + ttl,
        }
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = SessionCache::new(16);
        let mut record = record(time::Duration::minutes(30));

        store.create(&mut record).await.unwrap();
        assert_eq!(store.load(&record.id).await.unwrap(), Some(record.clone()));

        store.delete(&record.id).await.unwrap();
        assert_eq!(store.load(&record.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_avoids_id_collision() {
        let store = SessionCache::new(16);
        let mut first = record(time::Duration::minutes(30));
        store.create(&mut first).await.unwrap();

        let mut second = record(time::Duration::minutes(30));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.record_count().await, 2);
    }

    #[tokio::test]
    async fn test_expired_records_are_evicted() {
        let store = SessionCache::new(16);
        store.save(&record(time::Duration::milliseconds(200))).await.unwrap();
        store.save(&record(time::Duration::minutes(30))).await.unwrap();

        // Expiry is processed on a coarse timer wheel.
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn test_record_already_expired_is_not_loaded() {
        let store = SessionCache::new(16);
        let stale = record(time::Duration::seconds(-1));
        store.save(&stale).await.unwrap();

        assert_eq!(store.load(&stale.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cookieless_toasts_stay_within_capacity() {
        const CAPACITY: u64 = 8;

        async fn queue_toast(session: Session) {
            push_toast(&session, Toast::success("Item removed from cart.")).await;
        }

        let store = SessionCache::new(CAPACITY);
        let app = Router::new()
            .route("/cart/remove", post(queue_toast))
            .layer(session_layer(store.clone(), false));

        for _ in 0..200 {
            let request = Request::builder()
                .method("POST")
                .uri("/cart/remove")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert!(response.headers().contains_key("set-cookie"));
        }

        assert!(store.record_count().await <= CAPACITY);
    }
}
