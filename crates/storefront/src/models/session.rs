//! Session-related types.
//!
//! The session holds nothing but toast notifications: messages queued by a
//! mutation handler and shown once by the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// Key for queued toast notifications.
    pub const TOASTS: &str = "toasts";
}

/// Most toasts kept between two page renders.
const MAX_QUEUED_TOASTS: usize = 5;

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    /// CSS modifier used by the toast partial.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A one-shot notification shown at the top of the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Queue a toast for the next rendered page.
///
/// Session store failures are logged; losing a toast never fails the request.
pub async fn push_toast(session: &Session, toast: Toast) {
    let mut queued: Vec<Toast> = session
        .get(keys::TOASTS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    queued.push(toast);
    if queued.len() > MAX_QUEUED_TOASTS {
        queued.drain(..queued.len() - MAX_QUEUED_TOASTS);
    }

    if let Err(e) = session.insert(keys::TOASTS, queued).await {
        tracing::error!("Failed to queue toast: {e}");
    }
}

/// Remove and return every queued toast.
pub async fn take_toasts(session: &Session) -> Vec<Toast> {
    match session.remove::<Vec<Toast>>(keys::TOASTS).await {
        Ok(toasts) => toasts.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read toasts from session: {e}");
            Vec::new()
        }
    }
}
