//! Session persistence abstraction.
//!
//! In-progress compositions are kept per editing session, keyed by an
//! external session id. The store is injected by the embedding application
//! rather than held as ambient state, so lifetime and teardown stay
//! explicit and testable.

use crate::board::Composition;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;
use thiserror::Error;

/// Session store errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Session store error: {0}")]
    Other(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Boxed future for async store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for session storage backends.
///
/// Implementations can keep sessions in memory, on disk, or behind a
/// remote service; the engine only sees this interface.
pub trait SessionStore: Send + Sync {
    /// Save a composition under a session id.
    fn save(&self, id: &str, composition: &Composition) -> BoxFuture<'_, SessionResult<()>>;

    /// Load the composition for a session.
    fn load(&self, id: &str) -> BoxFuture<'_, SessionResult<Composition>>;

    /// Delete a session.
    fn delete(&self, id: &str) -> BoxFuture<'_, SessionResult<()>>;

    /// List all session ids.
    fn list(&self) -> BoxFuture<'_, SessionResult<Vec<String>>>;

    /// Check if a session exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, SessionResult<bool>>;
}

/// In-memory session store for testing and ephemeral use.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Composition>>,
}

impl MemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, id: &str, composition: &Composition) -> BoxFuture<'_, SessionResult<()>> {
        let id = id.to_string();
        let composition = composition.clone();
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|e| SessionError::Other(format!("Lock error: {}", e)))?;
            sessions.insert(id, composition);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, SessionResult<Composition>> {
        let id = id.to_string();
        Box::pin(async move {
            let sessions = self
                .sessions
                .read()
                .map_err(|e| SessionError::Other(format!("Lock error: {}", e)))?;
            sessions
                .get(&id)
                .cloned()
                .ok_or(SessionError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, SessionResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|e| SessionError::Other(format!("Lock error: {}", e)))?;
            sessions.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, SessionResult<Vec<String>>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .read()
                .map_err(|e| SessionError::Other(format!("Lock error: {}", e)))?;
            Ok(sessions.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, SessionResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let sessions = self
                .sessions
                .read()
                .map_err(|e| SessionError::Other(format!("Lock error: {}", e)))?;
            Ok(sessions.contains_key(&id))
        })
    }
}

/// Simple polling executor for tests and synchronous embeddings.
pub fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
