//! Caller context injection
//!
//! Thread-local storage for the identity a request runs as, so that every
//! span opened while handling it can be tagged with that identity.

use std::cell::RefCell;

use belay_core::Caller;
use uuid::Uuid;

/// Caller context data stored in thread-local storage
#[derive(Debug, Clone)]
pub struct CallerContextData {
    /// Display form of the caller, e.g. `admin:alice`
    pub caller: String,
    /// Whether the caller bypasses visibility filtering
    pub privileged: bool,
    /// Unique id for this request
    pub request_id: Uuid,
}

thread_local! {
    static CALLER_CONTEXT: RefCell<Option<CallerContextData>> = const { RefCell::new(None) };
}

/// RAII guard for caller context
///
/// Sets the caller for the current thread on creation and restores the
/// previous context (if any) on drop.
///
/// # Example
///
/// ```ignore
/// use belay_core::Caller;
/// use belay_logging::CallerContextGuard;
///
/// let _guard = CallerContextGuard::new(&Caller::administrator("alice"));
/// tracing::info!("Assembling subtree");
/// ```
pub struct CallerContextGuard {
    previous: Option<CallerContextData>,
}

impl CallerContextGuard {
    /// Create a guard with a fresh request id
    pub fn new(caller: &Caller) -> Self {
        Self::with_request_id(caller, Uuid::new_v4())
    }

    /// Create a guard with a specific request id
    pub fn with_request_id(caller: &Caller, request_id: Uuid) -> Self {
        let previous = CALLER_CONTEXT.with(|ctx| ctx.borrow().clone());

        let new_ctx = CallerContextData {
            caller: caller.to_string(),
            privileged: caller.is_privileged(),
            request_id,
        };
        CALLER_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(new_ctx));

        Self { previous }
    }

    /// Get the current caller context (if any)
    pub fn current() -> Option<CallerContextData> {
        CALLER_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    pub fn current_request_id() -> Option<Uuid> {
        Self::current().map(|ctx| ctx.request_id)
    }
}

impl Drop for CallerContextGuard {
    fn drop(&mut self) {
        CALLER_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}
