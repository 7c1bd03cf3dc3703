//! Host capability abstraction — pluggable environment adapters.
//!
//! Extracts all host-specific behavior (key events, clipboard access,
//! location/fragment state) into narrow sub-interfaces. A concrete host
//! environment implements one or more traits; the bridge composes them
//! at construction. The host owns all state — keyboard focus, clipboard
//! contents, URL fragment — and these interfaces never mirror it.

pub mod sim;

use futures::future::BoxFuture;

/// Errors surfaced by host capability adapters.
///
/// Only the clipboard has an error path: listener registration and
/// fragment read/write are treated as always-succeeding against a
/// present host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Clipboard write was denied or failed (permission denial,
    /// insecure context, unsupported environment).
    #[error("clipboard: {0}")]
    Clipboard(String),
}

/// A key-down event delivered by the host's input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key identifier as the host reports it (UI Events `key` value,
    /// e.g. `" "` for the space bar, `"Enter"`, `"a"`).
    pub key: String,
}

/// A key handler's decision about the event's default action.
///
/// Stands in for the host's cancelable-event mechanism: returning
/// [`KeyDisposition::SuppressDefault`] suppresses the host's default
/// behavior (e.g. page scroll) for that event only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Suppress the host's default action for this event.
    SuppressDefault,
    /// Let the host's default action proceed.
    Propagate,
}

/// Handler attached to the global key-down stream.
pub type KeyHandler = dyn Fn(&KeyEvent) -> KeyDisposition + Send + Sync;

/// Handler attached to the fragment-change notification stream.
///
/// Takes no arguments: the subscriber re-reads the fragment from the
/// location facility, so it only ever observes the post-change value.
pub type ChangeHandler = dyn Fn() + Send + Sync;

/// Handle for a live listener registration.
///
/// Dropping the handle does NOT remove the listener — subscriptions
/// stay alive for the lifetime of the host, so callers that ignore the
/// handle get page-lifetime registrations. Call [`Registration::cancel`]
/// to remove the listener.
pub struct Registration {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Registration {
    /// Wrap a removal closure provided by the host adapter.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the underlying listener. Idempotent by construction:
    /// consumes the handle.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").finish_non_exhaustive()
    }
}

/// Global input-event source emitting key-identified press events.
pub trait InputSource: Send + Sync {
    /// Attach a handler to the global key-down stream.
    ///
    /// The handler is invoked once per key-down event, synchronously on
    /// the host's input-processing turn, strictly serialized with all
    /// other host event handling.
    fn subscribe_keys(&self, handler: Box<KeyHandler>) -> Registration;
}

/// Asynchronous write access to the system clipboard.
///
/// `Send + Sync` is required because the bridge resolves the write on a
/// spawned task.
pub trait ClipboardService: Send + Sync {
    /// Request an asynchronous clipboard write.
    ///
    /// The returned future resolves or rejects on the host's schedule;
    /// no timeout is applied and the operation cannot be aborted.
    fn write_text(&self, text: &str) -> BoxFuture<'static, Result<(), HostError>>;
}

/// Navigable-location facility: fragment read, replace-in-place write,
/// and change notifications for fragment mutations from any source.
pub trait LocationService: Send + Sync {
    /// Current raw fragment, `#`-prefixed when present, empty string
    /// otherwise. Mirrors the host's raw hash value.
    fn fragment(&self) -> String;

    /// Replace the current fragment in place.
    ///
    /// No history entry is pushed and no navigation occurs. Does not
    /// fire this facility's own change notifications (replace-state
    /// host semantics).
    fn replace_fragment(&self, raw: &str);

    /// Attach a handler to the fragment-change notification stream.
    ///
    /// Fires once per host-detected change, in host delivery order, for
    /// changes from any source: navigation, back/forward, or a direct
    /// host API write.
    fn subscribe_changes(&self, handler: Box<ChangeHandler>) -> Registration;
}

/// Sink for non-fatal failures that are contained rather than raised.
///
/// Injectable so tests can observe suppressed failures without a
/// tracing subscriber.
pub trait DiagnosticSink: Send + Sync {
    /// Report a contained failure from the named bridge operation.
    fn report(&self, op: &'static str, err: &HostError);
}

/// Default diagnostic sink — routes reports to `tracing`.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, op: &'static str, err: &HostError) {
        tracing::error!(op, error = %err, "host operation failed");
    }
}
