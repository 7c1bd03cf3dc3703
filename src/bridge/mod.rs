//! Host bridge — the five entry points the application core calls.
//!
//! Each operation is a stateless pass-through to a host capability:
//! key-press observation (space-bar trigger), clipboard write, and
//! URL-fragment read/write/observe. The bridge holds no state of its
//! own; keyboard focus, clipboard contents, and the fragment all stay
//! host-owned, and the fragment is the single source of truth for
//! hash-based view state.

use std::sync::Arc;

use crate::host::{
    ClipboardService, DiagnosticSink, InputSource, KeyDisposition, LocationService,
    Registration, TracingSink,
};

/// UI Events key identifier for the space bar.
const SPACE_KEY: &str = " ";

/// Fragment separator, applied on write and stripped on read.
const SEPARATOR: char = '#';

/// Composed set of host capabilities behind the five adapter
/// operations.
pub struct HostBridge {
    input: Arc<dyn InputSource>,
    clipboard: Arc<dyn ClipboardService>,
    location: Arc<dyn LocationService>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl HostBridge {
    /// Compose a bridge over concrete host capabilities, reporting
    /// contained failures via `tracing`.
    pub fn new(
        input: Arc<dyn InputSource>,
        clipboard: Arc<dyn ClipboardService>,
        location: Arc<dyn LocationService>,
    ) -> Self {
        Self::with_diagnostics(input, clipboard, location, Arc::new(TracingSink))
    }

    /// Compose a bridge with an explicit diagnostic sink.
    pub fn with_diagnostics(
        input: Arc<dyn InputSource>,
        clipboard: Arc<dyn ClipboardService>,
        location: Arc<dyn LocationService>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            input,
            clipboard,
            location,
            diagnostics,
        }
    }

    /// Register `callback` on the global key stream, filtered to the
    /// space bar.
    ///
    /// The callback fires exactly once per space key-down, synchronously
    /// on the host's input-processing turn; the host's default action
    /// (page scroll) is suppressed only on those qualifying events. No
    /// other key reaches the callback.
    pub fn on_space_key<F>(&self, callback: F) -> Registration
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.input.subscribe_keys(Box::new(move |event| {
            if event.key == SPACE_KEY {
                callback();
                KeyDisposition::SuppressDefault
            } else {
                KeyDisposition::Propagate
            }
        }))
    }

    /// Fire-and-forget clipboard write.
    ///
    /// Requests the host to place `text` on the system clipboard and
    /// returns immediately. A failed write is reported to the
    /// diagnostic sink — exactly once per failed call — and never
    /// reaches the caller; nothing is retried.
    ///
    /// The write resolves on a spawned task, so this must be called
    /// from within a tokio runtime.
    pub fn copy_text(&self, text: &str) {
        let write = self.clipboard.write_text(text);
        let diagnostics = Arc::clone(&self.diagnostics);
        tokio::spawn(async move {
            if let Err(err) = write.await {
                diagnostics.report("copy_text", &err);
            }
        });
    }

    /// Replace the URL fragment with `hash`, adding the separator.
    ///
    /// `hash` carries no leading `#`. Replace semantics: the visible
    /// URL changes immediately, no history entry is created, and no
    /// navigation occurs. Does not notify this bridge's own hash-change
    /// path.
    pub fn set_hash(&self, hash: &str) {
        self.location.replace_fragment(&format!("{SEPARATOR}{hash}"));
    }

    /// Current URL fragment with the separator stripped.
    ///
    /// Returns the empty string when no fragment is present. Pure read;
    /// idempotent under no intervening writes.
    pub fn hash(&self) -> String {
        strip_separator(&self.location.fragment()).to_string()
    }

    /// Register `callback` on the fragment-change stream.
    ///
    /// Fires once per host-detected change, in host delivery order,
    /// with the post-change fragment normalized by the same stripping
    /// rule as [`HostBridge::hash`] — never the raw event.
    pub fn on_hash_change<F>(&self, callback: F) -> Registration
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let location = Arc::clone(&self.location);
        self.location.subscribe_changes(Box::new(move || {
            callback(strip_separator(&location.fragment()));
        }))
    }
}

/// Strip the leading fragment separator, if present.
///
/// Shared by the hash reader and the change-notification path so both
/// normalize identically.
fn strip_separator(raw: &str) -> &str {
    raw.strip_prefix(SEPARATOR).unwrap_or(raw)
}
