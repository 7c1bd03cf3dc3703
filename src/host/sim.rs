//! Simulated host — in-memory environment for tests and headless embedders.
//!
//! Owns the state a real host would (fragment, clipboard, listener
//! tables) and exposes driver methods that stand in for user input and
//! navigation. Handlers are snapshotted and invoked with the state lock
//! released, so a callback may re-enter the host — the hash-change path
//! reads the fragment from inside a notification.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;

use super::{
    ChangeHandler, ClipboardService, HostError, InputSource, KeyDisposition, KeyEvent,
    KeyHandler, LocationService, Registration,
};

/// Clipboard behavior of the simulated host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    /// Writes succeed and are stored.
    Accept,
    /// Writes are rejected, as under a denied permission or insecure
    /// context.
    Deny,
}

struct SimState {
    /// Raw fragment, `#`-prefixed when present, empty otherwise.
    fragment: String,
    clipboard: Option<String>,
    clipboard_mode: ClipboardMode,
    /// Browsing history depth. Navigation pushes; replace does not.
    history_len: usize,
    /// Monotonic listener id, shared across both listener tables.
    next_listener: u64,
    key_handlers: Vec<(u64, Arc<KeyHandler>)>,
    change_handlers: Vec<(u64, Arc<ChangeHandler>)>,
}

/// In-memory host implementing all three capability traits.
///
/// Cloning is cheap and shares the same host state, so a driver handle
/// can be kept alongside the handles given to the bridge.
#[derive(Clone)]
pub struct SimHost {
    state: Arc<Mutex<SimState>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::with_clipboard_mode(ClipboardMode::Accept)
    }

    pub fn with_clipboard_mode(clipboard_mode: ClipboardMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                fragment: String::new(),
                clipboard: None,
                clipboard_mode,
                history_len: 1,
                next_listener: 1,
                key_handlers: Vec::new(),
                change_handlers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a key-down event to all key listeners, in registration
    /// order. Returns `true` if any handler suppressed the default
    /// action for this event.
    pub fn press_key(&self, key: &str) -> bool {
        let handlers: Vec<Arc<KeyHandler>> = self
            .lock()
            .key_handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        let event = KeyEvent {
            key: key.to_string(),
        };
        let mut suppressed = false;
        for handler in handlers {
            if handler(&event) == KeyDisposition::SuppressDefault {
                suppressed = true;
            }
        }
        suppressed
    }

    /// Simulate a fragment change induced outside the bridge (link
    /// click, back/forward traversal).
    ///
    /// Pushes a history entry and notifies change listeners in
    /// registration order — but only when the value actually changed,
    /// matching host change-detection semantics.
    pub fn navigate_to_fragment(&self, raw: &str) {
        let handlers: Vec<Arc<ChangeHandler>> = {
            let mut state = self.lock();
            if state.fragment == raw {
                return;
            }
            state.fragment = raw.to_string();
            state.history_len += 1;
            state
                .change_handlers
                .iter()
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };

        for handler in handlers {
            handler();
        }
    }

    pub fn set_clipboard_mode(&self, mode: ClipboardMode) {
        self.lock().clipboard_mode = mode;
    }

    /// Last successfully written clipboard text, if any.
    pub fn clipboard(&self) -> Option<String> {
        self.lock().clipboard.clone()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history_len
    }

    pub fn key_listener_count(&self) -> usize {
        self.lock().key_handlers.len()
    }

    pub fn change_listener_count(&self) -> usize {
        self.lock().change_handlers.len()
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for SimHost {
    fn subscribe_keys(&self, handler: Box<KeyHandler>) -> Registration {
        let id = {
            let mut state = self.lock();
            let id = state.next_listener;
            state.next_listener += 1;
            state.key_handlers.push((id, Arc::from(handler)));
            id
        };

        let shared = Arc::clone(&self.state);
        Registration::new(move || {
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            state.key_handlers.retain(|(entry, _)| *entry != id);
        })
    }
}

impl ClipboardService for SimHost {
    fn write_text(&self, text: &str) -> BoxFuture<'static, Result<(), HostError>> {
        let shared = Arc::clone(&self.state);
        let text = text.to_string();
        Box::pin(async move {
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            match state.clipboard_mode {
                ClipboardMode::Accept => {
                    state.clipboard = Some(text);
                    Ok(())
                }
                ClipboardMode::Deny => {
                    Err(HostError::Clipboard("write denied by host".to_string()))
                }
            }
        })
    }
}

impl LocationService for SimHost {
    fn fragment(&self) -> String {
        self.lock().fragment.clone()
    }

    fn replace_fragment(&self, raw: &str) {
        // Replace-state semantics: no history push, no change
        // notification, even if the value differs.
        self.lock().fragment = raw.to_string();
    }

    fn subscribe_changes(&self, handler: Box<ChangeHandler>) -> Registration {
        let id = {
            let mut state = self.lock();
            let id = state.next_listener;
            state.next_listener += 1;
            state.change_handlers.push((id, Arc::from(handler)));
            id
        };

        let shared = Arc::clone(&self.state);
        Registration::new(move || {
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            state.change_handlers.retain(|(entry, _)| *entry != id);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    // -- Key delivery --

    #[test]
    fn press_key_reaches_all_listeners_in_order() {
        let host = SimHost::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            host.subscribe_keys(Box::new(move |event| {
                log.lock().unwrap().push((tag, event.key.clone()));
                KeyDisposition::Propagate
            }));
        }

        assert!(!host.press_key("a"));
        let entries = log.lock().unwrap().clone();
        assert_eq!(entries, vec![("first", "a".to_string()), ("second", "a".to_string())]);
    }

    #[test]
    fn press_key_reports_suppression() {
        let host = SimHost::new();
        host.subscribe_keys(Box::new(|_| KeyDisposition::SuppressDefault));
        assert!(host.press_key("x"));
    }

    #[test]
    fn press_key_without_listeners_is_noop() {
        let host = SimHost::new();
        assert!(!host.press_key("a"));
    }

    // -- Fragment state --

    #[test]
    fn replace_fragment_does_not_push_history_or_notify() {
        let host = SimHost::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        host.subscribe_changes(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        host.replace_fragment("#a");
        assert_eq!(host.fragment(), "#a");
        assert_eq!(host.history_len(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn navigate_pushes_history_and_notifies() {
        let host = SimHost::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        host.subscribe_changes(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        host.navigate_to_fragment("#a");
        assert_eq!(host.fragment(), "#a");
        assert_eq!(host.history_len(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn navigate_to_same_fragment_does_not_notify() {
        let host = SimHost::new();
        host.navigate_to_fragment("#a");

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        host.subscribe_changes(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        host.navigate_to_fragment("#a");
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(host.history_len(), 2);
    }

    #[test]
    fn change_listener_can_read_fragment_reentrantly() {
        let host = SimHost::new();
        let seen = Arc::new(Mutex::new(String::new()));
        let inner_host = host.clone();
        let inner_seen = Arc::clone(&seen);
        host.subscribe_changes(Box::new(move || {
            *inner_seen.lock().unwrap() = inner_host.fragment();
        }));

        host.navigate_to_fragment("#section-2");
        assert_eq!(*seen.lock().unwrap(), "#section-2");
    }

    // -- Clipboard --

    #[tokio::test]
    async fn clipboard_accept_stores_text() {
        let host = SimHost::new();
        host.write_text("payload").await.unwrap();
        assert_eq!(host.clipboard(), Some("payload".to_string()));
    }

    #[tokio::test]
    async fn clipboard_deny_rejects() {
        let host = SimHost::with_clipboard_mode(ClipboardMode::Deny);
        let err = host.write_text("payload").await.unwrap_err();
        assert!(matches!(err, HostError::Clipboard(_)));
        assert_eq!(host.clipboard(), None);
    }

    // -- Registration handles --

    #[test]
    fn cancel_removes_exactly_one_listener() {
        let host = SimHost::new();
        let first = host.subscribe_keys(Box::new(|_| KeyDisposition::Propagate));
        let _second = host.subscribe_keys(Box::new(|_| KeyDisposition::Propagate));
        assert_eq!(host.key_listener_count(), 2);

        first.cancel();
        assert_eq!(host.key_listener_count(), 1);
    }

    #[test]
    fn dropping_registration_keeps_listener() {
        let host = SimHost::new();
        let registration = host.subscribe_changes(Box::new(|| {}));
        drop(registration);
        assert_eq!(host.change_listener_count(), 1);
    }
}
