//! hostbridge — a thin boundary between an application core and
//! host-provided browser capabilities: keyboard input, clipboard write,
//! and URL-hash view-state persistence.
//!
//! The crate carries no state and no algorithmic core. It exposes five
//! stateless adapter operations on [`HostBridge`], each a pass-through
//! to a host facility reached through a narrow capability trait
//! ([`InputSource`], [`ClipboardService`], [`LocationService`]). A real
//! host environment implements the traits; [`host::sim::SimHost`] is an
//! in-memory implementation for tests and headless embedders.

pub mod bridge;
pub mod host;

pub use bridge::HostBridge;
pub use host::{
    ClipboardService, DiagnosticSink, HostError, InputSource, KeyDisposition, KeyEvent,
    LocationService, Registration, TracingSink,
};
