//! Session transcript engine for agent client protocol hosts.
//!
//! Invariant: only [`Session`] mutates the transcript, one event at a time.
//!
//! # Public API Overview
//! - Feed host events to [`Session::apply`]; each one either extends the transcript or is
//!   rejected as a whole.
//! - Inspect turns and segments through [`Session::transcript`] and the per-id lookups.
//! - Resolve permission requests with [`Session::resolve_permission`]; the chosen option reaches
//!   the injected [`ResponseSink`] exactly once.
//! - Read environment configuration with [`config::EnvConfig`].

pub mod config;
pub mod content;
pub mod error;
pub mod permission;
pub mod session;
pub mod tool_call;
pub mod transcript;

/// Protocol payloads re-exported for callers that only depend on the engine.
pub use acp_protocol::{
    ContentBlock, EmbeddedResource, HostEvent, PermissionOption, PermissionOptionKind,
    PermissionOutcome, PermissionResponse,
};

/// Content accumulation.
pub use crate::content::ContentBlocks;

/// Engine errors.
pub use crate::error::TranscriptError;

/// Permission records and correlation.
pub use crate::permission::{
    DetailPane, PermissionCorrelator, PermissionPrompt, PermissionRequestRecord, ResponseSink,
};

/// Event routing.
pub use crate::session::{EventOutcome, PendingPermission, Session, SessionOptions};

/// Tool-call lifecycle.
pub use crate::tool_call::{Disclosure, ToolCallRecord, ToolCallStatus, ToolKind};

/// Transcript structure.
pub use crate::transcript::{Segment, SegmentKind, SegmentRef, TranscriptStore, Turn};
