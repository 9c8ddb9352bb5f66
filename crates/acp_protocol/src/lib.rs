//! Minimal host-facing contract for rendering one agent session.
//!
//! This crate defines only the payload shapes that cross the boundary between
//! the host process and the transcript engine: content blocks, inbound session
//! events, permission options, and the single outbound permission response.
//! It excludes transcript grouping, tool-call lifecycle rules, and transport
//! concerns.

mod content;
mod event;
mod permission;
mod wire;

pub use content::{ContentBlock, EmbeddedResource};
pub use event::HostEvent;
pub use permission::{
    PermissionOption, PermissionOptionKind, PermissionOutcome, PermissionResponse,
    UnknownOptionKind,
};
pub use wire::{
    is_permission_response, parse_permission_response, WireError, RESPONSE_SCHEME,
};
