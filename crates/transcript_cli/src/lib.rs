//! Headless front end for the session transcript engine.
//!
//! Host events arrive as JSON lines (`{"event": ...}`) from a replay file, the
//! scripted demo host, or stdin. User commands arrive as `/`-prefixed lines on
//! stdin. Every input is funneled through [`runtime::TranscriptController`], which
//! applies them to [`app::App`] one at a time.
//!
//! Output contract:
//! - stdout: one `response:<toolCallId>/<optionId>` line per resolved permission request.
//! - stderr: the rendered transcript and tracing logs.

pub mod app;
pub mod commands;
pub mod logging;
pub mod runtime;
pub mod view;
