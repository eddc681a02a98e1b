//! Core terminal interpreter components.
//!
//! This module contains the stateful console logic:
//!
//! - **command**: the closed command registry and canned responses
//! - **session**: scrollback, input buffer, blink timer, submit pipeline
//!
//! # Architecture
//!
//! ```text
//! TerminalSession
//! ├── Vec<String>       (scrollback; last line = live prompt)
//! ├── String            (input buffer)
//! ├── CommandHistory    (ordered input/output pairs)
//! ├── CursorBlink       (visual timer, main-loop driven)
//! └── StdRng            (randomized figures in canned replies)
//! ```
//!
//! Dispatch flows `input → command::dispatch → Reply → scrollback append`,
//! with side effects surfaced to the shell as [`command::Effect`] values.

pub mod command;
pub mod session;
