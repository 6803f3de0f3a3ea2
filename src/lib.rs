//! # Auto Typer
//!
//! A command-line tool that types a text payload into the focused window the
//! way a person would, one character at a time with a small random pause
//! between keystrokes.
//!
//! ## Features
//!
//! - Text from the command line or from a UTF-8 file
//! - Start after a fixed delay, or on a global hotkey
//! - Newlines sent as Alt+Enter (default) or plain Enter
//! - Cancel key (ESC by default) stops hotkey mode cleanly
//! - JSON settings file support
//!
//! ## Example
//!
//! ```no_run
//! use auto_typer::{Typist, TypingJob};
//! use std::time::Duration;
//!
//! let job = TypingJob::new("Hello,\nworld!", 0.02, 0.05, true).unwrap();
//! let typist = Typist::with_enigo(job);
//! typist.start_after_delay(Duration::from_secs(3)).unwrap();
//! ```
//!
//! ## Configuration
//!
//! Typing settings can be provided via JSON files:
//!
//! ```json
//! {
//!   "min_delay": 0.03,
//!   "max_delay": 0.12,
//!   "use_alt_enter": false,
//!   "cancel_key": "escape"
//! }
//! ```

pub mod config;
pub mod error;
pub mod global_hotkey;
pub mod job;
pub mod key_sender;
pub mod typist;

pub use config::Config;
pub use error::{Result, TyperError};
pub use global_hotkey::{HotkeyAction, HotkeyManager};
pub use job::TypingJob;
pub use key_sender::{EnigoInjector, InjectorFactory, KeyInjector, Keystroke};
pub use typist::{CancellationFlag, EmitReport, Typist};
