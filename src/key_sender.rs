//! Keystroke injection.
//!
//! [`KeyInjector`] is the seam between the typing loop and the OS. The real
//! implementation drives `enigo`; tests substitute a recorder.

use crate::error::{Result, TyperError};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::sync::Arc;
use tracing::trace;

/// A single synthesized key event as seen by the target application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// A literal character, typed through the layout-independent text path.
    Char(char),
    Enter,
    /// Alt held while Return is clicked; inserts a line break without
    /// submitting in chat-style inputs.
    AltEnter,
}

impl Keystroke {
    /// Maps one character of the payload to the keystroke that types it.
    pub fn for_char(c: char, use_alt_enter: bool) -> Self {
        match c {
            '\n' if use_alt_enter => Keystroke::AltEnter,
            '\n' => Keystroke::Enter,
            other => Keystroke::Char(other),
        }
    }
}

pub trait KeyInjector {
    fn send(&mut self, stroke: Keystroke) -> Result<()>;
}

/// Builds an injector on the thread that will use it.
pub type InjectorFactory = Arc<dyn Fn() -> Result<Box<dyn KeyInjector>> + Send + Sync>;

/// Factory for the OS-backed injector.
pub fn enigo_factory() -> InjectorFactory {
    Arc::new(|| Ok(Box::new(EnigoInjector::new()?) as Box<dyn KeyInjector>))
}

pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| TyperError::injection(format!("failed to connect to input system: {e}")))?;
        Ok(Self { enigo })
    }

    fn click(&mut self, key: Key, direction: Direction) -> Result<()> {
        self.enigo
            .key(key, direction)
            .map_err(|e| TyperError::injection(format!("{key:?} {direction:?}: {e}")))
    }
}

impl KeyInjector for EnigoInjector {
    fn send(&mut self, stroke: Keystroke) -> Result<()> {
        trace!(?stroke, "injecting");
        match stroke {
            Keystroke::Char(c) => {
                let mut buf = [0u8; 4];
                self.enigo
                    .text(c.encode_utf8(&mut buf))
                    .map_err(|e| TyperError::injection(format!("{c:?}: {e}")))
            }
            Keystroke::Enter => self.click(Key::Return, Direction::Click),
            Keystroke::AltEnter => {
                self.click(Key::Alt, Direction::Press)?;
                let result = self.click(Key::Return, Direction::Click);
                // Never leave Alt latched, even if Return failed.
                self.click(Key::Alt, Direction::Release)?;
                result
            }
        }
    }
}
