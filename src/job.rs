//! The text payload and the pacing rules used to type it.

use crate::error::{Result, TyperError};
use std::fs;
use std::io;
use std::time::Duration;

/// A validated, immutable description of what to type and how fast.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingJob {
    text: String,
    min_delay: f64,
    max_delay: f64,
    use_alt_enter: bool,
}

impl TypingJob {
    /// Builds a job, rejecting delay bounds that are negative, non-finite or
    /// inverted.
    pub fn new(
        text: impl Into<String>,
        min_delay: f64,
        max_delay: f64,
        use_alt_enter: bool,
    ) -> Result<Self> {
        validate_delays(min_delay, max_delay)?;
        Ok(Self {
            text: text.into(),
            min_delay,
            max_delay,
            use_alt_enter,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `(min, max)` pause after each keystroke, in seconds.
    pub fn delay_bounds(&self) -> (f64, f64) {
        (self.min_delay, self.max_delay)
    }

    pub fn use_alt_enter(&self) -> bool {
        self.use_alt_enter
    }
}

/// Longest pause allowed between two keystrokes, in seconds.
pub const MAX_KEYSTROKE_DELAY_SECS: f64 = 60.0;

/// Longest wait allowed before typing starts, in seconds.
pub const MAX_START_DELAY_SECS: f64 = 86_400.0;

pub fn validate_delays(min_delay: f64, max_delay: f64) -> Result<()> {
    if !min_delay.is_finite() || !max_delay.is_finite() {
        return Err(TyperError::invalid_delay("Delays must be finite numbers"));
    }
    if min_delay < 0.0 || max_delay < 0.0 {
        return Err(TyperError::invalid_delay("Delays must be positive"));
    }
    if max_delay > MAX_KEYSTROKE_DELAY_SECS {
        return Err(TyperError::invalid_delay(format!(
            "Delays must not exceed {MAX_KEYSTROKE_DELAY_SECS} seconds"
        )));
    }
    if min_delay > max_delay {
        return Err(TyperError::invalid_delay(
            "min-delay must be less than or equal to max-delay",
        ));
    }
    Ok(())
}

/// Validates a start delay given in seconds and converts it.
pub fn start_delay(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TyperError::invalid_delay(format!(
            "Start delay must be a non-negative number of seconds, got {seconds}"
        )));
    }
    if seconds > MAX_START_DELAY_SECS {
        return Err(TyperError::invalid_delay(format!(
            "Start delay must not exceed {MAX_START_DELAY_SECS} seconds, got {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| TyperError::invalid_delay(format!("Start delay {seconds}: {e}")))
}

/// Reads the text payload from a UTF-8 file.
///
/// Windows line endings are folded to `\n` so every line break types as one
/// newline keystroke.
pub fn load_text(path: &str) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TyperError::input_not_found(path),
        _ => TyperError::input_read(path, e.to_string()),
    })?;
    Ok(normalize_newlines(&content))
}

fn normalize_newlines(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n")
    } else {
        text.to_string()
    }
}
