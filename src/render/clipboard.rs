//! Clipboard access for code block copy buttons.

use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use base64::Engine;
use thiserror::Error;
use tracing::warn;

/// How long a copy button shows its acknowledgement.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";

/// The environment refused a clipboard write.
#[derive(Debug, Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(#[from] std::io::Error);

/// A sink for copied text.
pub trait Clipboard {
    /// # Errors
    /// Returns [`ClipboardError`] when the write is denied or fails.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The terminal's clipboard: `pbcopy` on macOS, OSC 52 elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        #[cfg(target_os = "macos")]
        {
            if copy_to_pbcopy(text).is_ok() {
                return Ok(());
            }
        }
        copy_to_clipboard_osc52(text)?;
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// Clipboard held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    /// When set, every write fails.
    pub deny: bool,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "clipboard access denied",
            )));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Tracks which code block was copied last and for how long it says so.
#[derive(Debug, Default, Clone)]
pub struct CopyTracker {
    copied: Option<(String, Instant)>,
}

impl CopyTracker {
    pub const fn new() -> Self {
        Self { copied: None }
    }

    /// Copy `code`, starting the acknowledgement on success.
    ///
    /// Failures are logged and leave the previous state in place.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, code: &str, now: Instant) -> bool {
        match clipboard.write_text(code) {
            Ok(()) => {
                self.copied = Some((code.to_string(), now));
                crate::perf::log_event("render.copy", format!("{} chars", code.chars().count()));
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to copy code block");
                false
            }
        }
    }

    /// The code whose acknowledgement is still showing at `now`.
    pub fn acknowledged(&self, now: Instant) -> Option<&str> {
        self.copied
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < COPY_ACK_DURATION)
            .map(|(code, _)| code.as_str())
    }

    /// Button label for the block holding `code`.
    pub fn label(&self, code: &str, now: Instant) -> &'static str {
        if self.acknowledged(now) == Some(code) {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence_encodes_text() {
        let seq = osc52_sequence("hi");
        assert_eq!(seq, "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_copy_acknowledges_for_two_seconds() {
        let mut clipboard = MemoryClipboard::default();
        let mut tracker = CopyTracker::new();
        let start = Instant::now();
        assert!(tracker.copy(&mut clipboard, "let x = 1;", start));
        assert_eq!(clipboard.contents.as_deref(), Some("let x = 1;"));

        assert_eq!(tracker.label("let x = 1;", start + Duration::from_millis(1999)), COPIED_LABEL);
        assert_eq!(tracker.label("let x = 1;", start + COPY_ACK_DURATION), COPY_LABEL);
    }

    #[test]
    fn test_acknowledgement_is_per_code_block() {
        let mut clipboard = MemoryClipboard::default();
        let mut tracker = CopyTracker::new();
        let now = Instant::now();
        tracker.copy(&mut clipboard, "a", now);
        assert_eq!(tracker.label("b", now), COPY_LABEL);
    }

    #[test]
    fn test_denied_copy_shows_no_acknowledgement() {
        let mut clipboard = MemoryClipboard {
            deny: true,
            ..MemoryClipboard::default()
        };
        let mut tracker = CopyTracker::new();
        let now = Instant::now();
        assert!(!tracker.copy(&mut clipboard, "code", now));
        assert_eq!(tracker.acknowledged(now), None);
        assert_eq!(tracker.label("code", now), COPY_LABEL);
    }
}
