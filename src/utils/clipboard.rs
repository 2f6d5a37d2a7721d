use crate::error::AnalyzerError;
use std::time::{Duration, Instant};
use tracing::debug;

pub const COPY_ACK_DURATION: Duration = Duration::from_millis(2000);

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), AnalyzerError>;
}

/// The OS clipboard, opened per copy.
#[derive(Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), AnalyzerError> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)?;
        debug!("copied {} chars to clipboard", text.len());
        Ok(())
    }
}

/// Copy button label, swapped to an acknowledgment for a while after a copy.
#[derive(Debug, Default, Clone)]
pub struct CopyFeedback {
    acknowledged_at: Option<Instant>,
}

impl CopyFeedback {
    pub const IDLE_LABEL: &'static str = "📋 복사";
    pub const ACK_LABEL: &'static str = "✔ 복사됨";

    pub fn acknowledge(&mut self, now: Instant) {
        self.acknowledged_at = Some(now);
    }

    pub fn is_acknowledged(&self, now: Instant) -> bool {
        self.remaining(now).is_some()
    }

    /// Time left before the label reverts, if it is currently swapped.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let at = self.acknowledged_at?;
        COPY_ACK_DURATION
            .checked_sub(now.saturating_duration_since(at))
            .filter(|left| !left.is_zero())
    }

    pub fn label(&self, now: Instant) -> &'static str {
        if self.is_acknowledged(now) {
            Self::ACK_LABEL
        } else {
            Self::IDLE_LABEL
        }
    }
}
