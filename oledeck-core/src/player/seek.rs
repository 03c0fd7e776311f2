//! Seek label and progress ratio

use core::fmt::Write;

use heapless::String;

/// "mm:ss / mm:ss" plus the fraction of the track played
#[derive(Debug, Clone, PartialEq)]
pub struct SeekDisplay {
    label: String<16>,
    ratio: f32,
}

impl SeekDisplay {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Progress in [0, 1]
    pub fn ratio(&self) -> f32 {
        self.ratio
    }
}

impl Default for SeekDisplay {
    fn default() -> Self {
        format_seek(None, None)
    }
}

/// Format a position (milliseconds) against a duration (seconds)
///
/// A missing, zero or non-finite duration shows "00:00 / 00:00" with an
/// empty bar. Minutes wrap at 60, so tracks longer than an hour show the
/// minutes within the hour.
pub fn format_seek(seek_ms: Option<u64>, duration_s: Option<f64>) -> SeekDisplay {
    let duration_ms = duration_s
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d * 1000.0);

    let Some(duration_ms) = duration_ms else {
        let mut label = String::new();
        let _ = label.push_str("00:00 / 00:00");
        return SeekDisplay { label, ratio: 0.0 };
    };

    let seek_ms = seek_ms.unwrap_or(0);
    let ratio = (seek_ms as f64 / duration_ms).clamp(0.0, 1.0) as f32;

    let mut label = String::new();
    push_clock(&mut label, seek_ms / 1000);
    let _ = label.push_str(" / ");
    push_clock(&mut label, (duration_ms / 1000.0) as u64);

    SeekDisplay { label, ratio }
}

fn push_clock(out: &mut String<16>, seconds: u64) {
    let _ = write!(out, "{:02}:{:02}", (seconds / 60) % 60, seconds % 60);
}
