//! Small formatting helpers shared by the dashboard views.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::app_state::App;
use crate::config::ClipboardFailure;
use crate::models::NotificationKind;

pub const DEFAULT_TRUNCATE_LEN: usize = 100;
pub const ELLIPSIS: &str = "...";

const DISPLAY_FORMAT: &str = "%-d %b %Y, %H:%M";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Renders an article timestamp as `15 Jan 2024, 10:30`.
///
/// Accepts RFC 3339, naive ISO date-times and plain `YYYY-MM-DD` dates. Zoned
/// inputs are shown in their own offset, so the output does not depend on the
/// machine's timezone.
pub fn format_date(input: &str) -> Option<String> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.format(DISPLAY_FORMAT).to_string());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(dt.format(DISPLAY_FORMAT).to_string());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
}

/// Cuts `text` to `max_len` characters plus an ellipsis. Text of exactly
/// `max_len` characters is returned unchanged.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

pub fn truncate_default(text: &str) -> String {
    truncate_text(text, DEFAULT_TRUNCATE_LEN)
}

/// Writes `text` to the system clipboard and reports through `app`.
pub fn copy_to_clipboard(app: &mut App, text: &str) -> bool {
    let result = match app.clipboard.as_mut() {
        Some(clip) => clip.set_text(text.to_string()).map_err(|e| e.to_string()),
        None => Err("clipboard unavailable".to_string()),
    };
    match result {
        Ok(()) => {
            app.show_notification("📋 Copied to clipboard", NotificationKind::Success);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "clipboard write failed");
            if app.settings.clipboard_failure == ClipboardFailure::Notify {
                app.show_notification(
                    format!("❌ Could not copy to clipboard: {}", e),
                    NotificationKind::Error,
                );
            }
            false
        }
    }
}
