use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::utils::format_date;

/// Sources reachable through the numbered shortcuts, in key order (1..4).
pub const SHORTCUT_SOURCES: [&str; 4] = ["news", "arxiv", "youtube", "all"];

/// Summary counts returned by `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_articles: u64,
    /// Per-source counts in the order the backend sent them.
    #[serde(default, deserialize_with = "ordered_counts")]
    pub by_source: Vec<(String, u64)>,
}

fn ordered_counts<'de, D>(deserializer: D) -> Result<Vec<(String, u64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountsVisitor;

    impl<'de> Visitor<'de> for CountsVisitor {
        type Value = Vec<(String, u64)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of source name to article count")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut counts = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((source, count)) = map.next_entry::<String, u64>()? {
                counts.push((source, count));
            }
            Ok(counts)
        }
    }

    deserializer.deserialize_option(CountsVisitor)
}

/// Body of a successful `POST /update/{source}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated: Option<bool>,
}

/// Body of a failed request. FastAPI sends a string `detail`, or a list of
/// validation errors for 422s.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorReply {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorReply {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// One row of the article table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleRow {
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl ArticleRow {
    /// The date cell as rendered: formatted when parseable, raw otherwise.
    pub fn display_date(&self) -> Option<String> {
        self.date
            .as_deref()
            .map(|d| format_date(d).unwrap_or_else(|| d.to_string()))
    }

    /// All cell text of the row, as the filter sees it.
    pub fn searchable_text(&self) -> String {
        let mut text = format!(
            "{} {} {} {}",
            self.source, self.title, self.category, self.summary
        );
        if let Some(date) = self.display_date() {
            text.push(' ');
            text.push_str(&date);
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Default, Clone, Copy, PartialEq)]
pub enum InputMode {
    #[default]
    Normal,
    Filter,
}

/// Toolbar buttons, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    UpdateAll,
    UpdateNews,
    UpdateArxiv,
    UpdateYoutube,
    RefreshStats,
    Export,
}

impl ToolbarButton {
    pub const ALL: [ToolbarButton; 6] = [
        ToolbarButton::UpdateAll,
        ToolbarButton::UpdateNews,
        ToolbarButton::UpdateArxiv,
        ToolbarButton::UpdateYoutube,
        ToolbarButton::RefreshStats,
        ToolbarButton::Export,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolbarButton::UpdateAll => "Update all",
            ToolbarButton::UpdateNews => "News",
            ToolbarButton::UpdateArxiv => "arXiv",
            ToolbarButton::UpdateYoutube => "YouTube",
            ToolbarButton::RefreshStats => "Stats",
            ToolbarButton::Export => "Export",
        }
    }

    pub fn key(self) -> char {
        match self {
            ToolbarButton::UpdateAll => 'u',
            ToolbarButton::UpdateNews => 'n',
            ToolbarButton::UpdateArxiv => 'x',
            ToolbarButton::UpdateYoutube => 'y',
            ToolbarButton::RefreshStats => 's',
            ToolbarButton::Export => 'e',
        }
    }

    pub fn from_key(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.key() == c)
    }

    /// The update source this button triggers, if any.
    pub fn source(self) -> Option<&'static str> {
        match self {
            ToolbarButton::UpdateAll => Some("all"),
            ToolbarButton::UpdateNews => Some("news"),
            ToolbarButton::UpdateArxiv => Some("arxiv"),
            ToolbarButton::UpdateYoutube => Some("youtube"),
            ToolbarButton::RefreshStats | ToolbarButton::Export => None,
        }
    }
}
