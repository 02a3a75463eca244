use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::ArticleRow;

/// Reads the article table source: a JSON array of rows.
pub fn load_articles(path: &Path) -> Result<Vec<ArticleRow>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read articles from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid article list in {}", path.display()))
}

/// Article rows plus their visibility. Filtering hides rows, it never drops them.
#[derive(Debug, Default, Clone)]
pub struct ArticleTable {
    rows: Vec<ArticleRow>,
    hidden: Vec<bool>,
}

impl ArticleTable {
    pub fn new(rows: Vec<ArticleRow>) -> Self {
        let hidden = vec![false; rows.len()];
        Self { rows, hidden }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ArticleRow] {
        &self.rows
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.hidden.get(index).is_some_and(|h| !h)
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        (0..self.rows.len()).filter(|&i| self.is_visible(i)).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.hidden.iter().filter(|h| !**h).count()
    }

    /// Case-insensitive substring match over each row's text. Returns the
    /// number of rows left visible.
    pub fn apply_filter(&mut self, term: &str) -> usize {
        let needle = term.to_lowercase();
        for (row, hidden) in self.rows.iter().zip(self.hidden.iter_mut()) {
            *hidden = !row.searchable_text().to_lowercase().contains(&needle);
        }
        self.visible_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source: &str, title: &str, category: &str, summary: &str) -> ArticleRow {
        ArticleRow {
            source: source.into(),
            title: title.into(),
            category: category.into(),
            summary: summary.into(),
            link: None,
            date: None,
        }
    }

    fn table() -> ArticleTable {
        ArticleTable::new(vec![
            row("arXiv", "Sparse attention at scale", "Research", "A new kernel"),
            row("TheVerge", "OpenAI ships a phone", "Industry", "Hardware news"),
            row("YouTube", "Attention explained", "Education", "Video walkthrough"),
        ])
    }

    #[test]
    fn test_empty_term_keeps_everything() {
        let mut t = table();
        assert_eq!(t.apply_filter(""), 3);
        assert_eq!(t.visible_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_spans_cells() {
        let mut t = table();
        assert_eq!(t.apply_filter("ATTENTION"), 2);
        assert_eq!(t.visible_indices(), vec![0, 2]);
        assert_eq!(t.len(), 3);

        assert_eq!(t.apply_filter("industry"), 1);
        assert!(t.is_visible(1));
        assert!(!t.is_visible(0));
    }

    #[test]
    fn test_filter_without_matches_hides_all() {
        let mut t = table();
        assert_eq!(t.apply_filter("quantum"), 0);
        assert!(t.visible_indices().is_empty());
        assert!(!t.is_visible(99));
    }

    #[test]
    fn test_filter_matches_displayed_date() {
        let mut dated = row("arXiv", "Sparse attention", "Research", "Kernel");
        dated.date = Some("2024-01-15T10:30:00Z".into());
        let mut raw = row("YouTube", "Agents", "Education", "Talk");
        raw.date = Some("last week".into());
        let mut t = ArticleTable::new(vec![dated, raw]);

        assert_eq!(t.apply_filter("15 Jan 2024, 10:30"), 1);
        assert!(t.is_visible(0));
        assert_eq!(t.apply_filter("jan 2024"), 1);
        assert_eq!(t.apply_filter("2024-01-15T"), 0);
        // unparseable dates are matched as shown, i.e. raw
        assert_eq!(t.apply_filter("LAST WEEK"), 1);
        assert!(t.is_visible(1));
    }

    #[test]
    fn test_load_articles_with_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        fs::write(
            &path,
            r#"[
                {"source": "arXiv", "title": "T1", "category": "C1", "summary": "S1",
                 "link": "https://arxiv.org/abs/1", "date": "2024-01-15"},
                {"source": "YouTube", "title": "T2"}
            ]"#,
        )
        .unwrap();
        let rows = load_articles(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].link.as_deref(), Some("https://arxiv.org/abs/1"));
        assert_eq!(rows[1].category, "");
        assert_eq!(rows[1].link, None);
    }

    #[test]
    fn test_load_articles_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_articles(&path).is_err());
    }
}
