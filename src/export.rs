use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::models::ArticleRow;

#[derive(Debug, Serialize, PartialEq)]
pub struct ExportRecord {
    pub source: String,
    pub title: String,
    pub category: String,
    pub summary: String,
}

impl From<&ArticleRow> for ExportRecord {
    fn from(row: &ArticleRow) -> Self {
        Self {
            source: row.source.trim().to_string(),
            title: row.title.trim().to_string(),
            category: row.category.trim().to_string(),
            summary: row.summary.trim().to_string(),
        }
    }
}

pub fn generate_filename(date: NaiveDate) -> String {
    format!("ai-news-{}.json", date.format("%Y-%m-%d"))
}

pub fn articles_to_json(rows: &[ArticleRow]) -> Result<String> {
    let records: Vec<ExportRecord> = rows.iter().map(ExportRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Writes every row, hidden or not, to `ai-news-<today>.json` in `dir`.
pub fn export_articles(rows: &[ArticleRow], dir: &Path) -> Result<PathBuf> {
    export_articles_on(rows, dir, Utc::now().date_naive())
}

pub fn export_articles_on(rows: &[ArticleRow], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(generate_filename(date));
    let json = articles_to_json(rows)?;
    let mut file =
        File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(path)
}
