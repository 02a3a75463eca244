use std::time::Instant;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::app_state::{App, SlotContent};
use crate::models::{NotificationKind, ToolbarButton};
use crate::tui::layout::centered_rect;
use crate::utils::{truncate_default, truncate_text};

const SPINNERS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TITLE_WIDTH: usize = 60;

fn kind_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Info => Color::Cyan,
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
    }
}

pub fn render_toolbar(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let mut spans: Vec<Span> = Vec::new();
    for button in ToolbarButton::ALL {
        let pressed = app.is_pressed(button, now);
        let disabled = app.is_loading && button.source().is_some();
        let style = if pressed {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        // a pressed button loses its padding, which reads as a shrink
        let label = if pressed {
            format!("[{}]{}", button.key(), button.label())
        } else {
            format!(" [{}] {} ", button.key(), button.label())
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    let toolbar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 🤖 AI News Dashboard ")
            .title_bottom(Line::from(" ?=help  q=quit ").right_aligned()),
    );
    frame.render_widget(toolbar, area);
}

pub fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (line, border) = match app.notification() {
        Some(SlotContent::Loading) => (
            Line::from(vec![
                Span::styled(
                    format!("{} ", SPINNERS[app.spinner % SPINNERS.len()]),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled("Updating content...", Style::default().fg(Color::Yellow)),
            ]),
            Color::Yellow,
        ),
        Some(SlotContent::Message { text, kind }) => (
            Line::from(Span::styled(
                text.as_str(),
                Style::default()
                    .fg(kind_color(*kind))
                    .add_modifier(Modifier::BOLD),
            )),
            kind_color(*kind),
        ),
        None => (Line::from(""), Color::DarkGray),
    };
    let status = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(status, area);
}

pub fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let Some(cards) = app.stats_cards.as_ref().filter(|c| !c.is_empty()) else {
        let empty = Paragraph::new("Loading stats...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" 📊 Stats "));
        frame.render_widget(empty, area);
        return;
    };

    let constraints: Vec<Constraint> = cards
        .iter()
        .map(|_| Constraint::Ratio(1, cards.len() as u32))
        .collect();
    let chunks = Layout::horizontal(constraints).split(area);

    for (i, (card, chunk)) in cards.iter().zip(chunks.iter()).enumerate() {
        let value_color = if i == 0 { Color::Cyan } else { Color::Green };
        let widget = Paragraph::new(vec![
            Line::from(Span::styled(
                card.value.to_string(),
                Style::default().fg(value_color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                card.label.as_str(),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(widget, *chunk);
    }
}

pub fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filter = Paragraph::new(format!("/{}", app.filter_query)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Filter articles ")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(filter, area);
}

pub fn render_articles(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.table.is_empty() {
        let placeholder = Paragraph::new(
            "No articles loaded. Pass --articles <FILE> or set [articles] path.",
        )
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" 📰 Articles "));
        frame.render_widget(placeholder, area);
        return;
    }

    let header = Row::new(vec!["Source", "Title", "Category", "Summary", "Date"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app
        .table
        .visible_indices()
        .into_iter()
        .filter_map(|i| app.table.rows().get(i))
        .map(|article| {
            let date = article.display_date().unwrap_or_default();
            let title_style = if article.link.is_some() {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(article.source.clone()).style(Style::default().fg(Color::Magenta)),
                Cell::from(truncate_text(&article.title, TITLE_WIDTH)).style(title_style),
                Cell::from(article.category.clone()),
                Cell::from(truncate_default(&article.summary)),
                Cell::from(date).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let title = format!(
        " 📰 Articles ({}/{}) ",
        app.table.visible_count(),
        app.table.len()
    );
    let mut block = Block::default().borders(Borders::ALL).title(title);
    if let Some(summary) = app.filter_summary_text() {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {} ", summary),
                Style::default().fg(Color::Cyan),
            ))
            .left_aligned(),
        );
    }
    block = block.title_bottom(
        Line::from(" Enter=open  c=copy  /=filter  e=export ").right_aligned(),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Percentage(35),
            Constraint::Length(14),
            Constraint::Fill(1),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▶ ");
    frame.render_stateful_widget(table, area, &mut app.table_state);
}

pub fn render_help_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);
    let numbered = if app.settings.numbered_shortcuts {
        "Ctrl+1..4    Update news / arxiv / youtube / all\n"
    } else {
        ""
    };
    let help_text = format!(
        "\
Updates:     u (All), n (News), x (arXiv), y (YouTube)
Shortcuts:   Ctrl+R (Update all)
{numbered}Stats:       s (Refresh now)
Articles:    ↑/↓ or k/j (Move), Enter (Open link), c (Copy)
Filter:      / (Type to filter), Esc (Clear filter)
Export:      e (Write ai-news-<date>.json)
Quit:        q (Exit), Esc (Close popup)"
    );
    let popup = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" ❓ Help (Press ? or Esc to close) ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        );
    frame.render_widget(popup, area);
}
