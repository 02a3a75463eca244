use ratatui::prelude::*;

pub struct UiLayout {
    pub toolbar: Rect,
    pub status: Rect,
    pub stats: Rect,
    pub filter_bar: Rect,
    pub articles: Rect,
}

pub fn create_layout(area: Rect, show_filter: bool) -> UiLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // toolbar
            Constraint::Length(3), // notification slot
            Constraint::Length(5), // stat cards
            Constraint::Length(if show_filter { 3 } else { 0 }),
            Constraint::Min(8), // article table
        ])
        .split(area);

    UiLayout {
        toolbar: chunks[0],
        status: chunks[1],
        stats: chunks[2],
        filter_bar: chunks[3],
        articles: chunks[4],
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
