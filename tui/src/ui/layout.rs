use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Computes the main layout regions.
///
/// # Returns
/// (header, body, logs)
pub fn vertical(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(8),
        ])
        .split(area);

    (chunks[0], chunks[1], chunks[2])
}

/// Splits the header into (status, progress).
pub fn header(area: Rect) -> (Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    (rows[0], rows[1])
}

/// Splits the body into (tabs, chart, controls).
pub fn body(area: Rect) -> (Rect, Rect, Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(9)])
        .split(cols[1]);

    (cols[0], right[0], right[1])
}

/// Inner width of the loss chart panel for a terminal of size `area`.
pub fn chart_width(area: Rect) -> u16 {
    let (_, body_area, _) = vertical(area);
    let (_, chart_area, _) = body(body_area);
    chart_area.width.saturating_sub(2)
}

/// Splits the tab panel into (tab bar, content).
pub fn tabs(area: Rect) -> (Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    (rows[0], rows[1])
}

/// Evenly divides `area` into a `cols x rows` grid, row-major.
pub fn grid(area: Rect, cols: u32, rows: u32) -> Vec<Rect> {
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows); rows as usize])
        .split(area);

    row_areas
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, cols); cols as usize])
                .split(*row)
                .to_vec()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_width_follows_terminal() {
        assert_eq!(chart_width(Rect::new(0, 0, 100, 40)), 43);
        assert!(chart_width(Rect::new(0, 0, 200, 40)) > 43);
        assert_eq!(chart_width(Rect::new(0, 0, 0, 0)), 0);
    }
}
