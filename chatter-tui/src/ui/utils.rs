use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Word-wrap `text` to at most `width` chars per line. Explicit newlines are
/// kept and words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in raw_line.split(' ') {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }

            let mut chars = word.chars().peekable();
            while chars.peek().is_some() {
                if current_len == width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let take = width - current_len;
                for c in chars.by_ref().take(take) {
                    current.push(c);
                    current_len += 1;
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
