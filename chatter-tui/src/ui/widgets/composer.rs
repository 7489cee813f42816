use chatter_core::Composer;
use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme::Theme;

/// Bordered input box around a [`Composer`] with a char counter.
pub struct ComposerBox<'a> {
    composer: &'a Composer,
    title: &'a str,
    placeholder: &'a str,
    max_rows: u16,
    focused: bool,
}

impl<'a> ComposerBox<'a> {
    pub fn new(composer: &'a Composer, title: &'a str) -> Self {
        Self {
            composer,
            title,
            placeholder: "",
            max_rows: 5,
            focused: true,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn max_rows(mut self, rows: u16) -> Self {
        self.max_rows = rows.max(1);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Rows needed including borders.
    pub fn height(&self) -> u16 {
        let lines = self.composer.text().split('\n').count() as u16;
        lines.clamp(1, self.max_rows) + 2
    }

    /// Scroll needed to keep the cursor inside an inner area of `width` x
    /// `height`.
    pub fn scroll_for(&self, width: u16, height: u16) -> (u16, u16) {
        let (line, col) = self.composer.cursor_line_col();
        let row_scroll = (line as u16).saturating_sub(height.saturating_sub(1));
        let col_scroll = (col as u16).saturating_sub(width.saturating_sub(1));
        (row_scroll, col_scroll)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &dyn Theme) {
        let border_color = if self.focused {
            theme.accent()
        } else {
            theme.border()
        };

        let counter_color = if self.composer.len() >= self.composer.max_len() {
            theme.warning()
        } else {
            theme.foreground_dim()
        };

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_bottom(
                Line::from(Span::styled(
                    format!(" {}/{} ", self.composer.len(), self.composer.max_len()),
                    Style::default().fg(counter_color),
                ))
                .alignment(Alignment::Right),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.surface()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.composer.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    self.placeholder,
                    Style::default()
                        .fg(theme.foreground_dim())
                        .add_modifier(Modifier::ITALIC),
                )),
                inner,
            );
        } else {
            let lines: Vec<Line> = self
                .composer
                .text()
                .split('\n')
                .map(|line| Line::from(line.to_string()))
                .collect();
            let (row_scroll, col_scroll) = self.scroll_for(inner.width, inner.height);
            frame.render_widget(
                Paragraph::new(lines)
                    .style(Style::default().fg(theme.foreground()))
                    .scroll((row_scroll, col_scroll)),
                inner,
            );
        }

        if self.focused && inner.width > 0 && inner.height > 0 {
            let (line, col) = self.composer.cursor_line_col();
            let (row_scroll, col_scroll) = self.scroll_for(inner.width, inner.height);
            frame.set_cursor_position(Position::new(
                inner.x + (col as u16).saturating_sub(col_scroll),
                inner.y + (line as u16).saturating_sub(row_scroll),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_grows_with_lines() {
        let mut composer = Composer::message();
        assert_eq!(ComposerBox::new(&composer, "Message").height(), 3);

        composer.set_text("one\ntwo\nthree");
        assert_eq!(ComposerBox::new(&composer, "Message").height(), 5);

        composer.set_text("1\n2\n3\n4\n5\n6\n7");
        assert_eq!(ComposerBox::new(&composer, "Message").height(), 7);
        assert_eq!(
            ComposerBox::new(&composer, "Message").max_rows(3).height(),
            5
        );
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut composer = Composer::message();
        composer.set_text("abcdefghijklmnop");
        let widget = ComposerBox::new(&composer, "Message");

        assert_eq!(widget.scroll_for(10, 1), (0, 7));
        assert_eq!(widget.scroll_for(40, 1), (0, 0));
    }
}
