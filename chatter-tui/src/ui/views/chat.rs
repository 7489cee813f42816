use chatter_core::{render_messages, ChatView, RenderedMessage};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::Theme;
use crate::ui::utils::wrap_text;
use crate::ui::widgets::ComposerBox;

pub struct ChatScreen;

impl ChatScreen {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();

        let composer = ComposerBox::new(&app.message_input, "Message")
            .placeholder("Type a message...")
            .focused(app.accepts_typing());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(composer.height())])
            .split(area);

        Self::render_list(frame, chunks[0], app, theme);
        composer.render(frame, chunks[1], theme);
    }

    fn render_list(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
        let view = render_messages(app.sync.messages(), app.session.nickname());

        let title = match &view {
            ChatView::Empty => " Messages ".to_string(),
            ChatView::Messages(messages) => format!(" Messages ({}) ", messages.len()),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border()))
            .style(Style::default().bg(theme.background()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if view.is_empty() {
            app.chat_scroll.set_max(0);
            Self::render_placeholder(frame, inner, theme);
            return;
        }

        let lines = message_lines(&view, inner.width, theme);
        let max_scroll = lines.len().saturating_sub(inner.height as usize);
        app.chat_scroll.set_max(max_scroll);
        let top = max_scroll - app.chat_scroll.offset().min(max_scroll);

        frame.render_widget(
            Paragraph::new(lines).scroll((top.min(u16::MAX as usize) as u16, 0)),
            inner,
        );

        if app.chat_scroll.offset() > 0 && inner.height > 0 {
            let hint = Paragraph::new(Span::styled(
                " ↓ newer messages (Ctrl+End) ",
                Style::default()
                    .fg(theme.background())
                    .bg(theme.info()),
            ))
            .alignment(Alignment::Center);
            let hint_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
            frame.render_widget(hint, hint_area);
        }
    }

    fn render_placeholder(frame: &mut Frame, area: Rect, theme: &dyn Theme) {
        let top = area.height.saturating_sub(2) / 2;
        let placeholder = Paragraph::new(vec![
            Line::from(Span::styled(
                "No messages yet",
                Style::default()
                    .fg(theme.foreground())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Start the conversation!",
                Style::default().fg(theme.foreground_dim()),
            )),
        ])
        .alignment(Alignment::Center);
        let area = Rect::new(area.x, area.y + top, area.width, area.height - top);
        frame.render_widget(placeholder, area);
    }
}

/// Lay the list out as bubbles: own messages on the right, everyone else on
/// the left under their name.
pub fn message_lines(view: &ChatView, width: u16, theme: &dyn Theme) -> Vec<Line<'static>> {
    let ChatView::Messages(messages) = view else {
        return Vec::new();
    };

    // two columns of padding inside each bubble
    let bubble_text_width = ((width as usize) * 7 / 10).saturating_sub(2).max(8);
    let mut lines = Vec::new();

    for message in messages {
        push_bubble(&mut lines, message, bubble_text_width, theme);
        lines.push(Line::default());
    }
    lines.pop();

    lines
}

fn push_bubble(
    lines: &mut Vec<Line<'static>>,
    message: &RenderedMessage,
    text_width: usize,
    theme: &dyn Theme,
) {
    let (alignment, bubble) = if message.is_own() {
        (Alignment::Right, theme.own_bubble())
    } else {
        (Alignment::Left, theme.other_bubble())
    };

    if let Some(author) = &message.author {
        lines.push(
            Line::from(Span::styled(
                author.clone(),
                Style::default()
                    .fg(theme.accent_secondary())
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(alignment),
        );
    }

    let wrapped = wrap_text(&message.text, text_width);
    let bubble_width = wrapped.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    for text in wrapped {
        let padding = bubble_width - text.chars().count();
        lines.push(
            Line::from(Span::styled(
                format!(" {}{} ", text, " ".repeat(padding)),
                Style::default().fg(theme.foreground()).bg(bubble),
            ))
            .alignment(alignment),
        );
    }

    lines.push(
        Line::from(Span::styled(
            message.time.clone(),
            Style::default().fg(theme.foreground_dim()),
        ))
        .alignment(alignment),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::PaletteTheme;
    use chatter_core::Ownership;

    fn rendered(own: bool, text: &str) -> RenderedMessage {
        RenderedMessage {
            id: "k".to_string(),
            ownership: if own { Ownership::Own } else { Ownership::Other },
            author: if own { None } else { Some("bob".to_string()) },
            text: text.to_string(),
            time: "09:05 AM".to_string(),
        }
    }

    #[test]
    fn test_empty_view_has_no_lines() {
        let theme = PaletteTheme::tokyo_night();
        assert!(message_lines(&ChatView::Empty, 80, &theme).is_empty());
    }

    #[test]
    fn test_other_message_shows_author_left() {
        let theme = PaletteTheme::tokyo_night();
        let view = ChatView::Messages(vec![rendered(false, "hi there")]);
        let lines = message_lines(&view, 80, &theme);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].to_string(), "bob");
        assert_eq!(lines[0].alignment, Some(Alignment::Left));
        assert_eq!(lines[1].to_string(), " hi there ");
        assert_eq!(lines[2].to_string(), "09:05 AM");
    }

    #[test]
    fn test_own_message_right_without_author() {
        let theme = PaletteTheme::tokyo_night();
        let view = ChatView::Messages(vec![rendered(true, "mine")]);
        let lines = message_lines(&view, 80, &theme);

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.alignment == Some(Alignment::Right)));
        assert!(!lines.iter().any(|l| l.to_string().contains("bob")));
    }

    #[test]
    fn test_multiline_bubble_is_padded() {
        let theme = PaletteTheme::tokyo_night();
        let view = ChatView::Messages(vec![rendered(true, "a\nlonger")]);
        let lines = message_lines(&view, 80, &theme);

        assert_eq!(lines[0].to_string(), " a      ");
        assert_eq!(lines[1].to_string(), " longer ");
    }

    #[test]
    fn test_messages_separated_by_blank_line() {
        let theme = PaletteTheme::tokyo_night();
        let view = ChatView::Messages(vec![rendered(false, "one"), rendered(true, "two")]);
        let lines = message_lines(&view, 80, &theme);

        // author, text, time, blank, text, time
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3].to_string(), "");
    }
}
