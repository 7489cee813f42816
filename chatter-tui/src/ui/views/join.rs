use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::utils::centered_rect;
use crate::ui::widgets::ComposerBox;

pub struct JoinScreen;

impl JoinScreen {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let card = centered_rect(56, 13, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .style(Style::default().bg(theme.surface()));
        let inner = block.inner(card);
        frame.render_widget(block, card);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Welcome to Chatter",
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            chunks[0],
        );

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Choose your display name to start chatting",
                Style::default().fg(theme.foreground()),
            ))
            .alignment(Alignment::Center),
            chunks[1],
        );

        ComposerBox::new(&app.nickname_input, "Nickname")
            .placeholder("Enter your nickname")
            .max_rows(1)
            .focused(app.accepts_typing())
            .render(frame, chunks[3], theme);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "You can simulate multiple users by switching your nickname later",
                Style::default()
                    .fg(theme.foreground_dim())
                    .add_modifier(Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
            chunks[4],
        );
    }
}
