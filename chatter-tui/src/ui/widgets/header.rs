use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::theme::Theme;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(22),
                Constraint::Min(12),
                Constraint::Length(40),
            ])
            .split(area);

        let bar = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border()));

        let logo = Paragraph::new(Line::from(vec![
            Span::styled("💬 ", Style::default().fg(theme.accent())),
            Span::styled(
                "Chatter ",
                Style::default()
                    .fg(theme.foreground())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("v{}", VERSION),
                Style::default().fg(theme.foreground_dim()),
            ),
        ]))
        .block(bar.clone())
        .style(Style::default().bg(theme.background()));
        frame.render_widget(logo, chunks[0]);

        let badge = match app.screen() {
            Screen::Join => Line::default(),
            Screen::Chat => Self::connectivity_badge(app.sync.is_connected(), theme),
        };
        frame.render_widget(
            Paragraph::new(badge)
                .alignment(Alignment::Center)
                .block(bar.clone())
                .style(Style::default().bg(theme.background())),
            chunks[1],
        );

        let mut identity = Vec::new();
        if app.session.is_joined() {
            identity.push(Span::styled("You: ", Style::default().fg(theme.foreground_dim())));
            identity.push(Span::styled(
                app.session.nickname().to_string(),
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ));
            identity.push(Span::styled(" │ ", Style::default().fg(theme.border())));
        }
        identity.push(Span::styled(
            app.sync.backend_name().to_string(),
            Style::default().fg(theme.foreground_dim()),
        ));
        identity.push(Span::styled(" │ ", Style::default().fg(theme.border())));
        identity.push(Span::styled(
            chrono::Local::now().format("%H:%M").to_string(),
            Style::default().fg(theme.foreground_dim()),
        ));

        frame.render_widget(
            Paragraph::new(Line::from(identity))
                .alignment(Alignment::Right)
                .block(bar.clone())
                .style(Style::default().bg(theme.background())),
            chunks[2],
        );
    }

    pub fn connectivity_badge(connected: bool, theme: &dyn Theme) -> Line<'static> {
        if connected {
            Line::from(Span::styled(
                "● Live",
                Style::default()
                    .fg(theme.success())
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                "⚠ Offline",
                Style::default()
                    .fg(theme.warning())
                    .add_modifier(Modifier::BOLD),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::PaletteTheme;

    #[test]
    fn test_connectivity_badge() {
        let theme = PaletteTheme::nord();
        assert_eq!(Header::connectivity_badge(true, &theme).to_string(), "● Live");
        assert_eq!(
            Header::connectivity_badge(false, &theme).to_string(),
            "⚠ Offline"
        );
    }
}
