use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Screen};
use crate::events::{Action, ClickableRegion};

pub struct Footer;

impl Footer {
    /// Mouse-clickable buttons shown on the chat screen.
    pub fn buttons(screen: Screen) -> Vec<(&'static str, Action)> {
        match screen {
            Screen::Join => Vec::new(),
            Screen::Chat => vec![
                ("Switch User", Action::SwitchUser),
                ("Clear Chat", Action::ClearChat),
            ],
        }
    }

    fn content_row(area: Rect) -> Rect {
        Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height))
    }

    /// Where each button lands inside `area`, matching `render`.
    pub fn button_regions(area: Rect, screen: Screen) -> Vec<ClickableRegion> {
        let row = Self::content_row(area);
        let mut x = row.x + 1;

        Self::buttons(screen)
            .into_iter()
            .map(|(label, action)| {
                let width = label.chars().count() as u16 + 4;
                let region = ClickableRegion {
                    area: Rect::new(x, row.y, width, 1),
                    action,
                    label: label.to_string(),
                };
                x += width + 1;
                region
            })
            .collect()
    }

    fn keybinds(screen: Screen) -> &'static [(&'static str, &'static str)] {
        match screen {
            Screen::Join => &[
                ("Enter", "Join"),
                ("Ctrl+T", "Theme"),
                ("F1", "Help"),
                ("Esc", "Quit"),
            ],
            Screen::Chat => &[
                ("Enter", "Send"),
                ("Shift+Enter", "Newline"),
                ("PgUp/PgDn", "Scroll"),
                ("F1", "Help"),
            ],
        }
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let screen = app.screen();

        frame.render_widget(
            Paragraph::new("").style(Style::default().bg(theme.surface())),
            area,
        );

        let row = Self::content_row(area);
        let mut spans = vec![Span::raw(" ")];

        for (label, _) in Self::buttons(screen) {
            spans.push(Span::styled(
                format!("[ {label} ]"),
                Style::default()
                    .fg(theme.accent())
                    .bg(theme.selection())
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
        }

        for (key, desc) in Self::keybinds(screen) {
            // stands in for a disabled send button
            let dimmed =
                screen == Screen::Chat && *key == "Enter" && !app.message_input.can_submit();
            let key_style = if dimmed {
                Style::default().fg(theme.foreground_dim())
            } else {
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD)
            };
            spans.push(Span::styled(format!(" {key}"), key_style));
            spans.push(Span::styled(
                format!(":{desc} "),
                Style::default().fg(theme.foreground_dim()),
            ));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.surface())),
            row,
        );

        let status = app.status_message.as_deref().unwrap_or("Ready");
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{status} "),
                Style::default().fg(theme.foreground_dim()),
            ))
            .alignment(Alignment::Right),
            row,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_screen_has_no_buttons() {
        let area = Rect::new(0, 21, 80, 3);
        assert!(Footer::button_regions(area, Screen::Join).is_empty());
    }

    #[test]
    fn test_chat_button_regions() {
        let area = Rect::new(0, 21, 80, 3);
        let regions = Footer::button_regions(area, Screen::Chat);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].action, Action::SwitchUser);
        assert_eq!(regions[0].area, Rect::new(1, 22, 15, 1));
        assert_eq!(regions[1].action, Action::ClearChat);
        assert_eq!(regions[1].area.x, 17);
        assert_eq!(regions[1].area.width, 14);
    }
}
