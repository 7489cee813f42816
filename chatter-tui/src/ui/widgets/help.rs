use ratatui::{
    layout::{Alignment, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
    Frame,
};

use crate::theme::Theme;
use crate::ui::utils::centered_rect;

const WIDTH: u16 = 64;

type Section = (&'static str, &'static [(&'static str, &'static str)]);

const SECTIONS: &[Section] = &[
    (
        "Join",
        &[
            ("Enter", "Join with the typed nickname"),
            ("Esc", "Quit"),
        ],
    ),
    (
        "Chat",
        &[
            ("Enter", "Send message"),
            ("Shift/Alt+Enter", "New line (also Ctrl+J)"),
            ("Ctrl+S / F2", "Switch user"),
            ("Ctrl+L / F3", "Clear chat for everyone"),
            ("PgUp / PgDn", "Scroll messages"),
            ("Ctrl+↑ / Ctrl+↓", "Scroll one line"),
            ("Ctrl+End / Esc", "Jump to newest"),
        ],
    ),
    (
        "Editing",
        &[
            ("← / →", "Move cursor"),
            ("Home / Ctrl+A", "Start of input"),
            ("End / Ctrl+E", "End of input"),
            ("Ctrl+U", "Clear input"),
        ],
    ),
    (
        "General",
        &[
            ("Ctrl+T", "Cycle theme"),
            ("F1", "Show/hide help"),
            ("Ctrl+C / Ctrl+Q", "Quit"),
        ],
    ),
];

/// Keyboard reference shown over everything else on F1.
pub struct HelpModal;

impl HelpModal {
    pub fn line_count() -> usize {
        let entries: usize = SECTIONS.iter().map(|(_, keys)| keys.len() + 1).sum();
        entries + SECTIONS.len().saturating_sub(1)
    }

    pub fn lines(theme: &dyn Theme) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(theme.accent_secondary())
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let key_style = Style::default()
            .fg(theme.accent())
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(theme.foreground());

        let mut lines = Vec::with_capacity(Self::line_count());
        for (i, (title, keys)) in SECTIONS.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(Line::styled(format!(" {title}"), heading));
            for (key, desc) in keys.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!("   {key:<18}"), key_style),
                    Span::styled(*desc, desc_style),
                ]));
            }
        }
        lines
    }

    pub fn area(screen: Rect) -> Rect {
        let height = (Self::line_count() as u16 + 2).min(screen.height.saturating_sub(2));
        centered_rect(WIDTH, height, screen)
    }

    /// Largest useful scroll offset for `screen`.
    pub fn max_scroll(screen: Rect) -> usize {
        let rows = Self::area(screen).height.saturating_sub(2) as usize;
        Self::line_count().saturating_sub(rows)
    }

    pub fn render(frame: &mut Frame, screen: Rect, scroll: usize, theme: &dyn Theme) {
        let area = Self::area(screen);
        let max_scroll = Self::max_scroll(screen);
        let scroll = scroll.min(max_scroll);

        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_alignment(Alignment::Center)
            .title_bottom(
                Line::styled(
                    " Esc close · j/k scroll ",
                    Style::default().fg(theme.foreground_dim()),
                )
                .alignment(Alignment::Center),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.accent()))
            .style(Style::default().bg(theme.surface()));

        frame.render_widget(
            Paragraph::new(Self::lines(theme))
                .block(block)
                .scroll((scroll as u16, 0)),
            area,
        );

        if max_scroll > 0 {
            let mut state = ScrollbarState::new(max_scroll + 1).position(scroll);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .end_symbol(None),
                area.inner(Margin::new(0, 1)),
                &mut state,
            );
        }
    }
}
