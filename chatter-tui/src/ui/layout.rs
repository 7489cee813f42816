use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::app::{App, Screen};
use crate::ui::views::{ChatScreen, JoinScreen};
use crate::ui::widgets::{Footer, Header, HelpModal};

pub struct MainLayout;

impl MainLayout {
    /// Header, content and footer rows.
    pub fn areas(size: Rect) -> [Rect; 3] {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .areas(size)
    }

    pub fn render(frame: &mut Frame, app: &App) {
        let theme = app.current_theme();
        let size = frame.area();

        frame.render_widget(
            Block::default().style(
                Style::default()
                    .bg(theme.background())
                    .fg(theme.foreground()),
            ),
            size,
        );

        let [header, content, footer] = Self::areas(size);

        Header::render(frame, header, app);

        let content_area = content.inner(Margin::new(1, 0));
        match app.screen() {
            Screen::Join => JoinScreen::render(frame, content_area, app),
            Screen::Chat => ChatScreen::render(frame, content_area, app),
        }

        Footer::render(frame, footer, app);

        app.toast_manager.render(frame, size, theme);

        if let Some(ref dialog) = app.dialog_state.dialog {
            dialog.render(frame, size, theme);
        }

        if app.show_help_modal {
            HelpModal::render(frame, size, app.help_modal_scroll, theme);
        }
    }
}
