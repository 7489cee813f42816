use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogButton {
    Confirm,
    Cancel,
}

impl DialogButton {
    pub fn other(&self) -> Self {
        match self {
            DialogButton::Confirm => DialogButton::Cancel,
            DialogButton::Cancel => DialogButton::Confirm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTone {
    Info,
    Warning,
    Danger,
}

impl DialogTone {
    pub fn icon(&self) -> &'static str {
        match self {
            DialogTone::Info => "ℹ",
            DialogTone::Warning | DialogTone::Danger => "⚠",
        }
    }
}

/// What the app should do once the dialog is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogIntent {
    Acknowledge,
    ClearChat,
}

/// A blocking notice. Alerts have a single OK button, confirmations a
/// cancel/confirm pair with cancel preselected.
#[derive(Debug, Clone)]
pub struct Dialog {
    title: String,
    message: String,
    tone: DialogTone,
    intent: DialogIntent,
    selected: DialogButton,
    confirm_label: String,
    cancel_label: Option<String>,
}

impl Dialog {
    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            tone: DialogTone::Warning,
            intent: DialogIntent::Acknowledge,
            selected: DialogButton::Confirm,
            confirm_label: "OK".to_string(),
            cancel_label: None,
        }
    }

    pub fn confirm(
        title: impl Into<String>,
        message: impl Into<String>,
        intent: DialogIntent,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            tone: DialogTone::Danger,
            intent,
            selected: DialogButton::Cancel,
            confirm_label: "Confirm".to_string(),
            cancel_label: Some("Cancel".to_string()),
        }
    }

    pub fn clear_chat() -> Self {
        Self::confirm(
            "Clear Chat",
            "Are you sure you want to clear all messages? This will affect all users!",
            DialogIntent::ClearChat,
        )
        .with_confirm_label("Clear")
    }

    pub fn with_tone(mut self, tone: DialogTone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn intent(&self) -> DialogIntent {
        self.intent
    }

    pub fn tone(&self) -> DialogTone {
        self.tone
    }

    pub fn is_alert(&self) -> bool {
        self.cancel_label.is_none()
    }

    pub fn selected(&self) -> DialogButton {
        self.selected
    }

    pub fn select_next(&mut self) {
        if !self.is_alert() {
            self.selected = self.selected.other();
        }
    }

    pub fn calculate_area(&self, screen: Rect) -> Rect {
        let width = 54u16.min(screen.width.saturating_sub(4));
        let text_width = width.saturating_sub(4).max(1) as usize;
        let message_lines = wrapped_line_count(&self.message, text_width) as u16;
        // borders, padding line, separator, buttons
        let height = (message_lines + 5).max(7).min(screen.height.saturating_sub(2));

        let x = screen.x + (screen.width.saturating_sub(width)) / 2;
        let y = screen.y + (screen.height.saturating_sub(height)) / 2;

        Rect::new(x, y, width, height)
    }

    pub fn render(&self, frame: &mut Frame, screen: Rect, theme: &dyn Theme) {
        let area = self.calculate_area(screen);

        frame.render_widget(Clear, area);

        let border_color = match self.tone {
            DialogTone::Info => theme.info(),
            DialogTone::Warning => theme.warning(),
            DialogTone::Danger => theme.error(),
        };

        let block = Block::default()
            .title(format!(" {} {} ", self.tone.icon(), self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(
                Style::default()
                    .fg(border_color)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(theme.surface()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let message = Paragraph::new(Span::styled(
            self.message.clone(),
            Style::default().fg(theme.foreground()),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[0].inner(Margin::new(1, 0)));

        let separator = Paragraph::new(Line::from(Span::styled(
            "─".repeat(chunks[1].width as usize),
            Style::default().fg(theme.border()),
        )));
        frame.render_widget(separator, chunks[1]);

        let selected_style = |accent: Color| {
            Style::default()
                .fg(theme.background())
                .bg(accent)
                .add_modifier(Modifier::BOLD)
        };
        let confirm_accent = match self.tone {
            DialogTone::Danger => theme.error(),
            _ => theme.accent(),
        };

        let confirm_style = if self.selected == DialogButton::Confirm {
            selected_style(confirm_accent)
        } else {
            Style::default().fg(confirm_accent)
        };
        let confirm_btn = Paragraph::new(Span::styled(
            format!(" {} ", self.confirm_label),
            confirm_style,
        ))
        .alignment(Alignment::Center);

        match &self.cancel_label {
            None => frame.render_widget(confirm_btn, chunks[2]),
            Some(cancel_label) => {
                let button_chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(chunks[2]);

                let cancel_style = if self.selected == DialogButton::Cancel {
                    selected_style(theme.foreground())
                } else {
                    Style::default().fg(theme.foreground_dim())
                };
                let cancel_btn =
                    Paragraph::new(Span::styled(format!(" {} ", cancel_label), cancel_style))
                        .alignment(Alignment::Center);

                frame.render_widget(cancel_btn, button_chunks[0]);
                frame.render_widget(confirm_btn, button_chunks[1]);
            }
        }
    }
}

fn wrapped_line_count(text: &str, width: usize) -> usize {
    text.lines()
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum::<usize>()
        .max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Confirmed(DialogIntent),
    Cancelled(DialogIntent),
}

/// Holds the open dialog and the outcome of the last one closed.
#[derive(Debug, Default)]
pub struct DialogState {
    pub dialog: Option<Dialog>,
    result: Option<DialogResult>,
}

impl DialogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever is open. The newest notice wins.
    pub fn show(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
        self.result = None;
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn confirm(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            self.result = Some(DialogResult::Confirmed(dialog.intent()));
        }
    }

    pub fn cancel(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            self.result = Some(DialogResult::Cancelled(dialog.intent()));
        }
    }

    pub fn select_next(&mut self) {
        if let Some(ref mut dialog) = self.dialog {
            dialog.select_next();
        }
    }

    pub fn execute_selected(&mut self) {
        let Some(ref dialog) = self.dialog else {
            return;
        };
        match dialog.selected() {
            DialogButton::Confirm => self.confirm(),
            DialogButton::Cancel => self.cancel(),
        }
    }

    pub fn take_result(&mut self) -> Option<DialogResult> {
        self.result.take()
    }
}
