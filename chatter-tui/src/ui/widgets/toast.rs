use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::Theme;

const MAX_STACKED: usize = 4;
const MAX_WIDTH: u16 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Info => "ℹ",
            ToastLevel::Success => "✓",
            ToastLevel::Warning => "⚠",
            ToastLevel::Error => "✗",
        }
    }

    /// Problems stay up longer than confirmations.
    pub fn lifetime(&self) -> Duration {
        match self {
            ToastLevel::Info => Duration::from_secs(2),
            ToastLevel::Success => Duration::from_secs(3),
            ToastLevel::Warning => Duration::from_secs(5),
            ToastLevel::Error => Duration::from_secs(6),
        }
    }

    fn color(&self, theme: &dyn Theme) -> Color {
        match self {
            ToastLevel::Info => theme.info(),
            ToastLevel::Success => theme.success(),
            ToastLevel::Warning => theme.warning(),
            ToastLevel::Error => theme.error(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    shown_at: Instant,
    lifetime: Duration,
}

impl Toast {
    pub fn new(text: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            text: text.into(),
            level,
            shown_at: Instant::now(),
            lifetime: level.lifetime(),
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= self.lifetime
    }

    fn same_as(&self, other: &Toast) -> bool {
        self.level == other.level && self.text == other.text
    }
}

/// Short-lived notices stacked under the header, newest on top.
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeat of a toast still on screen restarts its timer instead of
    /// stacking a copy.
    pub fn push(&mut self, toast: Toast) {
        self.toasts.retain(|t| !t.same_as(&toast));
        self.toasts.push(toast);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastLevel::Info));
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastLevel::Success));
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastLevel::Warning));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastLevel::Error));
    }

    pub fn cleanup(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().rev().take(MAX_STACKED)
    }

    pub fn count(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// One row per toast, right-aligned just below the header.
    pub fn render(&self, frame: &mut Frame, screen: Rect, theme: &dyn Theme) {
        let width = MAX_WIDTH.min(screen.width.saturating_sub(2));
        if width < 6 {
            return;
        }
        let x = screen.x + screen.width - width - 1;

        for (row, toast) in self.visible().enumerate() {
            let y = screen.y + 3 + row as u16;
            if y >= screen.y + screen.height {
                break;
            }
            let color = toast.level.color(theme);
            let text = truncate_chars(&toast.text, width as usize - 4);

            let pill = Line::from(vec![
                Span::styled(
                    format!(" {} ", toast.level.icon()),
                    Style::default()
                        .fg(theme.background())
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {text} "),
                    Style::default().fg(theme.foreground()).bg(theme.surface()),
                ),
            ])
            .alignment(Alignment::Right);

            let area = Rect::new(x, y, width, 1);
            frame.render_widget(Clear, area);
            frame.render_widget(Paragraph::new(pill), area);
        }
    }
}

/// Shorten to at most `max` characters, ending in an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_outlive_info() {
        assert!(ToastLevel::Warning.lifetime() > ToastLevel::Info.lifetime());
        assert!(ToastLevel::Error.lifetime() > ToastLevel::Success.lifetime());
        assert_eq!(ToastLevel::Warning.icon(), "⚠");
    }

    #[test]
    fn test_zero_lifetime_expires() {
        let toast = Toast::new("gone", ToastLevel::Info).with_lifetime(Duration::ZERO);
        assert!(toast.is_expired());
        assert!(!Toast::new("here", ToastLevel::Info).is_expired());
    }

    #[test]
    fn test_cleanup_drops_expired() {
        let mut manager = ToastManager::new();
        manager.push(Toast::new("brief", ToastLevel::Info).with_lifetime(Duration::ZERO));
        manager.warning("Connection lost. Showing last known messages.");

        manager.cleanup();
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_repeats_do_not_stack() {
        let mut manager = ToastManager::new();
        manager.warning("Connection lost");
        manager.success("Connection restored");
        manager.warning("Connection lost");

        let texts: Vec<_> = manager.visible().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Connection lost", "Connection restored"]);
    }

    #[test]
    fn test_same_text_different_level_stacks() {
        let mut manager = ToastManager::new();
        manager.info("Theme: Nord");
        manager.error("Theme: Nord");
        assert_eq!(manager.count(), 2);
    }

    #[test]
    fn test_visible_newest_first_and_capped() {
        let mut manager = ToastManager::new();
        for i in 0..7 {
            manager.info(format!("toast {i}"));
        }

        let visible: Vec<_> = manager.visible().map(|t| t.text.as_str()).collect();
        assert_eq!(visible.len(), MAX_STACKED);
        assert_eq!(visible[0], "toast 6");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("héllo wörld", 6), "héllo…");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
