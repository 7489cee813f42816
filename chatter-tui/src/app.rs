use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chatter_core::{
    ChatterConfig, ChatterError, Composer, MessageSynchronizer, RealtimeBackend, Session,
    SyncNotice,
};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{backend::Backend, layout::Rect, Terminal};
use tracing::{info, warn};

use crate::events::{Action, EventHandler, InputMode, ScrollDirection};
use crate::theme::{Theme, ThemeLoader, ThemeManager};
use crate::ui::widgets::{
    Dialog, DialogIntent, DialogResult, DialogState, Footer, HelpModal, ToastManager,
};
use crate::ui::MainLayout;

const OFFLINE_NOTICE: &str = "Connection lost. Please check your internet connection.";
const MOUSE_SCROLL_LINES: usize = 3;
const PAGE_SCROLL_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Join,
    Chat,
}

/// Distance of the message viewport from the newest line. Zero means the
/// view follows new messages.
#[derive(Debug, Default)]
pub struct ChatScroll {
    offset: Cell<usize>,
    max: Cell<usize>,
}

impl ChatScroll {
    pub fn offset(&self) -> usize {
        self.offset.get()
    }

    pub fn is_following(&self) -> bool {
        self.offset.get() == 0
    }

    /// Called by the renderer once it knows how many lines overflow.
    pub fn set_max(&self, max: usize) {
        self.max.set(max);
        self.offset.set(self.offset.get().min(max));
    }

    pub fn scroll_up(&self, lines: usize) {
        let offset = self.offset.get().saturating_add(lines);
        self.offset.set(offset.min(self.max.get()));
    }

    pub fn scroll_down(&self, lines: usize) {
        self.offset.set(self.offset.get().saturating_sub(lines));
    }

    pub fn to_bottom(&self) {
        self.offset.set(0);
    }
}

pub struct App {
    pub should_quit: bool,
    pub session: Session,
    pub nickname_input: Composer,
    pub message_input: Composer,
    pub sync: MessageSynchronizer,
    pub theme_manager: ThemeManager,
    pub theme_loader: ThemeLoader,
    pub event_handler: EventHandler,
    pub toast_manager: ToastManager,
    pub dialog_state: DialogState,
    pub show_help_modal: bool,
    pub help_modal_scroll: usize,
    /// Terminal area of the last drawn frame
    pub frame_area: Rect,
    pub chat_scroll: ChatScroll,
    pub status_message: Option<String>,
    pub tick_rate: Duration,
}

impl App {
    pub fn new(
        config: &ChatterConfig,
        backend: Arc<dyn RealtimeBackend>,
        theme_loader: ThemeLoader,
    ) -> Self {
        let theme_manager = theme_loader.initialize_theme_manager(config.tui.theme.as_deref());
        let sync = MessageSynchronizer::new(backend, config.collection_path());

        Self {
            should_quit: false,
            session: Session::new(),
            nickname_input: Composer::nickname().with_max_len(config.chat.nickname_max_len),
            message_input: Composer::message().with_max_len(config.chat.message_max_len),
            sync,
            theme_manager,
            theme_loader,
            event_handler: EventHandler::new(),
            toast_manager: ToastManager::new(),
            dialog_state: DialogState::new(),
            show_help_modal: false,
            help_modal_scroll: 0,
            frame_area: Rect::default(),
            chat_scroll: ChatScroll::default(),
            status_message: Some("Press F1 for help".to_string()),
            tick_rate: Duration::from_millis(config.tui.tick_rate_ms.max(1)),
        }
    }

    pub fn screen(&self) -> Screen {
        if self.session.is_joined() {
            Screen::Chat
        } else {
            Screen::Join
        }
    }

    pub fn current_theme(&self) -> &dyn Theme {
        self.theme_manager.current_theme()
    }

    /// False while an overlay has the keyboard.
    pub fn accepts_typing(&self) -> bool {
        !self.dialog_state.is_open() && !self.show_help_modal
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.toast_manager.cleanup();

            let completed = terminal.draw(|frame| MainLayout::render(frame, self))?;
            self.frame_area = completed.area;
            self.register_clickable_regions(completed.area);

            if event::poll(self.tick_rate)? {
                let evt = event::read()?;
                self.handle_event(evt);
            }

            self.process_sync_notices();

            if self.should_quit {
                break;
            }
        }

        self.sync.deactivate();
        Ok(())
    }

    fn register_clickable_regions(&mut self, size: Rect) {
        let [_, _, footer] = MainLayout::areas(size);
        self.event_handler.clear_clickable_regions();
        for region in Footer::button_regions(footer, self.screen()) {
            self.event_handler.register_clickable_region(region);
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = &event {
            if key.kind == KeyEventKind::Release {
                return;
            }
            if self.dialog_state.is_open() {
                self.handle_dialog_key(key.code);
                return;
            }
            if self.show_help_modal {
                self.handle_help_modal_key(key.code);
                return;
            }
        } else if !self.accepts_typing() && matches!(event, Event::Paste(_) | Event::Mouse(_)) {
            return;
        }

        if let Some(action) = self.event_handler.handle_event(event) {
            self.execute_action(action);
        }
    }

    fn handle_dialog_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.dialog_state.cancel();
            }
            KeyCode::Enter => {
                self.dialog_state.execute_selected();
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.dialog_state.confirm();
            }
            KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Char('h')
            | KeyCode::Char('l') => {
                self.dialog_state.select_next();
            }
            _ => {}
        }

        if let Some(result) = self.dialog_state.take_result() {
            self.apply_dialog_result(result);
        }
    }

    fn apply_dialog_result(&mut self, result: DialogResult) {
        match result {
            DialogResult::Confirmed(DialogIntent::ClearChat) => {
                self.sync.clear();
                self.chat_scroll.to_bottom();
                self.status_message = Some("Clearing messages...".to_string());
            }
            DialogResult::Cancelled(DialogIntent::ClearChat) => {
                self.status_message = Some("Clear cancelled".to_string());
            }
            DialogResult::Confirmed(DialogIntent::Acknowledge)
            | DialogResult::Cancelled(DialogIntent::Acknowledge) => {}
        }
    }

    fn handle_help_modal_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.show_help_modal = false;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.help_modal_scroll = self.help_modal_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.help_modal_scroll = self.help_modal_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.help_modal_scroll = self.help_modal_scroll.saturating_add(PAGE_SCROLL_LINES);
            }
            KeyCode::PageUp => {
                self.help_modal_scroll = self.help_modal_scroll.saturating_sub(PAGE_SCROLL_LINES);
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.help_modal_scroll = 0;
            }
            _ => {}
        }
        self.help_modal_scroll = self
            .help_modal_scroll
            .min(HelpModal::max_scroll(self.frame_area));
    }

    pub fn execute_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Help => {
                self.show_help_modal = true;
                self.help_modal_scroll = 0;
            }
            Action::ToggleTheme => self.toggle_theme(),
            Action::Back => match self.screen() {
                Screen::Join => self.should_quit = true,
                Screen::Chat => self.chat_scroll.to_bottom(),
            },
            Action::Resize { .. } | Action::MouseClick { .. } => {}
            _ => match self.screen() {
                Screen::Join => self.execute_join_action(action),
                Screen::Chat => self.execute_chat_action(action),
            },
        }
    }

    fn execute_join_action(&mut self, action: Action) {
        if action == Action::Submit {
            self.submit_nickname();
        } else {
            Self::edit(&mut self.nickname_input, action);
        }
    }

    fn execute_chat_action(&mut self, action: Action) {
        match action {
            Action::Submit => self.submit_message(),
            Action::SwitchUser => self.switch_user(),
            Action::ClearChat => self.dialog_state.show(Dialog::clear_chat()),
            Action::ScrollUp => self.chat_scroll.scroll_up(1),
            Action::ScrollDown => self.chat_scroll.scroll_down(1),
            Action::PageUp => self.chat_scroll.scroll_up(PAGE_SCROLL_LINES),
            Action::PageDown => self.chat_scroll.scroll_down(PAGE_SCROLL_LINES),
            Action::ScrollToBottom => self.chat_scroll.to_bottom(),
            Action::MouseScroll {
                direction: ScrollDirection::Up,
            } => self.chat_scroll.scroll_up(MOUSE_SCROLL_LINES),
            Action::MouseScroll {
                direction: ScrollDirection::Down,
            } => self.chat_scroll.scroll_down(MOUSE_SCROLL_LINES),
            other => Self::edit(&mut self.message_input, other),
        }
    }

    fn edit(input: &mut Composer, action: Action) {
        match action {
            Action::InsertChar(c) => {
                input.insert_char(c);
            }
            Action::InsertNewline => {
                input.insert_newline();
            }
            Action::Paste(text) => {
                input.insert_str(&text);
            }
            Action::Backspace => input.delete_char(),
            Action::Delete => input.delete_char_forward(),
            Action::CursorLeft => input.move_cursor_left(),
            Action::CursorRight => input.move_cursor_right(),
            Action::CursorStart => input.move_cursor_start(),
            Action::CursorEnd => input.move_cursor_end(),
            Action::ClearInput => input.clear(),
            _ => {}
        }
    }

    fn submit_nickname(&mut self) {
        let raw = self.nickname_input.text();
        if self.session.join(&raw).is_err() {
            return;
        }

        self.nickname_input.clear();
        self.event_handler.set_input_mode(InputMode::Compose);
        self.chat_scroll.to_bottom();
        self.sync.activate();
        self.status_message = Some(format!("Joined as {}", self.session.nickname()));
    }

    /// Join straight away, as if the nickname had been typed in.
    pub fn join_with(&mut self, nickname: &str) {
        self.nickname_input.set_text(nickname);
        self.submit_nickname();
    }

    /// The draft is consumed whether or not the send is accepted.
    fn submit_message(&mut self) {
        let Some(text) = self.message_input.submit() else {
            return;
        };

        match self.sync.send(&text, self.session.nickname()) {
            Ok(()) => self.chat_scroll.to_bottom(),
            Err(ChatterError::Offline) => {
                self.dialog_state.show(Dialog::alert("Offline", OFFLINE_NOTICE));
            }
            Err(ChatterError::EmptyMessage) => {}
            Err(e) => {
                e.log();
                self.toast_manager.error(e.to_string());
            }
        }
    }

    fn switch_user(&mut self) {
        info!(nickname = %self.session.nickname(), "Switching user");
        self.sync.deactivate();
        self.session.switch_user();
        self.message_input.clear();
        self.chat_scroll.to_bottom();
        self.event_handler.set_input_mode(InputMode::Nickname);
        self.status_message = Some("Choose a nickname".to_string());
    }

    /// Apply whatever the synchronizer has received since the last tick.
    pub fn process_sync_notices(&mut self) {
        for notice in self.sync.poll() {
            match notice {
                SyncNotice::MessagesUpdated(count) => {
                    self.status_message = Some(match count {
                        1 => "1 message".to_string(),
                        n => format!("{n} messages"),
                    });
                }
                SyncNotice::ConnectivityChanged(true) => {
                    self.toast_manager.success("Connection restored");
                }
                SyncNotice::ConnectivityChanged(false) => {
                    self.toast_manager
                        .warning("Connection lost. Showing last known messages.");
                }
                SyncNotice::WriteFailed { kind, error } => {
                    warn!(kind = %kind, error = %error, "Write failed");
                    self.dialog_state
                        .show(Dialog::alert("Error", kind.failure_notice()));
                }
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.theme_manager.cycle_theme();
        let theme_name = self.theme_manager.current_theme_name();
        if let Err(e) = self.theme_loader.save_theme_name(theme_name) {
            warn!("Failed to save theme preference: {}", e);
        }
        self.toast_manager.info(format!("Theme: {theme_name}"));
    }
}
