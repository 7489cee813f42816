use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Submit,
    InsertChar(char),
    InsertNewline,
    Paste(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorStart,
    CursorEnd,
    ClearInput,
    SwitchUser,
    ClearChat,
    ToggleTheme,
    Help,
    Back,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToBottom,
    MouseClick { x: u16, y: u16 },
    MouseScroll { direction: ScrollDirection },
    Resize { width: u16, height: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Which input box has the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Nickname,
    Compose,
}

#[derive(Debug, Clone)]
pub struct ClickableRegion {
    pub area: Rect,
    pub action: Action,
    pub label: String,
}

impl ClickableRegion {
    fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.area.x
            && x < self.area.x + self.area.width
            && y >= self.area.y
            && y < self.area.y + self.area.height
    }
}

pub struct EventHandler {
    input_mode: InputMode,
    terminal_size: Option<(u16, u16)>,
    clickable_regions: Vec<ClickableRegion>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            input_mode: InputMode::Nickname,
            terminal_size: None,
            clickable_regions: Vec::new(),
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    pub fn terminal_size(&self) -> Option<(u16, u16)> {
        self.terminal_size
    }

    pub fn register_clickable_region(&mut self, region: ClickableRegion) {
        self.clickable_regions.push(region);
    }

    pub fn clear_clickable_regions(&mut self) {
        self.clickable_regions.clear();
    }

    pub fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.handle_resize(width, height),
            Event::Paste(text) => Some(Action::Paste(text)),
            Event::FocusGained | Event::FocusLost => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        // Windows terminals report releases too
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if let Some(action) = Self::global_key(key) {
            return Some(action);
        }

        match self.input_mode {
            InputMode::Nickname => Self::editing_key(key, false),
            InputMode::Compose => {
                Self::compose_command_key(key).or_else(|| Self::editing_key(key, true))
            }
        }
    }

    fn global_key(key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, ctrl) {
            (KeyCode::Char('c'), true) | (KeyCode::Char('q'), true) => Some(Action::Quit),
            (KeyCode::Char('t'), true) => Some(Action::ToggleTheme),
            (KeyCode::F(1), _) => Some(Action::Help),
            (KeyCode::Esc, _) => Some(Action::Back),
            _ => None,
        }
    }

    fn compose_command_key(key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, ctrl) {
            (KeyCode::Char('s'), true) | (KeyCode::F(2), _) => Some(Action::SwitchUser),
            (KeyCode::Char('l'), true) | (KeyCode::F(3), _) => Some(Action::ClearChat),
            (KeyCode::PageUp, _) => Some(Action::PageUp),
            (KeyCode::PageDown, _) => Some(Action::PageDown),
            (KeyCode::Up, true) => Some(Action::ScrollUp),
            (KeyCode::Down, true) => Some(Action::ScrollDown),
            (KeyCode::End, true) => Some(Action::ScrollToBottom),
            _ => None,
        }
    }

    fn editing_key(key: KeyEvent, multiline: bool) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Enter if multiline && (shift || alt) => Some(Action::InsertNewline),
            KeyCode::Char('j') if multiline && ctrl => Some(Action::InsertNewline),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Delete => Some(Action::Delete),
            KeyCode::Left => Some(Action::CursorLeft),
            KeyCode::Right => Some(Action::CursorRight),
            KeyCode::Home => Some(Action::CursorStart),
            KeyCode::End => Some(Action::CursorEnd),
            KeyCode::Char('a') if ctrl => Some(Action::CursorStart),
            KeyCode::Char('e') if ctrl => Some(Action::CursorEnd),
            KeyCode::Char('u') if ctrl => Some(Action::ClearInput),
            KeyCode::Char(c) if !ctrl && !alt => Some(Action::InsertChar(c)),
            _ => None,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let (x, y) = (mouse.column, mouse.row);

                if let Some(region) = self.clickable_regions.iter().find(|r| r.contains(x, y)) {
                    return Some(region.action.clone());
                }

                Some(Action::MouseClick { x, y })
            }
            MouseEventKind::ScrollUp => Some(Action::MouseScroll {
                direction: ScrollDirection::Up,
            }),
            MouseEventKind::ScrollDown => Some(Action::MouseScroll {
                direction: ScrollDirection::Down,
            }),
            _ => None,
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) -> Option<Action> {
        self.terminal_size = Some((width, height));
        Some(Action::Resize { width, height })
    }
}
