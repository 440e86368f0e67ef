use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use diffview_core::{Command, PrimaryPage};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Command(Command),
    Click { column: u16, row: u16 },
    ScrollList { delta: isize },
    Resize,
    Quit,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Guideline,
}

#[derive(Debug, Default)]
pub struct EventMapper {
    pending_count: Option<u32>,
    pending_digits: String,
    mode: InputMode,
}

impl EventMapper {
    pub const ZOOM_IN: f32 = 1.1;
    pub const ZOOM_OUT: f32 = 0.9;
    const SCROLL_STEP: isize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            self.reset_count();
            self.mode = mode;
        }
    }

    pub fn map_event(&mut self, event: Event) -> UiEvent {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match self.mode {
                InputMode::Normal => self.map_key_normal(key),
                InputMode::Guideline => self.map_key_guideline(key),
            },
            Event::Mouse(mouse) => self.map_mouse(mouse),
            Event::Resize(..) => UiEvent::Resize,
            _ => UiEvent::None,
        }
    }

    fn map_key_normal(&mut self, key: KeyEvent) -> UiEvent {
        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE) if c.is_ascii_digit() => {
                if let Some(digit) = c.to_digit(10) {
                    self.push_digit(digit);
                }
                UiEvent::None
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, KeyModifiers::NONE) => {
                self.command(Command::SelectNext)
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, KeyModifiers::NONE) => {
                self.command(Command::SelectPrev)
            }
            (KeyCode::Enter, _) | (KeyCode::Char('o'), KeyModifiers::NONE) => {
                self.command(Command::OpenGuideline)
            }
            (KeyCode::Esc, _) => self.command(Command::ClearSelection),
            (KeyCode::Char('v'), KeyModifiers::NONE) => self.command(Command::CycleViewMode),
            (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll(Self::SCROLL_STEP * 3)
            }
            (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll(-Self::SCROLL_STEP * 3)
            }
            _ => self.map_shared_key(key),
        }
    }

    fn map_key_guideline(&mut self, key: KeyEvent) -> UiEvent {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Backspace, _) | (KeyCode::Char('o'), KeyModifiers::NONE) => {
                self.command(Command::CloseGuideline)
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, KeyModifiers::NONE) => {
                self.command(Command::GuidelineNextPage)
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, KeyModifiers::NONE) => {
                self.command(Command::GuidelinePrevPage)
            }
            (KeyCode::Char(c), KeyModifiers::NONE) if c.is_ascii_digit() => {
                if let Some(digit) = c.to_digit(10) {
                    self.push_digit(digit);
                }
                UiEvent::None
            }
            _ => self.map_shared_key(key),
        }
    }

    fn map_shared_key(&mut self, key: KeyEvent) -> UiEvent {
        match (key.code, key.modifiers) {
            (KeyCode::Char('n'), KeyModifiers::NONE)
            | (KeyCode::Char(']'), KeyModifiers::NONE)
            | (KeyCode::PageDown, _) => self.command(Command::NextPage),
            (KeyCode::Char('p'), KeyModifiers::NONE)
            | (KeyCode::Char('['), KeyModifiers::NONE)
            | (KeyCode::PageUp, _) => self.command(Command::PrevPage),
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                let page = self.take_count().unwrap_or(PrimaryPage::FIRST);
                UiEvent::Command(Command::GotoPage { page })
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                // The viewer clamps to the last page.
                let page = self.take_count().unwrap_or(PrimaryPage::LAST);
                UiEvent::Command(Command::GotoPage { page })
            }
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
                self.command(Command::ScaleBy { factor: Self::ZOOM_IN })
            }
            (KeyCode::Char('-'), _) => self.command(Command::ScaleBy { factor: Self::ZOOM_OUT }),
            (KeyCode::Char('q'), _) => {
                self.reset_count();
                UiEvent::Quit
            }
            (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_count();
                UiEvent::Quit
            }
            _ => {
                self.reset_count();
                UiEvent::None
            }
        }
    }

    fn map_mouse(&mut self, mouse: MouseEvent) -> UiEvent {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.reset_count();
                UiEvent::Click {
                    column: mouse.column,
                    row: mouse.row,
                }
            }
            MouseEventKind::ScrollDown if self.mode == InputMode::Normal => {
                UiEvent::ScrollList {
                    delta: Self::SCROLL_STEP,
                }
            }
            MouseEventKind::ScrollUp if self.mode == InputMode::Normal => UiEvent::ScrollList {
                delta: -Self::SCROLL_STEP,
            },
            _ => UiEvent::None,
        }
    }

    fn command(&mut self, command: Command) -> UiEvent {
        self.reset_count();
        UiEvent::Command(command)
    }

    fn scroll(&mut self, delta: isize) -> UiEvent {
        self.reset_count();
        UiEvent::ScrollList { delta }
    }

    fn push_digit(&mut self, digit: u32) {
        let current = self.pending_count.unwrap_or(0);
        self.pending_count = Some(current.saturating_mul(10).saturating_add(digit));
        if let Some(c) = char::from_digit(digit, 10) {
            self.pending_digits.push(c);
        }
    }

    fn take_count(&mut self) -> Option<PrimaryPage> {
        let count = self.pending_count.take();
        self.pending_digits.clear();
        count.and_then(PrimaryPage::new)
    }

    fn reset_count(&mut self) {
        self.pending_count = None;
        self.pending_digits.clear();
    }

    pub fn pending_input(&self) -> Option<&str> {
        if self.pending_digits.is_empty() {
            None
        } else {
            Some(&self.pending_digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn key_event(code: KeyCode) -> Event {
        key_event_with_modifiers(code, KeyModifiers::NONE)
    }

    fn key_event_with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse_event(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn numeric_prefix_goes_to_page() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('1'))),
            UiEvent::None
        ));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('2'))),
            UiEvent::None
        ));
        assert_eq!(mapper.pending_input(), Some("12"));

        match mapper.map_event(key_event_with_modifiers(KeyCode::Char('G'), KeyModifiers::SHIFT)) {
            UiEvent::Command(Command::GotoPage { page }) => assert_eq!(page.get(), 12),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(mapper.pending_input().is_none());
    }

    #[test]
    fn bare_g_and_shift_g_go_to_ends() {
        let mut mapper = EventMapper::new();
        match mapper.map_event(key_event(KeyCode::Char('g'))) {
            UiEvent::Command(Command::GotoPage { page }) => assert_eq!(page, PrimaryPage::FIRST),
            other => panic!("unexpected event: {:?}", other),
        }
        match mapper.map_event(key_event_with_modifiers(KeyCode::Char('G'), KeyModifiers::SHIFT)) {
            UiEvent::Command(Command::GotoPage { page }) => assert_eq!(page, PrimaryPage::LAST),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn zero_prefix_is_ignored() {
        let mut mapper = EventMapper::new();
        mapper.map_event(key_event(KeyCode::Char('0')));
        match mapper.map_event(key_event(KeyCode::Char('g'))) {
            UiEvent::Command(Command::GotoPage { page }) => assert_eq!(page, PrimaryPage::FIRST),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn other_keys_drop_the_prefix() {
        let mut mapper = EventMapper::new();
        mapper.map_event(key_event(KeyCode::Char('4')));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('j'))),
            UiEvent::Command(Command::SelectNext)
        ));
        assert!(mapper.pending_input().is_none());
    }

    #[test]
    fn paging_keys_follow_the_panel_mode() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Down)),
            UiEvent::Command(Command::SelectNext)
        ));

        mapper.set_mode(InputMode::Guideline);
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Down)),
            UiEvent::Command(Command::GuidelineNextPage)
        ));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('k'))),
            UiEvent::Command(Command::GuidelinePrevPage)
        ));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char(']'))),
            UiEvent::Command(Command::NextPage)
        ));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Esc)),
            UiEvent::Command(Command::CloseGuideline)
        ));
    }

    #[test]
    fn enter_opens_guideline_and_esc_clears_selection() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Enter)),
            UiEvent::Command(Command::OpenGuideline)
        ));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Esc)),
            UiEvent::Command(Command::ClearSelection)
        ));
    }

    #[test]
    fn zoom_keys_scale() {
        let mut mapper = EventMapper::new();
        match mapper.map_event(key_event(KeyCode::Char('+'))) {
            UiEvent::Command(Command::ScaleBy { factor }) => {
                assert!((factor - EventMapper::ZOOM_IN).abs() < f32::EPSILON)
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match mapper.map_event(key_event(KeyCode::Char('-'))) {
            UiEvent::Command(Command::ScaleBy { factor }) => {
                assert!((factor - EventMapper::ZOOM_OUT).abs() < f32::EPSILON)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn left_click_is_forwarded_with_cell() {
        let mut mapper = EventMapper::new();
        match mapper.map_event(mouse_event(MouseEventKind::Down(MouseButton::Left), 12, 7)) {
            UiEvent::Click { column, row } => assert_eq!((column, row), (12, 7)),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(
            mapper.map_event(mouse_event(MouseEventKind::Down(MouseButton::Right), 1, 1)),
            UiEvent::None
        ));
    }

    #[test]
    fn wheel_scrolls_list_only_in_normal_mode() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(mouse_event(MouseEventKind::ScrollDown, 0, 0)),
            UiEvent::ScrollList { delta } if delta > 0
        ));
        mapper.set_mode(InputMode::Guideline);
        assert!(matches!(
            mapper.map_event(mouse_event(MouseEventKind::ScrollDown, 0, 0)),
            UiEvent::None
        ));
    }

    #[test]
    fn switching_modes_clears_pending_digits() {
        let mut mapper = EventMapper::new();
        mapper.map_event(key_event(KeyCode::Char('7')));
        mapper.set_mode(InputMode::Guideline);
        assert!(mapper.pending_input().is_none());
    }

    #[test]
    fn quit_keys() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('q'))),
            UiEvent::Quit
        ));
        assert!(matches!(
            mapper.map_event(key_event_with_modifiers(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            UiEvent::Quit
        ));
    }
}
