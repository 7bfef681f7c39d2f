use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    // Navigation
    NextDevice, // Right/Down arrow, Tab, PageDown
    PrevDevice, // Left/Up arrow, Shift+Tab, PageUp

    // Settings
    ToggleOptions, // 'o' or F2 - Show/hide the options panel
    Increase,      // '+' - Step the selected option up
    Decrease,      // '-' - Step the selected option down
    SaveSettings,  // F5 - Save current settings

    // Control
    Quit,  // 'q', Esc or Ctrl+C
    Reset, // 'r' - Reset statistics of the shown device

    // Display modes
    ToggleTrafficUnits, // 'u' - Cycle traffic unit (rates)
    ToggleDataUnits,    // 'U' - Cycle data unit (totals)
    ToggleMultiple,     // 'm' or Enter - Single/multiple device view

    Unknown,
}

impl InputEvent {
    pub fn from_key_event(key_event: KeyEvent) -> Self {
        match (key_event.code, key_event.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Self::Quit,

            (KeyCode::Tab, KeyModifiers::NONE) => Self::NextDevice,
            (KeyCode::Tab, KeyModifiers::SHIFT) | (KeyCode::BackTab, _) => Self::PrevDevice,
            (KeyCode::Right | KeyCode::Down | KeyCode::PageDown, _) => Self::NextDevice,
            (KeyCode::Left | KeyCode::Up | KeyCode::PageUp, _) => Self::PrevDevice,

            (KeyCode::Char('o' | 'O') | KeyCode::F(2), _) => Self::ToggleOptions,
            (KeyCode::Char('+' | '='), _) => Self::Increase,
            (KeyCode::Char('-'), _) => Self::Decrease,
            (KeyCode::F(5), _) => Self::SaveSettings,

            (KeyCode::Char('q' | 'Q') | KeyCode::Esc, _) => Self::Quit,
            (KeyCode::Char('r'), _) => Self::Reset,
            (KeyCode::Char('u'), _) => Self::ToggleTrafficUnits,
            (KeyCode::Char('U'), _) => Self::ToggleDataUnits,
            (KeyCode::Char('m') | KeyCode::Enter, _) => Self::ToggleMultiple,

            _ => Self::Unknown,
        }
    }
}
