use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the prompt line is currently collecting input for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptKind {
    GlobalSearch,
    Field(&'static str),
    Page,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptEvent {
    /// Buffer changed; global search live-filters on this.
    Edited(String),
    Submitted(String),
    Canceled,
    Ignored,
}

/// Single-line editor shown at the bottom of the screen while a search term,
/// field filter or page number is typed.
#[derive(Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    buffer: String,
    curser: usize, // char position, not bytes
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        Prompt {
            kind,
            buffer: initial.to_string(),
            curser: initial.chars().count(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn curser(&self) -> usize {
        self.curser
    }

    pub fn title(&self) -> String {
        match self.kind {
            PromptKind::GlobalSearch => "Search".to_string(),
            PromptKind::Field(key) => format!("Filter {key}"),
            PromptKind::Page => "Go to page".to_string(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptEvent {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => PromptEvent::Submitted(self.buffer.clone()),
            (KeyCode::Esc, KeyModifiers::NONE) => PromptEvent::Canceled,
            (KeyCode::Backspace, KeyModifiers::NONE) => {
                if self.curser > 0 {
                    self.curser -= 1;
                    let pos = self.byte_pos();
                    self.buffer.remove(pos);
                    PromptEvent::Edited(self.buffer.clone())
                } else {
                    PromptEvent::Ignored
                }
            }
            (KeyCode::Delete, KeyModifiers::NONE) => {
                if self.curser < self.buffer.chars().count() {
                    let pos = self.byte_pos();
                    self.buffer.remove(pos);
                    PromptEvent::Edited(self.buffer.clone())
                } else {
                    PromptEvent::Ignored
                }
            }
            (KeyCode::Left, KeyModifiers::NONE) => {
                self.curser = self.curser.saturating_sub(1);
                PromptEvent::Ignored
            }
            (KeyCode::Right, KeyModifiers::NONE) => {
                if self.curser < self.buffer.chars().count() {
                    self.curser += 1;
                }
                PromptEvent::Ignored
            }
            (KeyCode::Home, KeyModifiers::NONE) => {
                self.curser = 0;
                PromptEvent::Ignored
            }
            (KeyCode::End, KeyModifiers::NONE) => {
                self.curser = self.buffer.chars().count();
                PromptEvent::Ignored
            }
            (code, modifiers)
                if modifiers == KeyModifiers::NONE || modifiers == KeyModifiers::SHIFT =>
            {
                if let Some(chr) = code.as_char() {
                    let pos = self.byte_pos();
                    self.buffer.insert(pos, chr);
                    self.curser += 1;
                    PromptEvent::Edited(self.buffer.clone())
                } else {
                    PromptEvent::Ignored
                }
            }
            _ => PromptEvent::Ignored,
        }
    }

    fn byte_pos(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.curser)
            .map(|(idx, _)| idx)
            .unwrap_or(self.buffer.len())
    }
}
