use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode};

use crate::domain::{LeadConfig, LeadError, Message};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(config: &LeadConfig) -> Self {
        Self {
            event_poll_time: config.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, LeadError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            // While a prompt is open, the model consumes keys unmapped.
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::F(1) | KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Up => Some(Message::MoveUp),
            KeyCode::Down => Some(Message::MoveDown),
            KeyCode::Right => Some(Message::NextPage),
            KeyCode::Left => Some(Message::PreviousPage),
            KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::Char('p') => Some(Message::JumpToPage),
            KeyCode::Char('+') => Some(Message::CyclePageSize),
            KeyCode::Char('/') => Some(Message::GlobalSearch),
            KeyCode::Char('n') => Some(Message::FilterName),
            KeyCode::Char('o') => Some(Message::FilterAccount),
            KeyCode::Char('e') => Some(Message::FilterSpecialty),
            KeyCode::Char('i') => Some(Message::FilterCity),
            KeyCode::Char('w') => Some(Message::ToggleStatWhatsApp),
            KeyCode::Char('s') => Some(Message::ToggleStatSpecialty),
            KeyCode::Char('l') => Some(Message::ToggleStatLocation),
            KeyCode::Char('m') => Some(Message::ToggleStatEmail),
            KeyCode::Char('r') => Some(Message::ClearFilters),
            KeyCode::Char('v') => Some(Message::ToggleColumnPanel),
            KeyCode::Char(' ') => Some(Message::ToggleColumn),
            KeyCode::Char('S') => Some(Message::SortColumn),
            KeyCode::Char('x') => Some(Message::ExportCSVFiltered),
            KeyCode::Char('a') => Some(Message::ExportCSVAll),
            KeyCode::Char('c') => Some(Message::ExportCSVVisible),
            KeyCode::Char('X') => Some(Message::ExportXLSX),
            KeyCode::Char('y') => Some(Message::CopyCard),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
