use ratatui::crossterm::event::KeyEvent;
use std::io::Error;

// Custom error type used across the whole application.
#[derive(Debug)]
pub enum LeadError {
    IoError(Error),
    LoadingFailed(String),
    EmptyExport,
    ExportFailed(String),
    FileNotFound,
    PermissionDenied,
}

impl From<Error> for LeadError {
    fn from(err: Error) -> Self {
        LeadError::IoError(err)
    }
}

impl From<serde_json::Error> for LeadError {
    fn from(err: serde_json::Error) -> Self {
        LeadError::LoadingFailed(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for LeadError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        LeadError::ExportFailed(err.to_string())
    }
}

impl std::fmt::Display for LeadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadError::IoError(e) => write!(f, "IO error: {e}"),
            LeadError::LoadingFailed(msg) => write!(f, "Loading failed: {msg}"),
            LeadError::EmptyExport => write!(f, "Nothing to export!"),
            LeadError::ExportFailed(msg) => write!(f, "Export failed: {msg}"),
            LeadError::FileNotFound => write!(f, "File not found!"),
            LeadError::PermissionDenied => write!(f, "Permission denied!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CSVSeparator {
    Comma,
    Semicolon,
}

impl CSVSeparator {
    pub fn as_char(&self) -> char {
        match self {
            CSVSeparator::Comma => ',',
            CSVSeparator::Semicolon => ';',
        }
    }
}

#[derive(Debug, Clone, derive_setters::Setters)]
pub struct LeadConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub debounce_ms: u64,
    pub separator: CSVSeparator,
    pub bom: bool,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            page_size: 24,
            debounce_ms: 300,
            separator: CSVSeparator::Comma,
            bom: false,
        }
    }
}

// Messages emitted by the controller and consumed by the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    Exit,
    Help,
    MoveUp,
    MoveDown,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    JumpToPage,
    CyclePageSize,
    GlobalSearch,
    FilterName,
    FilterAccount,
    FilterSpecialty,
    FilterCity,
    ToggleStatWhatsApp,
    ToggleStatSpecialty,
    ToggleStatLocation,
    ToggleStatEmail,
    ClearFilters,
    ToggleColumnPanel,
    ToggleColumn,
    SortColumn,
    ExportCSVFiltered,
    ExportCSVAll,
    ExportCSVVisible,
    ExportXLSX,
    CopyCard,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "leadtv - lead records viewer

Navigation
  Up/Down       select card / move column curser
  Left/Right    previous / next page
  g / G         first / last page
  p             jump to page
  +             cycle page size (12, 24, 48, 96)

Filtering
  /             global search (debounced while typing)
  n o e i       filter by Nome / Conta / Especialidades / Cidade
  w s l m       toggle WhatsApp / specialty / location / email stat filter
  r             clear all filters

Columns
  v             toggle column panel
  Space         show/hide selected column
  S             sort by selected column (again to flip direction)

Export
  x             export filtered rows as CSV
  a             export all rows as CSV
  c             export visible columns of filtered rows as CSV
  X             export filtered rows as XLSX
  y             copy selected card as CSV row

q quit, Esc close popup/input, F1 this help";
