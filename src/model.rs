use arboard::Clipboard;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::cache::{PageCache, page_key};
use crate::debounce::Debouncer;
use crate::domain::{LeadConfig, LeadError, Message};
use crate::export::{self, ExportMode};
use crate::fields::{self, FieldDescriptor};
use crate::filter::{self, FilterState, Stats};
use crate::pager::PageState;
use crate::prompt::{Prompt, PromptEvent, PromptKind};
use crate::sort::{self, SortState};
use crate::store::{Loader, Progress, RecordStore};
use crate::view::{self, PageView};

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    LOADING,
    READY,
    QUITTING,
}

pub struct Model {
    config: LeadConfig,
    pub status: Status,
    store: RecordStore,
    loader: Option<Loader>,
    load_progress: Progress,
    load_error: Option<String>,
    source_name: String,

    fields: Vec<FieldDescriptor>,
    filters: FilterState,
    sort: SortState,
    pager: PageState,
    view: Vec<usize>,
    stats: Stats,
    cache: PageCache,
    search_debounce: Debouncer<String>,

    prompt: Option<Prompt>,
    clipboard: Option<Clipboard>,
    selected_card: usize,
    column_curser: usize,
    show_help: bool,
    show_columns: bool,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &LeadConfig) -> Self {
        Self {
            status: Status::EMPTY,
            store: RecordStore::default(),
            loader: None,
            load_progress: Progress {
                ingested: 0,
                total: 0,
            },
            load_error: None,
            source_name: String::new(),
            fields: fields::lead_fields(),
            filters: FilterState::default(),
            sort: SortState::default(),
            pager: PageState::new(config.page_size),
            view: Vec::new(),
            stats: Stats::default(),
            cache: PageCache::default(),
            search_debounce: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            prompt: None,
            clipboard: Clipboard::new().ok(),
            selected_card: 0,
            column_curser: 0,
            show_help: false,
            show_columns: false,
            status_message: "Started leadtv!".to_string(),
            last_status_message_update: Instant::now(),
            config: config.clone(),
        }
    }

    /// Read and parse the data source. A failure is terminal: it is turned
    /// into an inline error display, there is no retry.
    pub fn load_data_file(&mut self, path: &Path) {
        self.source_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        let result = fs::read(path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LeadError::FileNotFound,
                ErrorKind::PermissionDenied => LeadError::PermissionDenied,
                _ => LeadError::IoError(e),
            })
            .and_then(|bytes| self.load_bytes(&bytes));
        if let Err(e) = result {
            self.fail_load(e);
        }
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), LeadError> {
        let loader = RecordStore::load_json(bytes)?;
        self.loader = Some(loader);
        self.status = Status::LOADING;
        self.set_status_message("Loading ...");
        Ok(())
    }

    fn fail_load(&mut self, error: LeadError) {
        info!("Loading aborted: {error}");
        self.load_error = Some(error.to_string());
        self.status = Status::EMPTY;
        self.set_status_message("Loading failed!");
    }

    /// One cooperative step of background work: ingest a batch while
    /// loading, apply a quiescent search term, preload the next page. Called
    /// once per host loop iteration, between renders.
    pub fn tick(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            let mut progress = self.load_progress;
            let done = loader.ingest_batch(&mut self.store, &mut |p| progress = p);
            self.load_progress = progress;
            if done {
                let elapsed = self.last_status_message_update.elapsed().as_millis();
                info!("Loaded {} records in {elapsed}ms", self.store.len());
                self.status = Status::READY;
                self.apply_pipeline();
                self.set_status_message(format!("Loaded {} leads ...", self.store.len()));
            } else {
                self.loader = Some(loader);
            }
            return;
        }

        if let Some(term) = self.search_debounce.poll() {
            trace!("Debounced search fired: \"{term}\"");
            self.filters.global = term;
            self.apply_pipeline();
        }

        self.preload_next_page();
    }

    /// Recompute the filtered/sorted view and everything derived from it.
    /// Every content mutation funnels through here, which is what keeps the
    /// render cache honest.
    fn apply_pipeline(&mut self) {
        let start_time = Instant::now();
        self.view = filter::apply(self.store.all(), &self.filters);
        if let Some(key) = self.sort.key.clone() {
            self.view = sort::sort(self.store.all(), &self.view, &key, self.sort.ascending);
        }
        self.stats = filter::stats(self.store.all(), &self.view);
        self.pager.reclamp(self.view.len());
        self.selected_card = 0;
        self.cache.invalidate();
        debug!(
            "Pipeline pass kept {}/{} records in {}ms",
            self.view.len(),
            self.store.len(),
            start_time.elapsed().as_millis()
        );
    }

    /// The rendered content of the current page, memoized per
    /// (page, page size, filtered size).
    pub fn page_view(&mut self) -> Arc<PageView> {
        let key = page_key(self.pager.page(), self.pager.page_size(), self.view.len());
        if let Some(page) = self.cache.get(key) {
            return page;
        }
        let page = Arc::new(self.build_page(self.pager.page()));
        self.cache.put(key, Arc::clone(&page));
        page
    }

    fn build_page(&self, page: usize) -> PageView {
        let mut pager = self.pager;
        pager.goto(page as i64, self.view.len());
        view::build_page(
            self.store.all(),
            pager.slice(&self.view),
            &self.fields,
            pager.page(),
            pager.total_pages(self.view.len()),
        )
    }

    // Speculatively render the page the user is most likely to visit next.
    // If they go elsewhere first the entry is merely unused, never wrong.
    fn preload_next_page(&mut self) {
        if self.status != Status::READY || self.view.is_empty() {
            return;
        }
        let current = page_key(self.pager.page(), self.pager.page_size(), self.view.len());
        let next_page = self.pager.page() + 1;
        if next_page > self.pager.total_pages(self.view.len()) {
            return;
        }
        let next = page_key(next_page, self.pager.page_size(), self.view.len());
        // Only after the current page has rendered at least once.
        if self.cache.contains(current) && !self.cache.contains(next) {
            trace!("Preloading page {next_page}");
            let page = Arc::new(self.build_page(next_page));
            self.cache.put(next, page);
        }
    }

    pub fn update(&mut self, message: Message) {
        if self.prompt.is_some() {
            if let Message::RawKey(key) = message {
                self.prompt_input(key);
            }
            return;
        }

        match message {
            Message::Quit => self.status = Status::QUITTING,
            Message::Exit => {
                self.show_help = false;
                self.show_columns = false;
            }
            Message::Help => self.show_help = true,
            Message::MoveUp => self.move_selection(-1),
            Message::MoveDown => self.move_selection(1),
            Message::NextPage => self.change_page(|p, n| p.next(n)),
            Message::PreviousPage => self.change_page(|p, n| p.previous(n)),
            Message::FirstPage => self.change_page(|p, _| p.first()),
            Message::LastPage => self.change_page(|p, n| p.last(n)),
            Message::JumpToPage => {
                self.prompt = Some(Prompt::new(PromptKind::Page, ""));
            }
            Message::CyclePageSize => {
                self.pager.cycle_page_size();
                self.selected_card = 0;
                self.set_status_message(format!("{} cards per page", self.pager.page_size()));
            }
            Message::GlobalSearch => {
                self.prompt = Some(Prompt::new(PromptKind::GlobalSearch, &self.filters.global));
            }
            Message::FilterName => self.open_field_prompt(fields::NOME),
            Message::FilterAccount => self.open_field_prompt(fields::CONTA_INSTA),
            Message::FilterSpecialty => self.open_field_prompt(fields::ESPECIALIDADES),
            Message::FilterCity => self.open_field_prompt(fields::CIDADE_ESTADO),
            Message::ToggleStatWhatsApp => {
                self.filters.stats.whatsapp = !self.filters.stats.whatsapp;
                self.apply_pipeline();
            }
            Message::ToggleStatSpecialty => {
                self.filters.stats.specialty = !self.filters.stats.specialty;
                self.apply_pipeline();
            }
            Message::ToggleStatLocation => {
                self.filters.stats.location = !self.filters.stats.location;
                self.apply_pipeline();
            }
            Message::ToggleStatEmail => {
                self.filters.stats.email = !self.filters.stats.email;
                self.apply_pipeline();
            }
            Message::ClearFilters => {
                self.filters.clear();
                self.search_debounce.cancel();
                self.apply_pipeline();
                self.set_status_message("Filters cleared");
            }
            Message::ToggleColumnPanel => self.show_columns = !self.show_columns,
            Message::ToggleColumn => self.toggle_column(),
            Message::SortColumn => self.sort_selected_column(),
            Message::ExportCSVFiltered => self.export(ExportMode::Filtered, false),
            Message::ExportCSVAll => self.export(ExportMode::All, false),
            Message::ExportCSVVisible => self.export(ExportMode::VisibleColumns, false),
            Message::ExportXLSX => self.export(ExportMode::Filtered, true),
            Message::CopyCard => self.copy_card(),
            Message::RawKey(_) => {}
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn prompt_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        let kind = prompt.kind;
        match prompt.handle_key(key) {
            PromptEvent::Edited(term) => {
                // Live filtering for the global search, coalesced through the
                // debouncer so rapid keystrokes cost one pipeline pass.
                if kind == PromptKind::GlobalSearch {
                    self.search_debounce.push(term);
                }
            }
            PromptEvent::Submitted(term) => {
                self.prompt = None;
                match kind {
                    PromptKind::GlobalSearch => {
                        self.search_debounce.cancel();
                        self.filters.global = term;
                        self.apply_pipeline();
                    }
                    PromptKind::Field(field_key) => {
                        self.filters.set_text(field_key, &term);
                        self.apply_pipeline();
                    }
                    PromptKind::Page => match term.trim().parse::<i64>() {
                        Ok(page) => self.change_page(|p, n| p.goto(page, n)),
                        Err(_) => self.set_status_message("Not a page number!"),
                    },
                }
            }
            PromptEvent::Canceled => {
                self.prompt = None;
                self.search_debounce.cancel();
            }
            PromptEvent::Ignored => {}
        }
    }

    fn open_field_prompt(&mut self, key: &'static str) {
        let current = self.filters.text(key).to_string();
        self.prompt = Some(Prompt::new(PromptKind::Field(key), &current));
    }

    fn change_page(&mut self, op: impl FnOnce(&mut PageState, usize)) {
        op(&mut self.pager, self.view.len());
        self.selected_card = 0;
    }

    fn move_selection(&mut self, step: i64) {
        if self.show_columns {
            let last = self.fields.len() as i64 - 1;
            self.column_curser = (self.column_curser as i64 + step).clamp(0, last) as usize;
        } else {
            let nrows = self.pager.slice(&self.view).len();
            if nrows > 0 {
                let last = nrows as i64 - 1;
                self.selected_card = (self.selected_card as i64 + step).clamp(0, last) as usize;
            }
        }
    }

    fn toggle_column(&mut self) {
        if !self.show_columns {
            return;
        }
        let field = &mut self.fields[self.column_curser];
        field.visible = !field.visible;
        trace!("Column \"{}\" visible: {}", field.key, field.visible);
        // Same view, different card content; the cache key cannot tell.
        self.cache.invalidate();
    }

    fn sort_selected_column(&mut self) {
        let key = self.fields[self.column_curser].key;
        self.sort.toggle(key);
        self.apply_pipeline();
        let direction = if self.sort.ascending { "asc" } else { "desc" };
        self.set_status_message(format!("Sorted by {key} ({direction})"));
    }

    fn export(&mut self, mode: ExportMode, xlsx: bool) {
        let date = chrono::Local::now().date_naive();
        let directory = PathBuf::from(".");
        let result = export::project(self.store.all(), &self.view, &self.fields, mode).and_then(
            |projection| {
                if xlsx {
                    export::write_xlsx(&projection, &directory, date)
                } else {
                    export::write_csv(
                        &projection,
                        &directory,
                        self.config.separator,
                        self.config.bom,
                        date,
                    )
                }
            },
        );
        match result {
            Ok(path) => self.set_status_message(format!("Exported {}", path.display())),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn copy_card(&mut self) {
        let window = self.pager.slice(&self.view);
        let Some(&idx) = window.get(self.selected_card) else {
            return;
        };
        let row = export::csv_row(&self.store.all()[idx], &self.fields, self.config.separator);
        match self.clipboard.as_mut().map(|c| c.set_text(row)) {
            Some(Ok(_)) => self.set_status_message("Copied card to clipboard"),
            Some(Err(e)) => trace!("Error copying to clipboard: {:?}", e),
            None => trace!("No clipboard available"),
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    // ----------------------- Accessors for the UI ------------------------- //

    pub fn raw_keyevents(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn pager(&self) -> &PageState {
        &self.pager
    }

    pub fn nrows(&self) -> usize {
        self.view.len()
    }

    pub fn total_records(&self) -> usize {
        self.store.len()
    }

    pub fn selected_card(&self) -> usize {
        self.selected_card
    }

    pub fn column_curser(&self) -> usize {
        self.column_curser
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn show_columns(&self) -> bool {
        self.show_columns
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn load_progress(&self) -> Progress {
        self.load_progress
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    const SAMPLE: &[u8] = br#"[
        {"Nome": "Ana", "Tem_WhatsApp": "Sim"},
        {"Nome": "Bia", "Tem_WhatsApp": "Nao"},
        {"Nome": "Caio", "Tem_WhatsApp": "Sim"}
    ]"#;

    fn ready_model() -> Model {
        let config = LeadConfig::default().debounce_ms(0);
        let mut model = Model::init(&config);
        model.load_bytes(SAMPLE).unwrap();
        while model.status == Status::LOADING {
            model.tick();
        }
        model
    }

    fn type_term(model: &mut Model, term: &str) {
        for chr in term.chars() {
            model.update(Message::RawKey(KeyEvent::new(
                KeyCode::Char(chr),
                KeyModifiers::NONE,
            )));
        }
        model.update(Message::RawKey(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )));
    }

    #[test]
    fn whatsapp_sort_and_paging_scenario() {
        let mut model = ready_model();
        assert_eq!(model.nrows(), 3);

        model.update(Message::ToggleStatWhatsApp);
        assert_eq!(model.nrows(), 2);
        let page = model.page_view();
        assert_eq!(page.cards[0].name, "Ana");
        assert_eq!(page.cards[1].name, "Caio");

        // Sorting by Nome ascending keeps [Ana, Caio].
        model.update(Message::ToggleColumnPanel);
        model.update(Message::MoveDown);
        model.update(Message::MoveDown);
        assert_eq!(model.column_curser(), 2); // Nome
        model.update(Message::SortColumn);
        model.update(Message::ToggleColumnPanel);
        let page = model.page_view();
        assert_eq!(page.cards[0].name, "Ana");
        assert_eq!(page.cards[1].name, "Caio");

        // Page size 1, page 2 shows Caio.
        model.pager.set_page_size(1);
        model.update(Message::NextPage);
        let page = model.page_view();
        assert_eq!(page.cards.len(), 1);
        assert_eq!(page.cards[0].name, "Caio");
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn global_search_via_prompt() {
        let mut model = ready_model();
        model.update(Message::GlobalSearch);
        assert!(model.raw_keyevents());
        type_term(&mut model, "caio");
        assert!(!model.raw_keyevents());
        assert_eq!(model.nrows(), 1);
        assert_eq!(model.page_view().cards[0].name, "Caio");

        model.update(Message::ClearFilters);
        assert_eq!(model.nrows(), 3);
    }

    #[test]
    fn debounced_search_applies_on_tick() {
        let mut model = ready_model();
        model.update(Message::GlobalSearch);
        model.update(Message::RawKey(KeyEvent::new(
            KeyCode::Char('b'),
            KeyModifiers::NONE,
        )));
        // Zero debounce window in tests: the term fires on the next tick.
        model.tick();
        assert_eq!(model.nrows(), 1);
        assert_eq!(model.page_view().cards[0].name, "Bia");
    }

    #[test]
    fn filter_mutations_invalidate_the_cache() {
        let mut model = ready_model();
        let _ = model.page_view();
        assert_eq!(model.cache.len(), 1);

        model.update(Message::ToggleStatWhatsApp);
        assert!(model.cache.is_empty());

        // Pagination alone does not invalidate.
        let _ = model.page_view();
        model.update(Message::NextPage);
        assert_eq!(model.cache.len(), 1);
    }

    #[test]
    fn column_toggle_invalidates_but_keeps_view() {
        let mut model = ready_model();
        let _ = model.page_view();
        model.update(Message::ToggleColumnPanel);
        model.update(Message::ToggleColumn);
        assert!(model.cache.is_empty());
        assert_eq!(model.nrows(), 3);
    }

    #[test]
    fn preload_inserts_next_page() {
        let mut model = ready_model();
        model.pager.set_page_size(1);
        let _ = model.page_view();
        assert_eq!(model.cache.len(), 1);
        model.tick();
        assert_eq!(model.cache.len(), 2);
        let next = page_key(2, 1, 3);
        assert_eq!(model.cache.get(next).unwrap().cards[0].name, "Bia");
    }

    #[test]
    fn jump_prompt_clamps() {
        let mut model = ready_model();
        model.pager.set_page_size(1);
        model.update(Message::JumpToPage);
        type_term(&mut model, "-5");
        assert_eq!(model.pager().page(), 1);
        model.update(Message::JumpToPage);
        type_term(&mut model, "99");
        assert_eq!(model.pager().page(), 3);
    }

    #[test]
    fn load_failure_is_inline_not_fatal() {
        let config = LeadConfig::default();
        let mut model = Model::init(&config);
        model.load_data_file(Path::new("/nonexistent/leads.json"));
        assert_eq!(model.status, Status::EMPTY);
        assert!(model.load_error().unwrap().contains("File not found"));
    }
}
