use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::trace;

use crate::fields::{CIDADE_ESTADO, ESPECIALIDADES, TEM_WHATSAPP, WHATSAPP_YES};
use crate::store::Record;

/// Presence filter for phone/email style fields: either the field holds a
/// real value, or it is empty (absent or an empty sentinel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
    Has,
    Empty,
}

/// Derived boolean filters tied to the summary statistics. Each toggles
/// independently and defaults to off.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatFilters {
    pub specialty: bool,
    pub location: bool,
    pub whatsapp: bool,
    pub email: bool,
}

/// The complete active filter configuration. All predicates are conjunctive;
/// only the global search is a union over fields.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub global: String,
    text: HashMap<String, String>,
    allowed: HashMap<String, HashSet<String>>,
    presence: HashMap<String, Presence>,
    pub stats: StatFilters,
}

impl FilterState {
    /// Set or clear (empty term) the substring filter for one field.
    pub fn set_text(&mut self, key: &str, term: &str) {
        if term.is_empty() {
            self.text.remove(key);
        } else {
            self.text.insert(key.to_string(), term.to_lowercase());
        }
    }

    pub fn text(&self, key: &str) -> &str {
        self.text.get(key).map(String::as_str).unwrap_or("")
    }

    /// Restrict a field to a set of literal values. An empty set means no
    /// restriction, not "exclude everything".
    pub fn set_allowed(&mut self, key: &str, values: HashSet<String>) {
        if values.is_empty() {
            self.allowed.remove(key);
        } else {
            self.allowed.insert(key.to_string(), values);
        }
    }

    pub fn set_presence(&mut self, key: &str, presence: Option<Presence>) {
        match presence {
            Some(p) => self.presence.insert(key.to_string(), p),
            None => self.presence.remove(key),
        };
    }

    pub fn clear(&mut self) {
        self.global.clear();
        self.text.clear();
        self.allowed.clear();
        self.presence.clear();
        self.stats = StatFilters::default();
    }

    fn matches(&self, record: &Record) -> bool {
        if !self.global.is_empty() {
            let term = self.global.to_lowercase();
            let any = record
                .values()
                .any(|value| value.to_lowercase().contains(&term));
            if !any {
                return false;
            }
        }

        for (key, term) in self.text.iter() {
            // A missing field reads as empty and fails any non-empty term.
            if !record.get(key).to_lowercase().contains(term) {
                return false;
            }
        }

        for (key, values) in self.allowed.iter() {
            if !values.contains(record.get(key)) {
                return false;
            }
        }

        for (key, presence) in self.presence.iter() {
            let has = record.has_value(key);
            match presence {
                Presence::Has if !has => return false,
                Presence::Empty if has => return false,
                _ => {}
            }
        }

        let stats = &self.stats;
        if stats.specialty && !record.has_value(ESPECIALIDADES) {
            return false;
        }
        if stats.location && !record.has_value(CIDADE_ESTADO) {
            return false;
        }
        if stats.whatsapp && record.get(TEM_WHATSAPP) != WHATSAPP_YES {
            return false;
        }
        if stats.email && !has_any_email(record) {
            return false;
        }
        true
    }
}

fn has_any_email(record: &Record) -> bool {
    record.has_value(crate::fields::EMAIL) || record.has_value(crate::fields::EMAIL_BIO)
}

/// Evaluate the filter configuration over the full data set. Pure and
/// deterministic; the returned row indices are ascending, so the original
/// relative order of matching records is preserved.
pub fn apply(records: &[Record], state: &FilterState) -> Vec<usize> {
    let mut matches: Vec<usize> = records
        .par_iter()
        .enumerate()
        .filter(|(_, record)| state.matches(record))
        .map(|(idx, _)| idx)
        .collect();
    // Parallel evaluation may interleave chunks, keep the source order.
    matches.sort_unstable();
    trace!("Filter kept {}/{} records", matches.len(), records.len());
    matches
}

/// Summary statistics over the filtered view, shown in the status header.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub filtered: usize,
    pub with_specialty: usize,
    pub with_location: usize,
    pub with_whatsapp: usize,
}

pub fn stats(records: &[Record], view: &[usize]) -> Stats {
    let mut stats = Stats {
        filtered: view.len(),
        ..Stats::default()
    };
    for &idx in view {
        let record = &records[idx];
        if record.has_value(ESPECIALIDADES) {
            stats.with_specialty += 1;
        }
        if record.has_value(CIDADE_ESTADO) {
            stats.with_location += 1;
        }
        if record.get(TEM_WHATSAPP) == WHATSAPP_YES {
            stats.with_whatsapp += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{EMAIL_BIO, NOME, TELEFONE};

    fn sample() -> Vec<Record> {
        vec![
            Record::from_pairs(&[
                (NOME, "Ana"),
                (TEM_WHATSAPP, "Sim"),
                (ESPECIALIDADES, "Ortodontia"),
                (TELEFONE, "11999990000"),
            ]),
            Record::from_pairs(&[(NOME, "Bia"), (TEM_WHATSAPP, "Nao"), (TELEFONE, "0")]),
            Record::from_pairs(&[
                (NOME, "Caio"),
                (TEM_WHATSAPP, "Sim"),
                (CIDADE_ESTADO, "Recife/PE"),
                (EMAIL_BIO, "caio@example.com"),
            ]),
        ]
    }

    #[test]
    fn empty_state_is_identity() {
        let records = sample();
        assert_eq!(apply(&records, &FilterState::default()), vec![0, 1, 2]);
    }

    #[test]
    fn output_preserves_original_order() {
        let records = sample();
        let mut state = FilterState::default();
        state.global = "a".to_string();
        let view = apply(&records, &state);
        assert!(view.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn global_search_unions_over_fields() {
        let records = sample();
        let mut state = FilterState::default();
        state.global = "caio".to_string();
        assert_eq!(apply(&records, &state), vec![2]);

        // Matches the email field too, case-insensitively.
        state.global = "EXAMPLE.COM".to_string();
        assert_eq!(apply(&records, &state), vec![2]);
    }

    #[test]
    fn field_filter_misses_absent_fields() {
        let records = sample();
        let mut state = FilterState::default();
        state.set_text(CIDADE_ESTADO, "recife");
        assert_eq!(apply(&records, &state), vec![2]);

        // Clearing the term removes the filter.
        state.set_text(CIDADE_ESTADO, "");
        assert_eq!(apply(&records, &state), vec![0, 1, 2]);
    }

    #[test]
    fn whatsapp_stat_filter() {
        let records = sample();
        let mut state = FilterState::default();
        state.stats.whatsapp = true;
        assert_eq!(apply(&records, &state), vec![0, 2]);
    }

    #[test]
    fn predicates_are_conjunctive() {
        let records = sample();
        let mut state = FilterState::default();
        state.stats.whatsapp = true;
        state.set_text(NOME, "caio");
        assert_eq!(apply(&records, &state), vec![2]);

        state.global = "ana".to_string();
        assert!(apply(&records, &state).is_empty());
    }

    #[test]
    fn allowed_set_and_presence() {
        let records = sample();
        let mut state = FilterState::default();
        state.set_allowed(
            NOME,
            ["Ana", "Bia"].iter().map(|s| s.to_string()).collect(),
        );
        assert_eq!(apply(&records, &state), vec![0, 1]);

        // Empty allowed set means no restriction.
        state.set_allowed(NOME, HashSet::new());
        assert_eq!(apply(&records, &state), vec![0, 1, 2]);

        state.set_presence(TELEFONE, Some(Presence::Has));
        assert_eq!(apply(&records, &state), vec![0]);
        state.set_presence(TELEFONE, Some(Presence::Empty));
        assert_eq!(apply(&records, &state), vec![1, 2]);
        state.set_presence(TELEFONE, None);
        assert_eq!(apply(&records, &state), vec![0, 1, 2]);
    }

    #[test]
    fn stats_summary() {
        let records = sample();
        let view = vec![0, 1, 2];
        let stats = stats(&records, &view);
        assert_eq!(stats.filtered, 3);
        assert_eq!(stats.with_specialty, 1);
        assert_eq!(stats.with_location, 1);
        assert_eq!(stats.with_whatsapp, 2);
    }
}
