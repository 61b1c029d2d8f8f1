use tracing::trace;

use crate::store::Record;

/// Single-key sort configuration. Only one field is ever active.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    pub key: Option<String>,
    pub ascending: bool,
}

impl SortState {
    /// Select a sort field, flipping the direction when it is already the
    /// active one.
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.ascending = !self.ascending;
        } else {
            self.key = Some(key.to_string());
            self.ascending = true;
        }
    }
}

/// Stable sort of the row-index view by one field. Missing values coerce to
/// the empty string and values compare case-insensitively.
pub fn sort(records: &[Record], view: &[usize], key: &str, ascending: bool) -> Vec<usize> {
    let mut sorted = view.to_vec();
    sorted.sort_by(|&a, &b| {
        let left = records[a].get(key).to_lowercase();
        let right = records[b].get(key).to_lowercase();
        if ascending {
            left.cmp(&right)
        } else {
            right.cmp(&left)
        }
    });
    trace!("Sorted {} rows by \"{key}\"", sorted.len());
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::NOME;

    fn by_name(names: &[&str]) -> Vec<Record> {
        names
            .iter()
            .map(|n| Record::from_pairs(&[(NOME, n)]))
            .collect()
    }

    #[test]
    fn sorts_case_insensitively() {
        let records = by_name(&["bia", "Ana", "Caio"]);
        let view = vec![0, 1, 2];
        assert_eq!(sort(&records, &view, NOME, true), vec![1, 0, 2]);
    }

    #[test]
    fn toggled_direction_reverses_distinct_keys() {
        let records = by_name(&["Caio", "Ana", "Bia"]);
        let view = vec![0, 1, 2];
        let asc = sort(&records, &view, NOME, true);
        let mut desc = sort(&records, &view, NOME, false);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn missing_values_sort_as_empty() {
        let records = vec![
            Record::from_pairs(&[(NOME, "Ana")]),
            Record::from_pairs(&[]),
        ];
        assert_eq!(sort(&records, &[0, 1], NOME, true), vec![1, 0]);
    }

    #[test]
    fn stable_on_equal_keys() {
        let records = by_name(&["Ana", "Ana", "Ana"]);
        assert_eq!(sort(&records, &[0, 1, 2], NOME, true), vec![0, 1, 2]);
    }

    #[test]
    fn toggle_flips_direction() {
        let mut state = SortState::default();
        state.toggle(NOME);
        assert!(state.ascending);
        state.toggle(NOME);
        assert!(!state.ascending);
        state.toggle("Cidade_Estado");
        assert!(state.ascending);
    }
}
