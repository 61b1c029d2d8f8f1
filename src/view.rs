//! Pure computation of the card representation of one page. Rendering the
//! result to the terminal happens in ui.rs; nothing in here touches ratatui.

use crate::fields::{
    self, BIO, CONTA_INSTA, EMAIL, EMAIL_BIO, FieldDescriptor, NOME, TEM_WHATSAPP, WHATSAPP_YES,
};
use crate::store::Record;

/// One lead, reduced to what the card shows: title line, badge and the
/// detail lines of the visible non-empty fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub name: String,
    pub handle: Option<String>,
    pub whatsapp: bool,
    pub details: Vec<(String, String)>,
}

/// Precomputed content of one page, the unit stored in the render cache.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub cards: Vec<CardView>,
    pub page: usize,
    pub total_pages: usize,
}

pub fn build_page(
    records: &[Record],
    window: &[usize],
    fields: &[FieldDescriptor],
    page: usize,
    total_pages: usize,
) -> PageView {
    let cards = window
        .iter()
        .map(|&idx| build_card(&records[idx], fields))
        .collect();
    PageView {
        cards,
        page,
        total_pages,
    }
}

fn visible(fields: &[FieldDescriptor], key: &str) -> bool {
    fields.iter().any(|f| f.key == key && f.visible)
}

pub fn build_card(record: &Record, fields: &[FieldDescriptor]) -> CardView {
    let name = if visible(fields, NOME) {
        let name = record.get(NOME);
        if name.is_empty() {
            "Sem nome".to_string()
        } else {
            name.to_string()
        }
    } else {
        String::new()
    };

    let handle = (visible(fields, CONTA_INSTA) && record.has_value(CONTA_INSTA))
        .then(|| format!("@{}", record.get(CONTA_INSTA)));

    let whatsapp = visible(fields, TEM_WHATSAPP) && record.get(TEM_WHATSAPP) == WHATSAPP_YES;

    // The primary e-mail is only shown when the bio e-mail is hidden or
    // empty, mirroring the original card layout.
    let bio_email_shown = visible(fields, EMAIL_BIO) && record.has_value(EMAIL_BIO);

    let mut details = Vec::new();
    for field in fields {
        if !field.visible || matches!(field.key, NOME | CONTA_INSTA | TEM_WHATSAPP) {
            continue;
        }
        if field.key == EMAIL && bio_email_shown {
            continue;
        }
        if !record.has_value(field.key) {
            continue;
        }
        let value = if fields::is_phone_field(field.key) {
            format_phone_list(record.get(field.key))
        } else if field.key == BIO {
            truncate_bio(record.get(BIO))
        } else {
            record.get(field.key).to_string()
        };
        if !value.is_empty() {
            details.push((field.label.to_string(), value));
        }
    }

    CardView {
        name,
        handle,
        whatsapp,
        details,
    }
}

const BIO_PREVIEW: usize = 150;

fn truncate_bio(bio: &str) -> String {
    if bio.chars().count() > BIO_PREVIEW {
        let preview: String = bio.chars().take(BIO_PREVIEW).collect();
        format!("{preview}…")
    } else {
        bio.to_string()
    }
}

/// Format one Brazilian phone number by digit count; anything unexpected is
/// passed through untouched.
pub fn format_phone(phone: &str) -> String {
    if phone.is_empty() || phone == "0" {
        return String::new();
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!(
            "({}) {} {}-{}",
            &digits[0..2],
            &digits[2..3],
            &digits[3..7],
            &digits[7..]
        ),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..]),
        9 => format!("{} {}-{}", &digits[0..1], &digits[1..5], &digits[5..]),
        _ => phone.to_string(),
    }
}

/// Format a comma-joined phone list element-wise, dropping empties.
pub fn format_phone_list(phones: &str) -> String {
    if phones.is_empty() || phones == "0" {
        return String::new();
    }
    phones
        .split(',')
        .map(|p| format_phone(p.trim()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{CIDADE_ESTADO, TELEFONE, lead_fields};

    #[test]
    fn phone_formats_by_digit_count() {
        assert_eq!(format_phone("11987654321"), "(11) 9 8765-4321");
        assert_eq!(format_phone("1187654321"), "(11) 8765-4321");
        assert_eq!(format_phone("987654321"), "9 8765-4321");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 9 8765-4321");
        assert_eq!(format_phone("12345"), "12345");
        assert_eq!(format_phone("0"), "");
    }

    #[test]
    fn phone_list_drops_empties() {
        assert_eq!(
            format_phone_list("11987654321, 0, 1187654321"),
            "(11) 9 8765-4321, (11) 8765-4321"
        );
        assert_eq!(format_phone_list("0"), "");
    }

    #[test]
    fn card_respects_visibility_and_empties() {
        let fields = lead_fields();
        let record = Record::from_pairs(&[
            (NOME, "Ana"),
            (CONTA_INSTA, "dra.ana"),
            (TEM_WHATSAPP, "Sim"),
            (TELEFONE, "11987654321"),
            (CIDADE_ESTADO, "0"),
            ("Idioma", "pt"),
        ]);
        let card = build_card(&record, &fields);
        assert_eq!(card.name, "Ana");
        assert_eq!(card.handle.as_deref(), Some("@dra.ana"));
        assert!(card.whatsapp);
        // Telefone shows formatted; the sentinel city and the hidden Idioma
        // column do not.
        assert_eq!(
            card.details,
            vec![(
                "Telefone Principal".to_string(),
                "(11) 9 8765-4321".to_string()
            )]
        );
    }

    #[test]
    fn unnamed_lead_gets_placeholder() {
        let card = build_card(&Record::from_pairs(&[]), &lead_fields());
        assert_eq!(card.name, "Sem nome");
        assert!(card.handle.is_none());
        assert!(!card.whatsapp);
    }

    #[test]
    fn bio_email_suppresses_primary_email() {
        let mut fields = lead_fields();
        for f in fields.iter_mut() {
            if f.key == EMAIL {
                f.visible = true;
            }
        }
        let record = Record::from_pairs(&[
            (EMAIL, "primary@example.com"),
            (EMAIL_BIO, "bio@example.com"),
        ]);
        let card = build_card(&record, &fields);
        let labels: Vec<&str> = card.details.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Email (Bio)"]);

        let record = Record::from_pairs(&[(EMAIL, "primary@example.com")]);
        let card = build_card(&record, &fields);
        let labels: Vec<&str> = card.details.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["E-mail Principal"]);
    }
}
