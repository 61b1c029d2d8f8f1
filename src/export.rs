use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{CSVSeparator, LeadError};
use crate::fields::FieldDescriptor;
use crate::store::Record;

const EXPORT_BASE: &str = "leads_odonto";
const SHEET_NAME: &str = "Dados";
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportMode {
    All,
    Filtered,
    VisibleColumns,
}

impl ExportMode {
    fn suffix(&self) -> &'static str {
        match self {
            ExportMode::All => "todos",
            ExportMode::Filtered => "filtrados",
            ExportMode::VisibleColumns => "colunas",
        }
    }
}

/// Column-projected copy of a data set, ready for a serializer: ordered
/// headers, per-column width hints and stringified rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub headers: Vec<String>,
    pub widths: Vec<u16>,
    pub rows: Vec<Vec<String>>,
    pub stem: String,
}

impl Projection {
    pub fn filename(&self, extension: &str, date: NaiveDate) -> String {
        format!("{}_{}.{extension}", self.stem, date.format("%Y-%m-%d"))
    }
}

/// Project records for export. `All` ignores the filtered view,
/// `VisibleColumns` additionally drops hidden columns. An empty result is an
/// error surfaced to the user, nothing is written.
pub fn project(
    records: &[Record],
    view: &[usize],
    fields: &[FieldDescriptor],
    mode: ExportMode,
) -> Result<Projection, LeadError> {
    let columns: Vec<&FieldDescriptor> = match mode {
        ExportMode::VisibleColumns => fields.iter().filter(|f| f.visible).collect(),
        _ => fields.iter().collect(),
    };

    let indices: Vec<usize> = match mode {
        ExportMode::All => (0..records.len()).collect(),
        _ => view.to_vec(),
    };

    let rows: Vec<Vec<String>> = indices
        .iter()
        .map(|&idx| {
            columns
                .iter()
                .map(|field| records[idx].get(field.key).to_string())
                .collect()
        })
        .collect();

    if rows.is_empty() || columns.is_empty() {
        return Err(LeadError::EmptyExport);
    }

    Ok(Projection {
        headers: columns.iter().map(|f| f.label.to_string()).collect(),
        widths: columns.iter().map(|f| f.width).collect(),
        rows,
        stem: format!("{EXPORT_BASE}_{}", mode.suffix()),
    })
}

/// Quote a cell the way spreadsheets expect: double the quotes, wrap when
/// the value contains the separator, a quote or a line break.
pub fn escape_cell(value: &str, separator: char) -> String {
    let needs_wrapping = value
        .chars()
        .any(|c| c == separator || c == '"' || c == '\n' || c == '\r');
    if needs_wrapping {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn csv_bytes(projection: &Projection, separator: CSVSeparator, bom: bool) -> Vec<u8> {
    let sep = separator.as_char();
    let mut out = String::new();
    let header: Vec<String> = projection
        .headers
        .iter()
        .map(|h| escape_cell(h, sep))
        .collect();
    out.push_str(&header.join(&sep.to_string()));
    out.push('\n');
    for row in projection.rows.iter() {
        let cells: Vec<String> = row.iter().map(|v| escape_cell(v, sep)).collect();
        out.push_str(&cells.join(&sep.to_string()));
        out.push('\n');
    }

    let mut bytes = Vec::with_capacity(out.len() + 3);
    if bom {
        bytes.extend_from_slice(&UTF8_BOM);
    }
    bytes.extend_from_slice(out.as_bytes());
    bytes
}

pub fn write_csv(
    projection: &Projection,
    directory: &Path,
    separator: CSVSeparator,
    bom: bool,
    date: NaiveDate,
) -> Result<PathBuf, LeadError> {
    let path = directory.join(projection.filename("csv", date));
    fs::write(&path, csv_bytes(projection, separator, bom))?;
    info!("Exported {} rows to {}", projection.rows.len(), path.display());
    Ok(path)
}

/// Write a single-sheet workbook with the projection's width hints.
pub fn write_xlsx(
    projection: &Projection,
    directory: &Path,
    date: NaiveDate,
) -> Result<PathBuf, LeadError> {
    let path = directory.join(projection.filename("xlsx", date));
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, header) in projection.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &bold)?;
        sheet.set_column_width(col as u16, projection.widths[col] as f64)?;
    }
    for (ridx, row) in projection.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet.write_string(ridx as u32 + 1, col as u16, value)?;
        }
    }
    workbook.save(&path)?;
    info!("Exported {} rows to {}", projection.rows.len(), path.display());
    Ok(path)
}

/// One record as an escaped CSV line, used for clipboard copy.
pub fn csv_row(record: &Record, fields: &[FieldDescriptor], separator: CSVSeparator) -> String {
    let sep = separator.as_char();
    fields
        .iter()
        .map(|field| escape_cell(record.get(field.key), sep))
        .collect::<Vec<String>>()
        .join(&sep.to_string())
}
