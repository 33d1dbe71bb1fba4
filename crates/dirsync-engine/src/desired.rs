//! Desired-state loader: parses the hand-edited CSV source of truth.
//!
//! The CSV is edited by humans between runs, so row-level problems are
//! warnings rather than failures: blank trailing rows, rows missing required
//! fields and duplicate emails all skip the row and record why. Only an
//! unreadable file or a broken header is fatal, since then the desired state
//! cannot be interpreted at all.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::record::ContactRecord;
use crate::report::LoadWarning;

/// Expected CSV columns, in canonical order. Matching is by header name, so
/// a reordered file still loads.
pub const CSV_HEADERS: [&str; 8] = [
    "Given Name",
    "Surname",
    "Email",
    "Business Phone",
    "Mobile",
    "Department",
    "Job Title",
    "Office Location",
];

const WARN_CONTEXT: &str = "csv-load";

/// Parsed desired state: records keyed by lower-cased email plus the
/// warnings accumulated while parsing.
#[derive(Debug, Default)]
pub struct DesiredState {
    pub records: BTreeMap<String, ContactRecord>,
    pub warnings: Vec<LoadWarning>,
}

/// Column indices resolved from the header row.
struct ColumnMap {
    given_name: usize,
    surname: usize,
    email: usize,
    business_phone: usize,
    mobile: usize,
    department: usize,
    job_title: usize,
    office_location: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> SyncResult<Self> {
        let find = |name: &str| -> SyncResult<usize> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| SyncError::DesiredLoad(format!("missing column '{name}'")))
        };

        Ok(Self {
            given_name: find("Given Name")?,
            surname: find("Surname")?,
            email: find("Email")?,
            business_phone: find("Business Phone")?,
            mobile: find("Mobile")?,
            department: find("Department")?,
            job_title: find("Job Title")?,
            office_location: find("Office Location")?,
        })
    }
}

/// Loads the desired contact set from `path`.
///
/// # Errors
///
/// Returns [`SyncError::DesiredLoad`] when the file cannot be read or the
/// header row is missing a required column. Row-level problems become
/// warnings on the returned [`DesiredState`].
pub fn load_desired(path: &Path) -> SyncResult<DesiredState> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| SyncError::DesiredLoad(format!("{}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| SyncError::DesiredLoad(format!("failed to read header row: {e}")))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut state = DesiredState::default();

    for (idx, row) in reader.records().enumerate() {
        // Header is line 1, first data row is line 2.
        let line = idx + 2;

        let row = match row {
            Ok(row) => row,
            Err(e) => {
                state.warnings.push(LoadWarning::new(
                    WARN_CONTEXT,
                    None,
                    format!("line {line}: unparsable row skipped: {e}"),
                ));
                continue;
            }
        };

        let field = |i: usize| row.get(i).unwrap_or("").trim().to_string();

        let email = field(columns.email);
        if email.is_empty() {
            // Blank trailing rows from hand editing are expected.
            state.warnings.push(LoadWarning::new(
                WARN_CONTEXT,
                None,
                format!("line {line}: row without email skipped"),
            ));
            continue;
        }

        let required = [
            ("Given Name", field(columns.given_name)),
            ("Surname", field(columns.surname)),
            ("Department", field(columns.department)),
            ("Job Title", field(columns.job_title)),
            ("Office Location", field(columns.office_location)),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            state.warnings.push(LoadWarning::new(
                WARN_CONTEXT,
                Some(email.clone()),
                format!("line {line}: row missing required field '{name}' skipped"),
            ));
            continue;
        }
        let [given_name, surname, department, job_title, office_location] =
            required.map(|(_, value)| value);

        let optional = |value: String| if value.is_empty() { None } else { Some(value) };
        let record = ContactRecord {
            email,
            given_name,
            surname,
            business_phone: optional(field(columns.business_phone)),
            mobile: optional(field(columns.mobile)),
            department,
            job_title,
            office_location,
            remote_id: None,
        };

        let key = record.email_key();
        if state.records.contains_key(&key) {
            // Desired state is the latest row for a given identity.
            state.warnings.push(LoadWarning::new(
                WARN_CONTEXT,
                Some(record.email.clone()),
                format!("line {line}: duplicate email, last row wins"),
            ));
        }
        state.records.insert(key, record);
    }

    debug!(
        records = state.records.len(),
        warnings = state.warnings.len(),
        "loaded desired state from {}",
        path.display()
    );

    Ok(state)
}

/// Writes records back out in the canonical column order.
///
/// Used by the export command; the engine itself never rewrites the CSV, the
/// file may be hand-edited externally between runs.
pub fn save_csv<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ContactRecord>,
) -> SyncResult<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| SyncError::CsvWrite(format!("{}: {e}", path.display())))?;

    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| SyncError::CsvWrite(e.to_string()))?;

    for record in records {
        writer
            .write_record([
                record.given_name.as_str(),
                record.surname.as_str(),
                record.email.as_str(),
                record.business_phone.as_deref().unwrap_or(""),
                record.mobile.as_deref().unwrap_or(""),
                record.department.as_str(),
                record.job_title.as_str(),
                record.office_location.as_str(),
            ])
            .map_err(|e| SyncError::CsvWrite(e.to_string()))?;
    }

    writer.flush().map_err(|e| SyncError::CsvWrite(e.to_string()))
}
