//! Canonical contact record shared by both sides of the diff.

use serde::{Deserialize, Serialize};

/// A contact as seen by either the CSV source or the remote directory.
///
/// `email` is the identity key; comparison is case-insensitive via
/// [`ContactRecord::email_key`]. `remote_id` is present only for records that
/// already exist remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Identity key, unique per side, compared case-insensitively.
    pub email: String,
    /// Given (first) name. Required; records without it are filtered upstream.
    pub given_name: String,
    /// Surname (last name). Required.
    pub surname: String,
    /// Business phone number.
    pub business_phone: Option<String>,
    /// Mobile phone number.
    pub mobile: Option<String>,
    /// Department. Required.
    pub department: String,
    /// Job title. Required.
    pub job_title: String,
    /// Office location. Required.
    pub office_location: String,
    /// Directory object id, absent for CSV-only records.
    pub remote_id: Option<String>,
}

impl ContactRecord {
    /// Lower-cased, trimmed email used as the map key on both sides.
    #[must_use]
    pub fn email_key(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Display name in "Given Surname" form, used for directory payloads.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.given_name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }

    /// Compares every field that participates in the diff (everything except
    /// `email` and `remote_id`) with trimmed exact string equality.
    #[must_use]
    pub fn comparable_fields_equal(&self, other: &Self) -> bool {
        eq_trimmed(&self.given_name, &other.given_name)
            && eq_trimmed(&self.surname, &other.surname)
            && eq_optional(self.business_phone.as_deref(), other.business_phone.as_deref())
            && eq_optional(self.mobile.as_deref(), other.mobile.as_deref())
            && eq_trimmed(&self.department, &other.department)
            && eq_trimmed(&self.job_title, &other.job_title)
            && eq_trimmed(&self.office_location, &other.office_location)
    }
}

fn eq_trimmed(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

/// Empty string and absent value both mean "no value" and compare equal.
fn eq_optional(a: Option<&str>, b: Option<&str>) -> bool {
    a.map(str::trim).unwrap_or("") == b.map(str::trim).unwrap_or("")
}
