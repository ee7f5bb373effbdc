//! Postal records printed on labels

use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reading records
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to read records: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse records JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One addressee
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MailingLabelRecord {
    #[serde(alias = "contactName", alias = "name")]
    pub contact_name: String,
    #[serde(alias = "addressLine1", alias = "address1")]
    pub address_line1: String,
    #[serde(default, alias = "addressLine2", alias = "address2")]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, alias = "zipCode", alias = "postal_code")]
    pub zip: String,
}

impl MailingLabelRecord {
    pub fn new(
        contact_name: impl Into<String>,
        address_line1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            contact_name: contact_name.into(),
            address_line1: address_line1.into(),
            address_line2: None,
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    /// Set the second address line
    pub fn with_address_line2(mut self, line: impl Into<String>) -> Self {
        self.address_line2 = Some(line.into());
        self
    }

    /// "City, State ZIP"; the comma only appears when both city and state are present
    pub fn city_line(&self) -> String {
        let city = self.city.trim();
        let state = self.state.trim();
        let zip = self.zip.trim();

        let mut line = match (city.is_empty(), state.is_empty()) {
            (false, false) => format!("{}, {}", city, state),
            (false, true) => city.to_string(),
            (true, false) => state.to_string(),
            (true, true) => String::new(),
        };
        if !zip.is_empty() {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(zip);
        }
        line
    }

    /// Body lines of the recipient block, blank lines skipped
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.contact_name.trim().to_string(),
            self.address_line1.trim().to_string(),
        ];
        if let Some(line2) = &self.address_line2 {
            lines.push(line2.trim().to_string());
        }
        lines.push(self.city_line());
        lines.retain(|line| !line.is_empty());
        lines
    }
}

/// Parse a JSON array of records
pub fn parse_records_json(content: &str) -> Result<Vec<MailingLabelRecord>, RecordError> {
    Ok(serde_json::from_str(content)?)
}

/// Read a JSON array of records from any reader
pub fn read_records_json(mut reader: impl Read) -> Result<Vec<MailingLabelRecord>, RecordError> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_records_json(&content)
}
