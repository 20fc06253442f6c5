//! Invoice Reference Number (IRN) construction and parsing
//!
//! Format: `{InvoiceNumber}-{ServiceID}-{DateStamp}`, e.g.
//! `INV-2024-001-94ND90NR-20240611`. The invoice number may itself
//! contain hyphens, so parsing always takes the LAST two hyphen-delimited
//! tokens as the service ID and date stamp and rejoins everything before
//! them as the invoice number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{EinvoiceError, EinvoiceResult};
use crate::utils::validation::validate_invoice_number;

const SERVICE_ID_LEN: usize = 8;
const DATE_STAMP_FORMAT: &str = "%Y%m%d";

/// Components extracted from an IRN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrnComponents {
    pub invoice_number: String,
    pub service_id: String,
    pub date_stamp: String,
    pub issue_date: NaiveDate,
}

/// Build an IRN from an invoice number, service ID, and issue date.
///
/// The service ID is coerced to exactly 8 uppercase alphanumerics:
/// longer IDs are truncated, shorter ones left-padded with zeros. When
/// no issue date is given the stamp is taken from today's date.
pub fn build(
    invoice_number: &str,
    service_id: &str,
    issue_date: Option<NaiveDate>,
) -> EinvoiceResult<String> {
    let invoice_number = invoice_number.trim().to_uppercase();
    validate_invoice_number(&invoice_number)?;

    let service_id = coerce_service_id(service_id)?;
    let date_stamp = date_stamp(issue_date);

    Ok(format!("{}-{}-{}", invoice_number, service_id, date_stamp))
}

/// Generate a random 8-character service ID
pub fn generate_service_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string().to_uppercase();
    uuid[..SERVICE_ID_LEN].to_string()
}

/// Check whether a string is a well-formed IRN
pub fn validate(irn: &str) -> bool {
    let parts: Vec<&str> = irn.split('-').collect();
    if parts.len() < 3 {
        return false;
    }

    let date_stamp = parts[parts.len() - 1];
    let service_id = parts[parts.len() - 2];
    let invoice_number = parts[..parts.len() - 2].join("-");

    if invoice_number.is_empty() {
        return false;
    }
    if service_id.len() != SERVICE_ID_LEN
        || !service_id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return false;
    }
    if date_stamp.len() != 8 || !date_stamp.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    NaiveDate::parse_from_str(date_stamp, DATE_STAMP_FORMAT).is_ok()
}

/// Parse an IRN into its components
///
/// Fails with a format error when the IRN does not match the grammar;
/// never returns a partially populated result.
pub fn parse(irn: &str) -> EinvoiceResult<IrnComponents> {
    if !validate(irn) {
        return Err(EinvoiceError::Format(format!("Invalid IRN: {}", irn)));
    }

    let parts: Vec<&str> = irn.split('-').collect();
    let date_stamp = parts[parts.len() - 1].to_string();
    let service_id = parts[parts.len() - 2].to_string();
    let invoice_number = parts[..parts.len() - 2].join("-");

    let issue_date = NaiveDate::parse_from_str(&date_stamp, DATE_STAMP_FORMAT)
        .map_err(|e| EinvoiceError::Format(format!("Invalid IRN date stamp: {}", e)))?;

    Ok(IrnComponents {
        invoice_number,
        service_id,
        date_stamp,
        issue_date,
    })
}

fn coerce_service_id(raw: &str) -> EinvoiceResult<String> {
    let trimmed = raw.trim().to_uppercase();
    if trimmed.is_empty() {
        return Err(EinvoiceError::Validation(
            "Service ID cannot be empty".to_string(),
        ));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EinvoiceError::Validation(format!(
            "Service ID must be alphanumeric: {}",
            raw
        )));
    }

    let mut service_id: String = trimmed.chars().take(SERVICE_ID_LEN).collect();
    while service_id.len() < SERVICE_ID_LEN {
        service_id.insert(0, '0');
    }
    Ok(service_id)
}

fn date_stamp(issue_date: Option<NaiveDate>) -> String {
    let date = issue_date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    date.format(DATE_STAMP_FORMAT).to_string()
}
