//! Canonical filename composition for the NFS-e layout.

use tracing::debug;

use super::fields::{
    count_marker_lines, extract_after_marker, extract_invoice_number, extract_issue_date,
};
use super::normalize::{clean_customer_name, clean_party_name, is_blank_segment, path_safe_token};
use super::patterns::NAME_MARKER;
use super::{FieldSet, Result};
use crate::error::CompositionError;

/// Raw fields of a recognised document, before cleaning.
///
/// Fails with `Unidentified` when the name marker appears fewer than twice.
pub fn compose_fields(text: &str) -> Result<FieldSet> {
    if text.trim().is_empty() {
        return Err(CompositionError::NoText);
    }

    let text = text.to_uppercase();
    let markers = count_marker_lines(&text, NAME_MARKER);
    if markers < 2 {
        return Err(CompositionError::Unidentified(format!(
            "expected two \"{}\" markers, found {}",
            NAME_MARKER, markers
        )));
    }

    Ok(FieldSet {
        provider: extract_after_marker(&text, NAME_MARKER, 1),
        customer: extract_after_marker(&text, NAME_MARKER, 2),
        invoice_number: extract_invoice_number(&text),
        issue_date: extract_issue_date(&text),
    })
}

/// Build the canonical name `CUSTOMER_PROVIDER_NFS_NUM-<number>_<date>`.
pub fn compose_name(text: &str) -> Result<String> {
    let fields = compose_fields(text)?;
    debug!(?fields, "Extracted NFS-e fields");

    let (provider, customer, number, date) = match fields {
        FieldSet {
            provider: Some(provider),
            customer: Some(customer),
            invoice_number: Some(number),
            issue_date: Some(date),
        } => (provider, customer, number, date),
        incomplete => {
            return Err(CompositionError::Unidentified(format!(
                "missing fields: {}",
                incomplete.missing().join(", ")
            )));
        }
    };

    let provider = clean_party_name(&provider);
    let customer = clean_customer_name(&customer);
    let number = path_safe_token(&number);
    let date = path_safe_token(&date);

    for (field, value) in [
        ("provider", &provider),
        ("customer", &customer),
        ("invoice_number", &number),
        ("issue_date", &date),
    ] {
        if is_blank_segment(value) {
            return Err(CompositionError::Unidentified(format!(
                "{} is empty after cleaning",
                field
            )));
        }
    }

    Ok(format!("{}_{}_NFS_NUM-{}_{}", customer, provider, number, date))
}
