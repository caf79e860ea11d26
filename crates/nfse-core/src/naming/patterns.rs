//! Markers and regex patterns for NFS-e layouts.

use lazy_static::lazy_static;
use regex::Regex;

/// Label preceding both the provider and the customer name.
pub const NAME_MARKER: &str = "NOME / NOME EMPRESARIAL";

/// Literal labels preceding the invoice number.
pub const INVOICE_NUMBER_MARKERS: [&str; 2] = ["NÚMERO DA NFS-E", "NUMERO DA NFS-E"];

/// Labels preceding the issue date and time.
pub const ISSUE_DATE_MARKERS: [&str; 2] = ["DATA E HORA DA EMISS", "DATA/HORA DA EMISS"];

/// Words stripped from the start of a customer name.
pub const PREFIX_WORDS: [&str; 13] = [
    "CONDOMINIO",
    "RESIDENCIAL",
    "EDIFICIO",
    "EDIF",
    "EDF",
    "ED",
    "PREDIO",
    "TORRE",
    "BLOCO",
    "CENTRO",
    "COMERCIAL",
    "EXECUTIVO",
    "MULTIFAMILIAR",
];

/// Connectives that may follow a prefix word.
pub const CONNECTIVES: [&str; 4] = ["DO", "DA", "DOS", "DAS"];

lazy_static! {
    // "Nº DA NFS-E", "N° NFSE", ...
    pub static ref INVOICE_NUMBER_ORDINAL: Regex = Regex::new(
        r"N[º°].*NFS[- ]?E"
    ).unwrap();

    // CPF/CNPJ at the start of a party line: "12.345.678/0001-00 EMPRESA"
    pub static ref LEADING_DOCUMENT_NUMBER: Regex = Regex::new(
        r"^\d[\d./-]*\s+"
    ).unwrap();

    pub static ref NON_ALPHANUMERIC_RUN: Regex = Regex::new(
        r"[^A-Za-z0-9]+"
    ).unwrap();

    pub static ref NON_TOKEN_RUN: Regex = Regex::new(
        r"[^A-Za-z0-9-]+"
    ).unwrap();

    pub static ref UNDERSCORE_RUN: Regex = Regex::new(
        r"_+"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();

    pub static ref LEADING_PREFIX_WORD: Regex = Regex::new(&format!(
        r"^(?:{})(?:\b\s+(?:{}))?\b\s*",
        PREFIX_WORDS.join("|"),
        CONNECTIVES.join("|"),
    )).unwrap();

    pub static ref LEADING_CONNECTIVES: Regex = Regex::new(&format!(
        r"^(?:(?:{})\b\s*)+",
        CONNECTIVES.join("|"),
    )).unwrap();
}
