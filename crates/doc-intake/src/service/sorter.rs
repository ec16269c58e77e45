use serde::{Deserialize, Serialize};

use crate::intake::FormType;

/// Suggests a form type for an uploaded document before the operator classifies it.
pub trait DocumentSorter: Send + Sync {
    fn sort(&self, file_name: &str, content: &[u8]) -> FormType;
}

/// Body of `sort`: files to classify, contents base64-encoded like extraction uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRequest {
    pub files: Vec<SortFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortFile {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortResponse {
    pub sorted_files: Vec<SortedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedFile {
    pub file_name: String,
    #[serde(rename = "formType")]
    pub form_type: FormType,
}

/// Looks for form numbers such as `1099-INT`, `W-2` or `Schedule K-1` in the file name and
/// the leading text of the document. Anything unrecognised sorts to `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSorter;

/// Only the head of a document is scanned; form titles sit at the top.
const SCAN_BYTES: usize = 4096;

/// 1099 variants keyed by the letters printed next to the form number. Longer suffixes come
/// first so `1099-SA` is not read as `1099-S`.
const FORM_1099: &[(&str, FormType)] = &[
    ("PATR", FormType::Patr1099),
    ("MISC", FormType::Misc1099),
    ("CAP", FormType::Cap1099),
    ("DIV", FormType::Div1099),
    ("INT", FormType::Int1099),
    ("LTC", FormType::Ltc1099),
    ("NEC", FormType::Nec1099),
    ("OID", FormType::Oid1099),
    ("LS", FormType::Ls1099),
    ("QA", FormType::Qa1099),
    ("SA", FormType::Sa1099),
    ("SB", FormType::Sb1099),
    ("A", FormType::A1099),
    ("B", FormType::B1099),
    ("C", FormType::C1099),
    ("G", FormType::G1099),
    ("H", FormType::H1099),
    ("K", FormType::K1099),
    ("Q", FormType::Q1099),
    ("R", FormType::R1099),
    ("S", FormType::S1099),
];

const FORM_1098: &[(&str, FormType)] = &[("E", FormType::E1098), ("T", FormType::T1098)];

impl DocumentSorter for KeywordSorter {
    fn sort(&self, file_name: &str, content: &[u8]) -> FormType {
        let head = &content[..content.len().min(SCAN_BYTES)];
        let text = normalize(&format!("{file_name} {}", String::from_utf8_lossy(head)));

        if let Some(form_type) = numbered(&text, "1099", FORM_1099) {
            return form_type;
        }
        if let Some(form_type) = numbered(&text, "1098", FORM_1098) {
            return form_type;
        }
        if text.contains("1098") {
            return FormType::Mis1098;
        }
        if text.contains("K11065") || text.contains("SCHEDULEK1") {
            return FormType::ScheduleK1;
        }
        if text.contains("W2") {
            return FormType::W2;
        }
        FormType::None
    }
}

fn numbered(text: &str, number: &str, variants: &[(&str, FormType)]) -> Option<FormType> {
    variants.iter().find_map(|(suffix, form_type)| {
        let matched = text.contains(&format!("{number}{suffix}"))
            || text.contains(&format!("{suffix}{number}"));
        matched.then_some(*form_type)
    })
}

/// Uppercase with separators removed, so `1099-int`, `1099 INT` and `int_1099` all match.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
