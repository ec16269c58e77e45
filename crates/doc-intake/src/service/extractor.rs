use crate::intake::FormType;

use super::store::ExtractedField;

/// Turns a document's bytes into fields for its declared form type.
pub trait FieldExtractor: Send + Sync {
    fn extract(
        &self,
        form_type: FormType,
        content: &[u8],
    ) -> Result<Vec<ExtractedField>, ExtractError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("document is not readable text")]
    Unreadable,
    #[error("extractor failed: {0}")]
    Backend(String),
}

/// Reads plain-text documents where every `name: value` or `name = value` line is a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFieldExtractor;

const LINE_CONFIDENCE: f32 = 1.0;

impl FieldExtractor for LineFieldExtractor {
    fn extract(
        &self,
        _form_type: FormType,
        content: &[u8],
    ) -> Result<Vec<ExtractedField>, ExtractError> {
        let text = std::str::from_utf8(content).map_err(|_| ExtractError::Unreadable)?;

        Ok(text
            .lines()
            .filter_map(|line| {
                let (name, value) = line.split_once(':').or_else(|| line.split_once('='))?;
                let (name, value) = (name.trim(), value.trim());
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some(ExtractedField::new(name, value, LINE_CONFIDENCE))
            })
            .collect())
    }
}

/// Storage-safe document name: brackets and parentheses removed, spaces turned into `_`.
pub fn sanitize_blob_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '(' | ')' | '[' | ']' | '{' | '}'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}
