use doc_intake::intake::FormType;
use doc_intake::service::{ExtractionService, InMemoryExtractionStore, LineFieldExtractor};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type DefaultExtractionService =
    ExtractionService<InMemoryExtractionStore, LineFieldExtractor>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_extraction_service() -> Arc<DefaultExtractionService> {
    Arc::new(ExtractionService::new(
        Arc::new(InMemoryExtractionStore::new()),
        Arc::new(LineFieldExtractor),
    ))
}

/// A local file named on the command line, with its optional form type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileSpec {
    pub(crate) path: PathBuf,
    pub(crate) form_type: FormType,
}

/// Parse `PATH` or `PATH=FORM`, where `FORM` is one of the form type labels.
pub(crate) fn parse_file_spec(raw: &str) -> Result<FileSpec, String> {
    let (path, form_type) = match raw.rsplit_once('=') {
        Some((path, form)) => {
            let form_type = form
                .trim()
                .parse::<FormType>()
                .map_err(|err| format!("{err}; run `form-types` for the accepted labels"))?;
            (path, form_type)
        }
        None => (raw, FormType::None),
    };

    let path = path.trim();
    if path.is_empty() {
        return Err(format!("'{raw}' does not name a file"));
    }

    Ok(FileSpec {
        path: PathBuf::from(path),
        form_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_spec_defaults_to_no_form_type() {
        let spec = parse_file_spec("docs/w2.pdf").expect("parses");
        assert_eq!(spec.path, PathBuf::from("docs/w2.pdf"));
        assert_eq!(spec.form_type, FormType::None);
    }

    #[test]
    fn file_spec_reads_form_label() {
        let spec = parse_file_spec("k1.pdf=K1-1065").expect("parses");
        assert_eq!(spec.form_type, FormType::ScheduleK1);
    }

    #[test]
    fn file_spec_rejects_bad_input() {
        assert!(parse_file_spec("w2.pdf=W-2").is_err());
        assert!(parse_file_spec("=W2").is_err());
    }
}
