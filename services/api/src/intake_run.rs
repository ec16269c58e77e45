use crate::infra::{parse_file_spec, FileSpec};
use clap::Args;
use doc_intake::client::HttpIntakeTransport;
use doc_intake::config::AppConfig;
use doc_intake::error::AppError;
use doc_intake::intake::{
    DispatchReport, DownloadOutcome, ExtractionTarget, FormType, IntakeSession, JobContext,
    RawFile, SourceKey,
};
use doc_intake::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct IntakeArgs {
    /// Files to submit, as PATH or PATH=FORM (for example `w2.pdf=W2`)
    #[arg(required = true, value_parser = parse_file_spec)]
    pub(crate) files: Vec<FileSpec>,
    /// Client the documents belong to
    #[arg(long, env = "INTAKE_CLIENT_ID")]
    pub(crate) client_id: Option<String>,
    /// Return version the documents are filed under
    #[arg(long, env = "INTAKE_VERSION_ID")]
    pub(crate) version_id: Option<String>,
    /// Override the extraction service base url
    #[arg(long)]
    pub(crate) api_url: Option<String>,
    /// Override where CSV artifacts are written
    #[arg(long)]
    pub(crate) download_dir: Option<PathBuf>,
    /// Skip downloading CSV artifacts after extraction
    #[arg(long)]
    pub(crate) no_download: bool,
}

pub(crate) async fn run_intake(args: IntakeArgs) -> Result<(), AppError> {
    let IntakeArgs {
        files,
        client_id,
        version_id,
        api_url,
        download_dir,
        no_download,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(api_url) = api_url {
        config.client.api_url = api_url;
    }
    if let Some(download_dir) = download_dir {
        config.client.download_dir = download_dir;
    }
    telemetry::init(&config.telemetry)?;

    let transport = Arc::new(HttpIntakeTransport::from_config(&config.client)?);
    let session = IntakeSession::new(transport, config.client.download_dir.clone());
    session
        .set_job(JobContext::new(client_id, version_id))
        .await;

    let mut upstream = Vec::with_capacity(files.len());
    for spec in &files {
        upstream.push(RawFile::load(&spec.path).await?);
    }
    session.reconcile(upstream).await;
    let snapshot = session.snapshot().await;
    for spec in &files {
        let source = SourceKey(spec.path.display().to_string());
        if let Some(entity) = snapshot.iter().find(|entity| entity.source == source) {
            session.set_form_type(&entity.id, spec.form_type).await;
        }
    }

    println!("Submitting to {}", config.client.api_url);
    print!("{}", session.render().await);

    let report = session.extract(ExtractionTarget::All).await?;
    print_report(&report);
    print!("{}", session.render().await);

    if no_download {
        return Ok(());
    }

    for entity in session.snapshot().await {
        if !entity.download_available() {
            continue;
        }
        match session.download(&entity.id).await {
            Ok(DownloadOutcome::Saved(path)) => {
                println!("Saved {} -> {}", entity.file.name, path.display())
            }
            Ok(DownloadOutcome::Discarded) => {}
            Err(err) => {
                warn!(file_id = %entity.id, error = %err, "download failed");
                println!("Download failed for {}: {}", entity.file.name, err);
            }
        }
    }

    Ok(())
}

fn print_report(report: &DispatchReport) {
    match &report.failure {
        Some(reason) => println!(
            "Extraction request failed for {} file(s): {}",
            report.requested, reason
        ),
        None => println!(
            "Extraction finished: {} requested, {} updated, {} skipped",
            report.requested, report.applied, report.skipped
        ),
    }
}

pub(crate) fn print_form_types() {
    for form_type in FormType::ALL {
        let note = if form_type.is_extractable() {
            ""
        } else {
            " (upload only)"
        };
        println!("{}{}", form_type.label(), note);
    }
}
