use std::sync::Arc;

use tokio::sync::Mutex;

use super::common::*;
use crate::intake::{
    DownloadError, DownloadInitiator, DownloadOutcome, ExtractionStatus, FileId, IntakeList,
    TransportError,
};

fn completed_list(name: &str) -> (Mutex<IntakeList>, FileId) {
    let (mut list, added) = list_with(vec![raw("queue/1", name, "Wages: 100")]);
    list.get_mut(&added[0]).expect("present").status = ExtractionStatus::ExtractCompleted;
    (Mutex::new(list), added[0].clone())
}

#[tokio::test]
async fn saves_artifact_named_after_the_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(FakeTransport::completing().with_artifact(
        "w2.pdf",
        b"Document Name: w2.pdf\nField Names,Field Values,Confidence\n",
    ));
    let downloads = DownloadInitiator::new(Arc::clone(&transport), dir.path());
    let (list, id) = completed_list("w2.pdf");

    let outcome = downloads
        .download_entity(&list, &id, "C-100")
        .await
        .expect("download succeeds");

    let expected = dir.path().join("w2.pdf.csv");
    assert_eq!(outcome, DownloadOutcome::Saved(expected.clone()));
    let saved = std::fs::read_to_string(expected).expect("artifact on disk");
    assert!(saved.starts_with("Document Name: w2.pdf"));
    assert_eq!(
        transport.download_calls(),
        vec![("w2.pdf".to_string(), "C-100".to_string())]
    );
}

#[tokio::test]
async fn refuses_files_that_have_not_completed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(FakeTransport::completing());
    let downloads = DownloadInitiator::new(Arc::clone(&transport), dir.path());
    let (list, added) = list_with(vec![raw("queue/1", "w2.pdf", "Wages: 100")]);
    let list = Mutex::new(list);

    match downloads.download_entity(&list, &added[0], "C-100").await {
        Err(DownloadError::NotReady { document, status }) => {
            assert_eq!(document, "w2.pdf");
            assert_eq!(status, "Pending");
        }
        other => panic!("expected not ready, got {other:?}"),
    }
    assert!(transport.download_calls().is_empty());
}

#[tokio::test]
async fn empty_artifact_is_an_error_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(FakeTransport::completing().with_artifact("w2.pdf", b""));
    let downloads = DownloadInitiator::new(transport, dir.path());
    let (list, id) = completed_list("w2.pdf");

    match downloads.download_entity(&list, &id, "C-100").await {
        Err(DownloadError::EmptyPayload { document }) => assert_eq!(document, "w2.pdf"),
        other => panic!("expected empty payload, got {other:?}"),
    }
    assert!(!dir.path().join("w2.pdf.csv").exists());
}

#[tokio::test]
async fn service_errors_surface_with_the_document_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let downloads = DownloadInitiator::new(Arc::new(FakeTransport::completing()), dir.path());

    match downloads.download("missing.pdf", "C-100").await {
        Err(DownloadError::Transport {
            document,
            source: TransportError::Status { status, .. },
        }) => {
            assert_eq!(document, "missing.pdf");
            assert_eq!(status, 404);
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn absent_files_are_discarded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(FakeTransport::completing().with_artifact("w2.pdf", b"a,b\n"));
    let downloads = DownloadInitiator::new(Arc::clone(&transport), dir.path());
    let list = Mutex::new(IntakeList::new());

    let outcome = downloads
        .download_entity(&list, &FileId("file-000404".to_string()), "C-100")
        .await
        .expect("no error for absent file");

    assert_eq!(outcome, DownloadOutcome::Discarded);
    assert!(transport.download_calls().is_empty());
}

#[test]
fn artifact_path_appends_csv_extension() {
    let downloads = DownloadInitiator::new(
        Arc::new(FakeTransport::completing()),
        std::path::PathBuf::from("exports"),
    );
    assert_eq!(
        downloads.artifact_path("1099-int.pdf"),
        std::path::Path::new("exports").join("1099-int.pdf.csv")
    );
}

#[tokio::test]
async fn artifacts_in_flight_are_discarded_when_the_file_is_removed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (transport, release) = FakeTransport::completing()
        .with_artifact("w2.pdf", b"a,b\n")
        .gated_downloads();
    let transport = Arc::new(transport);
    let fetching = transport.fetching();
    let downloads = DownloadInitiator::new(Arc::clone(&transport), dir.path());
    let (list, id) = completed_list("w2.pdf");
    let list = Arc::new(list);

    let worker = downloads.clone();
    let shared = Arc::clone(&list);
    let target = id.clone();
    let handle =
        tokio::spawn(async move { worker.download_entity(&shared, &target, "C-100").await });

    fetching.notified().await;
    assert!(list.lock().await.remove(&id).is_some());
    release.notify_one();

    let outcome = handle.await.expect("join").expect("no error for removed file");
    assert_eq!(outcome, DownloadOutcome::Discarded);
    assert_eq!(transport.download_calls().len(), 1);
    assert!(!dir.path().join("w2.pdf.csv").exists());
}

#[tokio::test]
async fn absolute_document_names_stay_inside_the_download_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let elsewhere = tempfile::tempdir().expect("tempdir");
    let name = elsewhere.path().join("stolen").display().to_string();
    let transport = Arc::new(FakeTransport::completing().with_artifact(&name, b"a,b\n"));
    let downloads = DownloadInitiator::new(transport, dir.path());
    let (list, id) = completed_list(&name);

    let outcome = downloads
        .download_entity(&list, &id, "C-100")
        .await
        .expect("download succeeds");

    assert_eq!(outcome, DownloadOutcome::Saved(dir.path().join("stolen.csv")));
    assert!(!elsewhere.path().join("stolen.csv").exists());
}

#[test]
fn artifact_path_drops_parent_components() {
    let downloads = DownloadInitiator::new(
        Arc::new(FakeTransport::completing()),
        std::path::PathBuf::from("exports"),
    );
    let exports = std::path::Path::new("exports");
    assert_eq!(
        downloads.artifact_path("../../escape.pdf"),
        exports.join("escape.pdf.csv")
    );
    assert_eq!(
        downloads.artifact_path("scans\\..\\w2.pdf"),
        exports.join("w2.pdf.csv")
    );
    assert_eq!(downloads.artifact_path(".."), exports.join("document.csv"));
    assert_eq!(downloads.artifact_path("dir/"), exports.join("document.csv"));
}
