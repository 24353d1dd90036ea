//! Integration tests for error handling and edge cases.

use std::sync::Arc;

use dirpdf::config::Config;
use dirpdf::error::DirPdfError;
use dirpdf::output::{MemorySink, MessageLevel};
use dirpdf::pipeline::{Pipeline, RunOutcome, merge_directory};
use image::ImageFormat;

use crate::common::{named_dir, page_sizes, write_image, write_pdf};

#[tokio::test]
async fn test_corrupt_image_is_skipped() {
    let (_temp, dir) = named_dir("batch");
    write_image(&dir.join("a.png"), 10, 10, ImageFormat::Png);
    std::fs::write(dir.join("b.jpg"), b"definitely not a jpeg").unwrap();
    write_image(&dir.join("c.gif"), 20, 10, ImageFormat::Gif);

    let sink = Arc::new(MemorySink::new());
    let outcome = Pipeline::new(Config::new(&dir), sink.clone())
        .run()
        .await
        .unwrap();

    match outcome {
        RunOutcome::Written {
            statistics,
            failures,
            ..
        } => {
            assert_eq!(statistics.items, 3);
            assert_eq!(statistics.skipped, 1);
            assert_eq!(failures.len(), 1);
            assert!(failures[0].path.ends_with("b.jpg"));
            assert!(matches!(failures[0].error, DirPdfError::ImageFailed { .. }));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let warnings = sink.at_level(MessageLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("b.jpg"));

    assert_eq!(
        page_sizes(&dir.join("batch.pdf")),
        vec![(10.0, 10.0), (20.0, 10.0)]
    );
}

#[tokio::test]
async fn test_corrupt_pdf_is_skipped() {
    let (_temp, dir) = named_dir("docs");
    std::fs::write(dir.join("a.pdf"), b"%PDF-1.4 truncated").unwrap();
    write_pdf(&dir.join("b.pdf"), &[(300, 400)]);

    let outcome = merge_directory(Config::new(&dir)).await.unwrap();

    match outcome {
        RunOutcome::Written { failures, .. } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].error.is_recoverable());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(page_sizes(&dir.join("docs.pdf")), vec![(300.0, 400.0)]);
}

#[tokio::test]
async fn test_strict_mode_aborts() {
    let (_temp, dir) = named_dir("strict");
    write_image(&dir.join("a.png"), 10, 10, ImageFormat::Png);
    std::fs::write(dir.join("b.png"), b"broken").unwrap();

    let mut config = Config::new(&dir);
    config.strict = true;

    let err = merge_directory(config).await.unwrap_err();
    assert!(matches!(err, DirPdfError::ImageFailed { .. }));
    assert_eq!(err.exit_code(), 3);
    assert!(!dir.join("strict.pdf").exists());
}

#[tokio::test]
async fn test_empty_directory_writes_nothing() {
    let (_temp, dir) = named_dir("empty");

    let outcome = merge_directory(Config::new(&dir)).await.unwrap();

    assert!(matches!(outcome, RunOutcome::NoInputs { .. }));
    assert!(!dir.join("empty.pdf").exists());
}

#[tokio::test]
async fn test_all_inputs_broken_writes_nothing() {
    let (_temp, dir) = named_dir("broken");
    std::fs::write(dir.join("a.png"), b"x").unwrap();
    std::fs::write(dir.join("b.pdf"), b"y").unwrap();

    let outcome = merge_directory(Config::new(&dir)).await.unwrap();

    match outcome {
        RunOutcome::NothingMerged { failures, .. } => assert_eq!(failures.len(), 2),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!dir.join("broken.pdf").exists());
}

#[tokio::test]
async fn test_nonexistent_directory() {
    let (_temp, dir) = named_dir("present");

    let err = merge_directory(Config::new(dir.join("absent")))
        .await
        .unwrap_err();

    assert!(matches!(err, DirPdfError::SelectionFailed { .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_file_instead_of_directory() {
    let (_temp, dir) = named_dir("files");
    let file = dir.join("a.png");
    write_image(&file, 4, 4, ImageFormat::Png);

    let err = merge_directory(Config::new(&file)).await.unwrap_err();
    assert!(matches!(err, DirPdfError::NotADirectory { .. }));
}

#[tokio::test]
async fn test_case_conflicting_output() {
    let (_temp, dir) = named_dir("photos");
    write_image(&dir.join("a.png"), 10, 10, ImageFormat::Png);
    write_pdf(&dir.join("PHOTOS.pdf"), &[(50, 50)]);

    let err = merge_directory(Config::new(&dir)).await.unwrap_err();

    assert!(matches!(err, DirPdfError::OutputConflict { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(!dir.join("photos.pdf").exists());
}
