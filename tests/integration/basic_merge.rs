//! Integration tests for basic directory merging.

use dirpdf::config::Config;
use dirpdf::pipeline::{RunOutcome, merge_directory};
use dirpdf::raster::Scale;
use image::ImageFormat;
use serial_test::serial;

use crate::common::{load, named_dir, page_sizes, write_image, write_pdf};

#[tokio::test]
async fn test_merge_scaled_photos() {
    let (_temp, dir) = named_dir("photos");
    write_image(&dir.join("a.png"), 100, 50, ImageFormat::Png);
    write_image(&dir.join("b.jpg"), 200, 100, ImageFormat::Jpeg);

    let mut config = Config::new(&dir);
    config.scale = Scale::new(0.5).unwrap();

    let outcome = merge_directory(config).await.unwrap();
    assert!(outcome.is_written());

    let output = dir.join("photos.pdf");
    assert!(output.exists(), "Output file was not created");
    assert_eq!(page_sizes(&output), vec![(50.0, 25.0), (100.0, 50.0)]);
}

#[tokio::test]
async fn test_merge_mixed_images_and_pdfs() {
    let (_temp, dir) = named_dir("mixed");
    write_image(&dir.join("1.gif"), 30, 40, ImageFormat::Gif);
    write_pdf(&dir.join("2.pdf"), &[(612, 792), (842, 595)]);
    write_image(&dir.join("3.JPEG"), 64, 48, ImageFormat::Jpeg);

    let outcome = merge_directory(Config::new(&dir)).await.unwrap();

    match outcome {
        RunOutcome::Written { statistics, .. } => {
            assert_eq!(statistics.images_merged, 2);
            assert_eq!(statistics.documents_merged, 1);
            assert_eq!(statistics.total_pages, 4);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(
        page_sizes(&dir.join("mixed.pdf")),
        vec![(30.0, 40.0), (612.0, 792.0), (842.0, 595.0), (64.0, 48.0)]
    );
}

#[tokio::test]
async fn test_merge_ignores_other_files() {
    let (_temp, dir) = named_dir("notes");
    write_image(&dir.join("scan.png"), 10, 20, ImageFormat::Png);
    std::fs::write(dir.join("readme.txt"), "text").unwrap();
    std::fs::create_dir(dir.join("nested.png")).unwrap();
    write_image(&dir.join("nested.png").join("inner.png"), 5, 5, ImageFormat::Png);

    merge_directory(Config::new(&dir)).await.unwrap();

    assert_eq!(page_sizes(&dir.join("notes.pdf")), vec![(10.0, 20.0)]);
}

#[tokio::test]
async fn test_merge_is_reproducible() {
    let (_temp, dir) = named_dir("album");
    write_image(&dir.join("a.png"), 40, 30, ImageFormat::Png);
    write_pdf(&dir.join("b.pdf"), &[(100, 100)]);

    merge_directory(Config::new(&dir)).await.unwrap();
    let first = std::fs::read(dir.join("album.pdf")).unwrap();

    merge_directory(Config::new(&dir)).await.unwrap();
    let second = std::fs::read(dir.join("album.pdf")).unwrap();

    assert_eq!(first, second);
    assert_eq!(page_sizes(&dir.join("album.pdf")).len(), 2);
}

#[tokio::test]
async fn test_merge_sets_title() {
    let (_temp, dir) = named_dir("holiday");
    write_image(&dir.join("a.png"), 8, 8, ImageFormat::Png);

    merge_directory(Config::new(&dir)).await.unwrap();

    let document = load(&dir.join("holiday.pdf"));
    let info_id = document
        .trailer
        .get(b"Info")
        .and_then(lopdf::Object::as_reference)
        .unwrap();
    let info = document.get_dictionary(info_id).unwrap();
    assert_eq!(
        info.get(b"Title").and_then(lopdf::Object::as_str).unwrap(),
        b"holiday"
    );
}

#[tokio::test]
#[serial]
async fn test_merge_current_directory() {
    let (_temp, dir) = named_dir("cwd");
    write_image(&dir.join("only.png"), 12, 6, ImageFormat::Png);

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(&dir).unwrap();
    let result = merge_directory(Config::new(".")).await;
    std::env::set_current_dir(previous).unwrap();

    let outcome = result.unwrap();
    assert!(outcome.output().ends_with("cwd/cwd.pdf"));
    assert_eq!(page_sizes(&dir.join("cwd.pdf")), vec![(12.0, 6.0)]);
}
