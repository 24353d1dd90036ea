//! Integration tests for dry-run mode.

use std::time::Duration;

use dirpdf::config::Config;
use dirpdf::output::{NullSink, Outcome, RunReport};
use dirpdf::pipeline::{Pipeline, RunOutcome};
use dirpdf::select::InputKind;
use image::ImageFormat;
use std::sync::Arc;

use crate::common::{named_dir, write_image, write_pdf};

#[tokio::test]
async fn test_dry_run_lists_plan_without_writing() {
    let (_temp, dir) = named_dir("plan");
    write_image(&dir.join("b.png"), 10, 10, ImageFormat::Png);
    write_pdf(&dir.join("a.pdf"), &[(100, 100)]);
    std::fs::write(dir.join("c.jpg"), b"never decoded in a dry run").unwrap();

    let mut config = Config::new(&dir);
    config.dry_run = true;

    let outcome = Pipeline::new(config, Arc::new(NullSink))
        .run()
        .await
        .unwrap();

    match &outcome {
        RunOutcome::DryRun { plan, output, .. } => {
            let names: Vec<_> = plan.iter().map(|e| e.file_name().into_owned()).collect();
            assert_eq!(names, vec!["a.pdf", "b.png", "c.jpg"]);
            assert_eq!(plan[0].kind, InputKind::Document);
            assert_eq!(plan[1].kind, InputKind::Image);
            assert!(output.ends_with("plan/plan.pdf"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert!(!dir.join("plan.pdf").exists(), "Dry run must not write output");

    let report = RunReport::from_outcome(&outcome, Duration::ZERO);
    assert_eq!(report.outcome, Outcome::DryRun);
    assert_eq!(report.plan.len(), 3);
    assert_eq!(report.plan[2].order, 2);
}

#[tokio::test]
async fn test_dry_run_empty_directory() {
    let (_temp, dir) = named_dir("nothing");

    let mut config = Config::new(&dir);
    config.dry_run = true;

    let outcome = Pipeline::new(config, Arc::new(NullSink))
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NoInputs { .. }));
}
