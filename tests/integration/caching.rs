//! Integration tests for the transform cache across runs.

use std::sync::Arc;

use dirpdf::cache::TransformCache;
use dirpdf::config::{CacheConfig, Config};
use dirpdf::output::NullSink;
use dirpdf::pipeline::{Pipeline, RunOutcome};
use dirpdf::raster::Scale;
use image::ImageFormat;

use crate::common::{named_dir, page_sizes, write_image};

fn statistics(outcome: RunOutcome) -> dirpdf::merge::MergeStatistics {
    match outcome {
        RunOutcome::Written { statistics, .. } => statistics,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_shared_cache_serves_second_run() {
    let (_temp, dir) = named_dir("cached");
    write_image(&dir.join("a.png"), 60, 40, ImageFormat::Png);
    write_image(&dir.join("b.jpg"), 30, 30, ImageFormat::Jpeg);

    let cache = Arc::new(TransformCache::new(CacheConfig::default()));
    let run = || {
        let pipeline = Pipeline::new(Config::new(&dir), Arc::new(NullSink))
            .with_cache(Arc::clone(&cache));
        async move { pipeline.run().await }
    };

    let first = statistics(run().await.unwrap());
    let first_bytes = std::fs::read(dir.join("cached.pdf")).unwrap();
    assert_eq!(first.cache_hits, 0);
    assert_eq!(first.cache_misses, 2);

    let second = statistics(run().await.unwrap());
    let second_bytes = std::fs::read(dir.join("cached.pdf")).unwrap();
    assert_eq!(second.cache_hits, 2);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_cache_distinguishes_scales() {
    let (_temp, dir) = named_dir("scaled");
    write_image(&dir.join("a.png"), 80, 40, ImageFormat::Png);

    let cache = Arc::new(TransformCache::new(CacheConfig::default()));

    let full = Pipeline::new(Config::new(&dir), Arc::new(NullSink)).with_cache(Arc::clone(&cache));
    statistics(full.run().await.unwrap());
    assert_eq!(page_sizes(&dir.join("scaled.pdf")), vec![(80.0, 40.0)]);

    let mut config = Config::new(&dir);
    config.scale = Scale::new(0.25).unwrap();
    let quarter = Pipeline::new(config, Arc::new(NullSink)).with_cache(Arc::clone(&cache));
    let stats = statistics(quarter.run().await.unwrap());

    assert_eq!(stats.cache_hits, 0);
    assert_eq!(page_sizes(&dir.join("scaled.pdf")), vec![(20.0, 10.0)]);
}

#[tokio::test]
async fn test_modified_file_is_not_served_stale() {
    let (_temp, dir) = named_dir("edited");
    let image = dir.join("a.png");
    write_image(&image, 10, 10, ImageFormat::Png);

    let cache = Arc::new(TransformCache::new(CacheConfig::default()));
    let pipeline = Pipeline::new(Config::new(&dir), Arc::new(NullSink)).with_cache(cache);

    pipeline.run().await.unwrap();
    write_image(&image, 30, 15, ImageFormat::Png);
    pipeline.run().await.unwrap();

    assert_eq!(page_sizes(&dir.join("edited.pdf")), vec![(30.0, 15.0)]);
}

#[tokio::test]
async fn test_disabled_cache_never_hits() {
    let (_temp, dir) = named_dir("nocache");
    write_image(&dir.join("a.png"), 10, 10, ImageFormat::Png);

    let mut config = Config::new(&dir);
    config.cache.capacity = 0;
    let pipeline = Pipeline::new(config, Arc::new(NullSink));

    statistics(pipeline.run().await.unwrap());
    let second = statistics(pipeline.run().await.unwrap());

    assert_eq!(second.cache_hits, 0);
    assert!(pipeline.cache().is_empty());
}
