use std::collections::HashSet;
use std::fs;
use std::path::Path;
use storage::{connect, migrate, VideoStore};
use video_tagger_core::config::{parse_extensions, AppConfig};
use video_tagger_core::indexer::index_videos;
use video_tagger_core::tagging::TaggingService;
use video_tagger_core::TaggingError;

struct Fixture {
    _temp: tempfile::TempDir,
    store: VideoStore,
    service: TaggingService,
    root: std::path::PathBuf,
}

async fn fixture(files: &[&str]) -> Fixture {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("videos");
    fs::create_dir_all(&root).unwrap();
    for name in files {
        fs::write(root.join(name), name.as_bytes()).unwrap();
    }
    let root = root.canonicalize().unwrap();

    let db_path = temp.path().join("tagging.db");
    let db_url = format!("sqlite:///{}", db_path.to_string_lossy().replace('\\', "/"));
    let pool = connect(&db_url).await.unwrap();
    migrate(&pool).await.unwrap();
    let store = VideoStore::new(pool);

    let cfg = AppConfig {
        video_root: root.clone(),
        tags: vec!["Good".into(), "Bad".into()],
        database_url: db_url,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        static_dir: "static".into(),
        extensions: parse_extensions(None),
    };
    index_videos(&cfg, &store).await.unwrap();
    let service = TaggingService::new(store.clone(), &cfg);
    Fixture {
        _temp: temp,
        store,
        service,
        root,
    }
}

fn assert_consistent(stats: &video_tagger_core::models::Stats) {
    assert!(stats.annotated_videos <= stats.total_videos);
    assert!(stats.unannotated_videos >= 0);
    assert_eq!(
        stats.annotated_videos + stats.unannotated_videos,
        stats.total_videos
    );
}

#[tokio::test]
async fn next_video_returns_servable_unannotated_video() {
    let fx = fixture(&["a.mp4"]).await;
    let video = fx.service.next_video().await.unwrap().unwrap();
    assert_eq!(video.filename, "a.mp4");
    assert_eq!(video.web_path.as_deref(), Some("/static_videos/a.mp4"));
    assert!(!video.is_annotated);
    assert_eq!(video.tag, None);
}

#[tokio::test]
async fn next_video_is_not_stuck_on_one_record() {
    let fx = fixture(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]).await;
    let mut seen = HashSet::new();
    for _ in 0..100 {
        seen.insert(fx.service.next_video().await.unwrap().unwrap().id);
    }
    assert!(seen.len() > 1);
}

#[tokio::test]
async fn tagging_updates_record_and_stats() {
    let fx = fixture(&["a.mp4", "b.mp4"]).await;
    let before = fx.service.stats().await.unwrap();
    assert_eq!(before.total_videos, 2);
    assert_eq!(before.annotated_videos, 0);
    assert_consistent(&before);

    let video = fx.service.next_video().await.unwrap().unwrap();
    let tagged = fx.service.tag_video(video.id, "Good").await.unwrap();
    assert!(tagged.is_annotated);
    assert_eq!(tagged.tag.as_deref(), Some("Good"));
    assert_eq!(tagged.web_path, video.web_path);

    let stored = fx.store.find_by_id(video.id).await.unwrap().unwrap();
    assert!(stored.is_annotated);
    assert_eq!(stored.tag.as_deref(), Some("Good"));

    let after = fx.service.stats().await.unwrap();
    assert_eq!(after.annotated_videos, before.annotated_videos + 1);
    assert_eq!(after.unannotated_videos, before.unannotated_videos - 1);
    assert_consistent(&after);
}

#[tokio::test]
async fn invalid_tag_lists_valid_tags_and_leaves_record_alone() {
    let fx = fixture(&["a.mp4"]).await;
    let video = fx.service.next_video().await.unwrap().unwrap();

    let err = fx.service.tag_video(video.id, "Ugly").await.unwrap_err();
    assert!(matches!(err, TaggingError::InvalidTag { .. }));
    assert!(err.to_string().contains("Good, Bad"));

    let stored = fx.store.find_by_id(video.id).await.unwrap().unwrap();
    assert!(!stored.is_annotated);
    assert_eq!(stored.tag, None);
}

#[tokio::test]
async fn invalid_tag_wins_over_unknown_id() {
    let fx = fixture(&[]).await;
    let err = fx.service.tag_video(42, "Ugly").await.unwrap_err();
    assert!(matches!(err, TaggingError::InvalidTag { .. }));
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let fx = fixture(&["a.mp4"]).await;
    let err = fx.service.tag_video(9999, "Bad").await.unwrap_err();
    assert!(matches!(err, TaggingError::NotFound(9999)));
    assert_eq!(fx.service.stats().await.unwrap().annotated_videos, 0);
}

#[tokio::test]
async fn everything_annotated_means_no_next_video() {
    let fx = fixture(&["a.mp4", "b.mov"]).await;
    while let Some(video) = fx.service.next_video().await.unwrap() {
        fx.service.tag_video(video.id, "Bad").await.unwrap();
        assert_consistent(&fx.service.stats().await.unwrap());
    }
    let stats = fx.service.stats().await.unwrap();
    assert_eq!(stats.annotated_videos, 2);
    assert_eq!(stats.unannotated_videos, 0);
    assert!(fx.service.next_video().await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_records_are_retired_without_a_tag() {
    let fx = fixture(&["keep.mp4"]).await;
    let outside = fx.root.parent().unwrap().join("elsewhere");
    let mut stray_ids = Vec::new();
    for i in 0..3 {
        let path = outside.join(format!("stray{i}.mp4"));
        let rec = fx
            .store
            .insert(&path.to_string_lossy(), &format!("stray{i}.mp4"))
            .await
            .unwrap();
        stray_ids.push(rec.id);
    }

    let video = fx.service.next_video().await.unwrap().unwrap();
    assert_eq!(video.filename, "keep.mp4");
    fx.service.tag_video(video.id, "Good").await.unwrap();

    // Every stray was either retired on the way to keep.mp4 or is retired now.
    assert!(fx.service.next_video().await.unwrap().is_none());
    for id in stray_ids {
        let rec = fx.store.find_by_id(id).await.unwrap().unwrap();
        assert!(rec.is_annotated);
        assert_eq!(rec.tag, None);
    }
    let stats = fx.service.stats().await.unwrap();
    assert_eq!(stats.total_videos, 4);
    assert_eq!(stats.unannotated_videos, 0);
    assert_consistent(&stats);
}

#[tokio::test]
async fn all_unreachable_terminates() {
    let fx = fixture(&[]).await;
    for i in 0..50 {
        let path = Path::new("/definitely/not/the/root").join(format!("{i}.mp4"));
        fx.store
            .insert(&path.to_string_lossy(), &format!("{i}.mp4"))
            .await
            .unwrap();
    }
    assert!(fx.service.next_video().await.unwrap().is_none());
    assert_eq!(fx.store.count_unannotated().await.unwrap(), 0);
}
