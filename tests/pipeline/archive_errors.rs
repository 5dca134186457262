use crate::{config, run};
use archive_loader::testing::{record_json, CapturingPublisher};
use archive_loader::{Error, RunState};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

#[tokio::test]
async fn test_missing_archive_fails_without_publishing() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.tar.gz");

    let publisher = CapturingPublisher::new();
    let failure = run(config(&path), &publisher).await.unwrap_err();

    assert_eq!(failure.failed_in, RunState::Reading);
    assert!(matches!(failure.error, Error::ArchiveIo(_)));
    assert_eq!(publisher.publish_calls(), 0);
    assert_eq!(publisher.flushes(), 0);
}

#[tokio::test]
async fn test_non_gzip_input_is_corrupt() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("plain.tar.gz");
    std::fs::write(&path, b"this is not a gzip stream at all").unwrap();

    let publisher = CapturingPublisher::new();
    let failure = run(config(&path), &publisher).await.unwrap_err();

    assert_eq!(failure.failed_in, RunState::Reading);
    assert!(matches!(failure.error, Error::ArchiveCorrupt(_)));
    assert!(!failure.error.is_malformed_entry());
    assert_eq!(publisher.publish_calls(), 0);
}

#[tokio::test]
async fn test_truncated_entry_fails_after_earlier_records() {
    // First entry fits in one 512-byte block, so the second entry's header
    // spans bytes 1024..1536 and its payload starts at 1536.
    let small = record_json("k0", "v0", "s", "1");
    let large = record_json("k1", &"x".repeat(1000), "s", "1");
    assert!(small.len() < 512);

    let mut builder = tar::Builder::new(Vec::new());
    for (name, payload) in [("0.json", &small), ("1.json", &large)] {
        let mut header = tar::Header::new_gnu();
        header.set_size(payload.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, payload.as_bytes())
            .unwrap();
    }
    let mut raw = builder.into_inner().unwrap();
    raw.truncate(1536 + 200);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("truncated.tar.gz");
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let publisher = CapturingPublisher::new();
    let failure = run(config(&path), &publisher).await.unwrap_err();

    assert_eq!(failure.failed_in, RunState::Reading);
    assert!(matches!(failure.error, Error::ArchiveCorrupt(_)));
    assert_eq!(failure.counters.records_published, 1);
    assert_eq!(publisher.messages()[0].key, "k0");
    assert_eq!(publisher.flushes(), 0);
}
