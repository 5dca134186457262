use crate::{config, run};
use archive_loader::testing::{record_json, write_archive, CapturingPublisher};
use archive_loader::{Error, MalformedEntryPolicy, RunState};

fn mixed_entries() -> Vec<(String, String)> {
    vec![
        ("0.json".to_string(), record_json("k0", "v0", "s", "1")),
        ("1.json".to_string(), "{not json".to_string()),
        ("2.json".to_string(), record_json("k2", "v2", "s", "1")),
        (
            "3.json".to_string(),
            r#"{"recordKey":"k3","schemaName":"s","schemaVersion":"1"}"#.to_string(),
        ),
        ("4.json".to_string(), record_json("k4", "v4", "s", "1")),
    ]
}

#[tokio::test]
async fn test_invalid_json_aborts_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_archive(&path, mixed_entries())?;

    let publisher = CapturingPublisher::new();
    let failure = run(config(&path), &publisher)
        .await
        .expect_err("malformed entry should fail the run");

    assert_eq!(failure.state(), RunState::Failed);
    assert_eq!(failure.failed_in, RunState::Reading);
    match &failure.error {
        Error::MalformedEntry { index, path, .. } => {
            assert_eq!(*index, 1);
            assert_eq!(path, "1.json");
        }
        other => panic!("expected a malformed entry error, got {other:?}"),
    }
    assert!(failure.error.is_malformed_entry());
    assert_eq!(failure.counters.records_published, 1);

    // Nothing after the bad entry is sent, and the final flush never happens.
    let keys: Vec<String> = publisher.messages().into_iter().map(|m| m.key).collect();
    assert_eq!(keys, vec!["k0"]);
    assert_eq!(publisher.publish_calls(), 1);
    assert_eq!(publisher.flushes(), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_field_aborts_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_archive(
        &path,
        [
            ("0.json", record_json("k0", "v0", "s", "1")),
            (
                "1.json",
                r#"{"recordKey":"k1","recordValue":"v1","schemaName":"s"}"#.to_string(),
            ),
        ],
    )?;

    let publisher = CapturingPublisher::new();
    let failure = run(config(&path), &publisher)
        .await
        .expect_err("missing schemaVersion should fail the run");

    match &failure.error {
        Error::MalformedEntry { index, reason, .. } => {
            assert_eq!(*index, 1);
            assert!(reason.contains("schemaVersion"), "reason was: {reason}");
        }
        other => panic!("expected a malformed entry error, got {other:?}"),
    }
    assert_eq!(publisher.messages().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_skip_policy_continues_past_malformed_entries() -> Result<(), Box<dyn std::error::Error>>
{
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_archive(&path, mixed_entries())?;

    let mut config = config(&path);
    config.on_malformed = MalformedEntryPolicy::Skip;
    let publisher = CapturingPublisher::new();
    let summary = run(config, &publisher).await?;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.counters.records_published, 3);
    assert_eq!(summary.counters.records_skipped, 2);

    let keys: Vec<String> = publisher.messages().into_iter().map(|m| m.key).collect();
    assert_eq!(keys, vec!["k0", "k2", "k4"]);
    assert_eq!(publisher.flushes(), 1);
    Ok(())
}

#[tokio::test]
async fn test_oversized_entry_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_archive(
        &path,
        [
            ("0.json", record_json("k0", "v0", "s", "1")),
            ("1.json", record_json("k1", &"x".repeat(4096), "s", "1")),
            ("2.json", record_json("k2", "v2", "s", "1")),
        ],
    )?;

    let mut abort = config(&path);
    abort.max_entry_size = 1024;
    let publisher = CapturingPublisher::new();
    let failure = run(abort, &publisher)
        .await
        .expect_err("oversized entry should fail the run");
    assert!(matches!(
        failure.error,
        Error::MalformedEntry { index: 1, .. }
    ));
    assert_eq!(publisher.messages().len(), 1);

    let mut skip = config(&path);
    skip.max_entry_size = 1024;
    skip.on_malformed = MalformedEntryPolicy::Skip;
    let publisher = CapturingPublisher::new();
    let summary = run(skip, &publisher).await?;
    assert_eq!(summary.counters.records_published, 2);
    assert_eq!(summary.counters.records_skipped, 1);
    let keys: Vec<String> = publisher.messages().into_iter().map(|m| m.key).collect();
    assert_eq!(keys, vec!["k0", "k2"]);
    Ok(())
}
