use crate::{config, run};
use archive_loader::testing::{
    record_json, write_archive, write_records_archive, CapturingPublisher,
};
use archive_loader::RunState;
use archive_record::{SCHEMA_NAME_HEADER, SCHEMA_VERSION_HEADER};

#[tokio::test]
async fn test_publishes_every_entry_in_stored_order() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_records_archive(&path, 25)?;

    let publisher = CapturingPublisher::new();
    let summary = run(config(&path), &publisher).await?;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.counters.records_published, 25);
    assert_eq!(summary.counters.records_skipped, 0);
    assert!(summary.counters.finished_at.is_some());

    let messages = publisher.messages();
    assert_eq!(messages.len(), 25);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.key, format!("key-{i}"));
        assert_eq!(message.value, format!("value-{i}"));
    }
    assert_eq!(publisher.flushes(), 1);
    Ok(())
}

#[tokio::test]
async fn test_record_fields_reach_the_message() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    let records = [
        ("https://example.com/a", r#"<url><loc>/a</loc></url>"#, "seo-url", "1.0"),
        ("ключ", "значение with spaces\nand a newline", "seo-url", "2"),
        ("", "", "empty-strings", "0"),
    ];
    write_archive(
        &path,
        records.iter().enumerate().map(|(i, (key, value, name, version))| {
            (format!("{i}.json"), record_json(key, value, name, version))
        }),
    )?;

    let publisher = CapturingPublisher::new();
    run(config(&path), &publisher).await?;

    let messages = publisher.messages();
    assert_eq!(messages.len(), records.len());
    for (message, (key, value, name, version)) in messages.iter().zip(records.iter()) {
        assert_eq!(message.key, *key);
        assert_eq!(message.value, *value);
        assert_eq!(message.header(SCHEMA_NAME_HEADER), Some(*name));
        assert_eq!(message.header(SCHEMA_VERSION_HEADER), Some(*version));
    }
    Ok(())
}

#[tokio::test]
async fn test_non_string_record_value_is_serialized() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    let payload = serde_json::json!({
        "recordKey": 42,
        "recordValue": {"loc": "/a", "priority": 1},
        "schemaName": "seo-url",
        "schemaVersion": 3,
    })
    .to_string();
    write_archive(&path, [("0.json", payload)])?;

    let publisher = CapturingPublisher::new();
    run(config(&path), &publisher).await?;

    let messages = publisher.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].key, "42");
    let value: serde_json::Value = serde_json::from_str(&messages[0].value)?;
    assert_eq!(value, serde_json::json!({"loc": "/a", "priority": 1}));
    assert_eq!(messages[0].header(SCHEMA_VERSION_HEADER), Some("3"));
    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_publish_the_same_sequence() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_records_archive(&path, 40)?;

    let first = CapturingPublisher::new();
    run(config(&path), &first).await?;
    let second = CapturingPublisher::new();
    run(config(&path), &second).await?;

    let first = first.messages();
    let second = second.messages();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.key, b.key);
        assert_eq!(a.value, b.value);
        assert_eq!(a.header(SCHEMA_NAME_HEADER), b.header(SCHEMA_NAME_HEADER));
        assert_eq!(
            a.header(SCHEMA_VERSION_HEADER),
            b.header(SCHEMA_VERSION_HEADER)
        );
        assert_ne!(a.headers, b.headers);
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_archive_completes() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("empty.tar.gz");
    write_records_archive(&path, 0)?;

    let publisher = CapturingPublisher::new();
    let summary = run(config(&path), &publisher).await?;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.counters.records_published, 0);
    assert_eq!(publisher.publish_calls(), 0);
    assert_eq!(publisher.flushes(), 1);
    Ok(())
}

#[tokio::test]
async fn test_expected_messages_does_not_cap_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_records_archive(&path, 7)?;

    let mut config = config(&path);
    config.expected_messages = Some(3);
    let publisher = CapturingPublisher::new();
    let summary = run(config, &publisher).await?;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.expected_messages, Some(3));
    assert_eq!(summary.counters.records_published, 7);
    assert_eq!(publisher.messages().len(), 7);
    Ok(())
}
