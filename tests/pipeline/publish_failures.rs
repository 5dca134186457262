use crate::{config, run};
use archive_kafka_publisher::PublishError;
use archive_loader::testing::{write_records_archive, CapturingPublisher};
use archive_loader::{Error, RunState};

#[tokio::test]
async fn test_flush_failure_fails_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_records_archive(&path, 3)?;

    let publisher = CapturingPublisher::failing_on_flush();
    let failure = run(config(&path), &publisher)
        .await
        .expect_err("flush failure should fail the run");

    assert_eq!(failure.failed_in, RunState::Draining);
    assert!(matches!(
        failure.error,
        Error::Publish(PublishError::Delivery(_))
    ));
    assert_eq!(failure.counters.records_published, 3);
    assert!(failure.to_string().contains("after publishing 3 records"));
    Ok(())
}

#[tokio::test]
async fn test_publish_failure_stops_reading() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_records_archive(&path, 5)?;

    let publisher = CapturingPublisher::failing_after(2);
    let failure = run(config(&path), &publisher)
        .await
        .expect_err("publish failure should fail the run");

    assert_eq!(failure.failed_in, RunState::Reading);
    assert!(matches!(failure.error, Error::Publish(_)));
    assert_eq!(failure.counters.records_published, 2);
    assert_eq!(publisher.publish_calls(), 3);
    assert_eq!(publisher.flushes(), 0);
    Ok(())
}

#[tokio::test]
async fn test_flush_interval_adds_barriers() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_records_archive(&path, 25)?;

    let mut config = config(&path);
    config.flush_interval = Some(10);
    let publisher = CapturingPublisher::new();
    let summary = run(config, &publisher).await?;

    assert_eq!(summary.counters.records_published, 25);
    // Barriers after 10 and 20 records, then the final drain.
    assert_eq!(publisher.flushes(), 3);
    Ok(())
}

#[tokio::test]
async fn test_intermediate_flush_failure_fails_while_reading() -> Result<(), Box<dyn std::error::Error>>
{
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("messages.tar.gz");
    write_records_archive(&path, 25)?;

    let mut config = config(&path);
    config.flush_interval = Some(10);
    let publisher = CapturingPublisher::failing_on_flush();
    let failure = run(config, &publisher)
        .await
        .expect_err("flush failure should fail the run");

    assert_eq!(failure.failed_in, RunState::Reading);
    assert_eq!(failure.counters.records_published, 10);
    assert_eq!(publisher.flushes(), 1);
    Ok(())
}
