//! End-to-end runs against real state files in a temp directory

use anyhow::Result;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use librotasky::platforms::mock::MockPlatform;
use librotasky::store::{FilePostStore, FileRecencyStore};
use librotasky::types::RunOutcome;
use librotasky::{RotaskyError, Runner, ScheduledPost};

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    fn scheduled_path(&self) -> std::path::PathBuf {
        self.dir.path().join("scheduled_posts.json")
    }

    fn pool_path(&self) -> std::path::PathBuf {
        self.dir.path().join("posts.txt")
    }

    fn state_path(&self) -> std::path::PathBuf {
        self.dir.path().join("bot_state.json")
    }

    fn write_scheduled(&self, posts: &[ScheduledPost]) -> Result<()> {
        let json = serde_json::to_string_pretty(posts)?;
        std::fs::write(self.scheduled_path(), json)?;
        Ok(())
    }

    fn write_pool(&self, lines: &str) -> Result<()> {
        std::fs::write(self.pool_path(), lines)?;
        Ok(())
    }

    fn write_state(&self, recent: &[&str]) -> Result<()> {
        let doc = serde_json::json!({ "recent_posts": recent });
        std::fs::write(self.state_path(), serde_json::to_string_pretty(&doc)?)?;
        Ok(())
    }

    fn read_scheduled(&self) -> Result<Vec<ScheduledPost>> {
        let raw = std::fs::read_to_string(self.scheduled_path())?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn read_recent(&self) -> Result<Vec<String>> {
        let raw = std::fs::read_to_string(self.state_path())?;
        let doc: serde_json::Value = serde_json::from_str(&raw)?;
        Ok(doc["recent_posts"]
            .as_array()
            .unwrap_or(&Vec::new())
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    fn runner(&self, platform: MockPlatform) -> Runner {
        Runner::new(
            Box::new(FilePostStore::new(self.scheduled_path(), self.pool_path())),
            Box::new(FileRecencyStore::new(self.state_path())),
            Box::new(platform),
            Box::new(StdRng::seed_from_u64(3)),
        )
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn scheduled_send_rewrites_only_the_fired_entry() -> Result<()> {
    let fx = Fixture::new()?;
    fx.write_scheduled(&[
        ScheduledPost::new("2023-12-25", "Merry Xmas"),
        ScheduledPost::new("2024-07-04", "fireworks"),
    ])?;
    fx.write_pool("generic\n")?;

    let mut runner = fx.runner(MockPlatform::success("mock"));
    runner.run(date(2026, 12, 25)).await?;

    let saved = fx.read_scheduled()?;
    assert!(saved[0].posted);
    assert!(saved[0].posted_at.is_some());
    assert_eq!(saved[0].date, "2023-12-25");
    assert_eq!(saved[1], ScheduledPost::new("2024-07-04", "fireworks"));

    // No rotation state was created for a scheduled send
    assert!(!fx.state_path().exists());
    Ok(())
}

#[tokio::test]
async fn rotation_send_writes_the_state_document() -> Result<()> {
    let fx = Fixture::new()?;
    fx.write_pool("a\nb\nc\n")?;
    fx.write_state(&["a", "b"])?;

    let mut runner = fx.runner(MockPlatform::success("mock"));
    let outcome = runner.run(date(2026, 6, 10)).await?;

    assert_eq!(outcome.text(), "c");
    assert_eq!(fx.read_recent()?, vec!["a", "b", "c"]);
    Ok(())
}

#[tokio::test]
async fn dispatch_failure_leaves_files_byte_identical() -> Result<()> {
    let fx = Fixture::new()?;
    fx.write_scheduled(&[ScheduledPost::new("2023-12-25", "Merry Xmas")])?;
    fx.write_pool("generic\n")?;
    fx.write_state(&["old"])?;

    let scheduled_before = std::fs::read(fx.scheduled_path())?;
    let state_before = std::fs::read(fx.state_path())?;

    let mut runner = fx.runner(MockPlatform::post_failure("mock"));
    let err = runner.run(date(2026, 12, 25)).await.unwrap_err();
    assert!(matches!(err, RotaskyError::Platform(_)));

    assert_eq!(std::fs::read(fx.scheduled_path())?, scheduled_before);
    assert_eq!(std::fs::read(fx.state_path())?, state_before);
    Ok(())
}

#[tokio::test]
async fn missing_files_fail_the_run_without_creating_anything() -> Result<()> {
    let fx = Fixture::new()?;

    let mut runner = fx.runner(MockPlatform::success("mock"));
    let err = runner.run(date(2026, 6, 10)).await.unwrap_err();

    assert!(matches!(err, RotaskyError::NoContent));
    assert!(!fx.scheduled_path().exists());
    assert!(!fx.state_path().exists());
    Ok(())
}

#[tokio::test]
async fn exhausted_pool_restarts_history_on_disk() -> Result<()> {
    let fx = Fixture::new()?;
    fx.write_pool("a\nb\n")?;
    fx.write_state(&["a", "b"])?;

    let mut runner = fx.runner(MockPlatform::success("mock"));
    let outcome = runner.run(date(2026, 6, 10)).await?;

    match &outcome {
        RunOutcome::Rotation {
            cycle_restarted, ..
        } => assert!(*cycle_restarted),
        other => panic!("Expected a rotation outcome, got {:?}", other),
    }

    // History restarted with just the chosen post
    assert_eq!(fx.read_recent()?, vec![outcome.text().to_string()]);
    Ok(())
}

#[tokio::test]
async fn corrupt_state_degrades_to_empty_history() -> Result<()> {
    let fx = Fixture::new()?;
    fx.write_pool("a\n")?;
    std::fs::write(fx.state_path(), "not a state document")?;

    let mut runner = fx.runner(MockPlatform::success("mock"));
    let outcome = runner.run(date(2026, 6, 10)).await?;
    assert_eq!(outcome.text(), "a");

    // The rewritten document is valid again
    assert_eq!(fx.read_recent()?, vec!["a"]);
    Ok(())
}

#[tokio::test]
async fn january_first_reset_survives_a_failed_dispatch() -> Result<()> {
    let fx = Fixture::new()?;
    let mut sent = ScheduledPost::new("2025-03-17", "st patrick");
    sent.mark_posted("2025-03-17T10:00:00+00:00".to_string());
    fx.write_scheduled(&[sent])?;
    fx.write_pool("generic\n")?;

    let mut runner = fx.runner(MockPlatform::post_failure("mock"));
    runner.run(date(2026, 1, 1)).await.unwrap_err();

    let saved = fx.read_scheduled()?;
    assert!(!saved[0].posted);
    assert!(saved[0].posted_at.is_none());
    Ok(())
}
