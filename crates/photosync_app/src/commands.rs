use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use photosync_core::{ChannelMode, SessionViewModel, SyncStatus};
use photosync_engine::EngineHandle;
use photosync_logging::{sync_info, sync_warn};

use crate::config::AppConfig;
use crate::runner::SessionRunner;
use crate::traffic::read_traffic;

// Extra time on top of the submit timeout before giving up on an answer.
const SUBMIT_GRACE: Duration = Duration::from_secs(1);

pub fn run_replay(config: &AppConfig, files: &[PathBuf], sync: bool, watch: u64) -> Result<()> {
    let settings = config.agent_settings();
    let engine = EngineHandle::new(settings.clone()).context("start engine")?;
    let mut runner = SessionRunner::new(config.classifier_rules(), engine);
    if sync || watch > 0 {
        runner.connect_status();
    }

    for path in files {
        let responses = read_traffic(path)?;
        let before = runner.view().seen_count;
        let count = responses.len();
        runner.ingest_all(responses);
        let view = runner.view();
        sync_info!(
            "{}: {} responses, {} new items",
            path.display(),
            count,
            view.seen_count - before
        );
    }

    let view = runner.view();
    println!(
        "Activity: {} | albums: {} | captured: {} | pending: {}",
        view.activity_name, view.album_count, view.seen_count, view.pending_count
    );

    if sync {
        match runner.sync_and_wait(settings.submit_timeout + SUBMIT_GRACE) {
            SyncStatus::Succeeded { count } => println!("Synced {count} items"),
            SyncStatus::NothingToSync => println!("Nothing to sync"),
            SyncStatus::Failed { outcome } => bail!("sync failed: {outcome}"),
            SyncStatus::Submitting { count } => bail!("no answer from agent for {count} items"),
            SyncStatus::Idle => bail!("sync did not start"),
        }
    } else {
        for item in runner.state().store().pending() {
            println!("{}\t{}\t{}", item.album(), item.name(), item.url());
        }
    }

    if watch > 0 {
        runner.watch(Duration::from_secs(watch), report_progress, is_finished);
    }
    Ok(())
}

pub fn run_status(config: &AppConfig, watch: u64) -> Result<()> {
    let engine = EngineHandle::new(config.agent_settings()).context("start engine")?;
    let mut runner = SessionRunner::new(config.classifier_rules(), engine);
    runner.connect_status();
    runner.watch(Duration::from_secs(watch), report_progress, is_finished);

    let view = runner.view();
    if !view.online {
        sync_warn!("Agent at {} not reachable", config.agent_url);
    }
    println!("{}", progress_line(&view));
    Ok(())
}

fn report_progress(view: &SessionViewModel) {
    sync_info!("{}", progress_line(view));
}

fn is_finished(view: &SessionViewModel) -> bool {
    view.progress.finished
}

fn progress_line(view: &SessionViewModel) -> String {
    let link = match (view.mode, view.online) {
        (ChannelMode::Disconnected, _) => "disconnected",
        (_, false) => "agent offline",
        (ChannelMode::Pushing, true) => "live",
        (ChannelMode::Polling, true) => "polling",
    };
    format!(
        "[{link}] {}% {} ({})",
        view.progress.percent, view.progress.summary, view.progress.current
    )
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Instant;

    use tempfile::TempDir;

    use super::*;

    fn unreachable_agent() -> AppConfig {
        AppConfig {
            agent_url: "http://127.0.0.1:1".to_string(),
            connect_timeout_ms: 200,
            status_timeout_ms: 200,
            ..AppConfig::default()
        }
    }

    #[test]
    fn replay_without_sync_still_watches() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("capture.jsonl");
        fs::write(
            &path,
            "{\"target\": \"/pics?key=1\", \"body\": {\"result\": {\"pics_array\": [{\"pic_url\": \"//cdn/1.jpg\"}]}}}\n",
        )
        .unwrap();

        let started = Instant::now();
        run_replay(&unreachable_agent(), &[path], false, 1).unwrap();

        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn replay_without_watch_returns_after_listing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("capture.jsonl");
        fs::write(&path, "").unwrap();

        let started = Instant::now();
        run_replay(&unreachable_agent(), &[path], false, 0).unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
