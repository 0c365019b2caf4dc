use std::time::Duration;

use chrono::{DateTime, Local};
use ticker_core::{Clock, TimerId, TimerInfo, Timestamp};
use tokio::task::JoinHandle;

use crate::context::CliContext;

/// How long the demo lets `bbb` repeat before cancelling it
pub const DEMO_CANCEL_AFTER: Duration = Duration::from_secs(20);

/// Schedule a timer that announces `label` when it fires.
pub async fn add_timer(ctx: &CliContext, label: String, delay: u64, interval: u64) -> TimerId {
    warn_if_driver_stopped(ctx).await;
    schedule(ctx, label, delay, interval).await
}

async fn schedule(ctx: &CliContext, label: String, delay: u64, interval: u64) -> TimerId {
    let now = ctx.clock.now();
    let clock = std::sync::Arc::clone(&ctx.clock);
    let message = label.clone();
    let callback = move || {
        tracing::info!(timer = %message, "Timer fired");
        println!("{} => {}", clock.now(), message);
    };

    let id = ctx
        .manager
        .lock()
        .await
        .add_timer_after(callback, now, delay, interval);

    tracing::info!(id = id.get(), %label, delay, interval, "Scheduled timer");
    id
}

pub async fn remove_timer(ctx: &CliContext, id: u64) {
    let removed = ctx.manager.lock().await.remove_timer(TimerId::new(id));
    if removed {
        println!("removed timer {id}");
    } else {
        println!("no pending timer {id}");
    }
}

pub async fn list_timers(ctx: &CliContext) {
    warn_if_driver_stopped(ctx).await;
    let pending = ctx.manager.lock().await.pending();
    if pending.is_empty() {
        println!("No pending timers");
        return;
    }

    println!("{:<8} {:<22} {}", "Id", "Deadline", "Interval");
    println!("{}", "-".repeat(40));
    for line in format_pending(&pending) {
        println!("{line}");
    }
    println!("\nTotal: {} timers", pending.len());
}

/// The original schedule: `aaa` once right away, `bbb` every 5s and `ccc`
/// every 10s, both starting now. `bbb` is cancelled after
/// [`DEMO_CANCEL_AFTER`].
pub async fn run_demo(ctx: &CliContext) -> Vec<TimerId> {
    let (ids, _cancel) = run_demo_with(ctx, DEMO_CANCEL_AFTER).await;
    ids
}

/// Like [`run_demo`], cancelling `bbb` after `cancel_after`. The returned
/// task finishes once the cancellation has run.
pub async fn run_demo_with(
    ctx: &CliContext,
    cancel_after: Duration,
) -> (Vec<TimerId>, JoinHandle<()>) {
    warn_if_driver_stopped(ctx).await;
    let ids = vec![
        schedule(ctx, "aaa".to_string(), 0, 0).await,
        schedule(ctx, "bbb".to_string(), 0, 5).await,
        schedule(ctx, "ccc".to_string(), 0, 10).await,
    ];

    let bbb = ids[1];
    let manager = std::sync::Arc::clone(&ctx.manager);
    let cancel = tokio::spawn(async move {
        tokio::time::sleep(cancel_after).await;
        let removed = manager.lock().await.remove_timer(bbb);
        tracing::info!(id = bbb.get(), removed, "Demo cancelled bbb");
    });

    (ids, cancel)
}

/// Timers only fire while the driver runs. Returns true if it is stopped.
pub async fn warn_if_driver_stopped(ctx: &CliContext) -> bool {
    if ctx.driver_running().await {
        return false;
    }
    tracing::warn!("Driver is not running, timers will not fire");
    println!("warning: driver is not running, timers will not fire");
    true
}

pub async fn show_settings(ctx: &CliContext) {
    let config = ctx.config.read().await;
    println!("tick interval: {}ms", config.tick_interval_ms);
    println!("queue capacity: {}", config.queue_capacity);
    println!("log to file: {}", config.log_to_file);
    println!("driver running: {}", ctx.driver_running().await);
}

pub async fn exit(ctx: &CliContext) {
    ctx.stop_driver().await;
    println!("quitting...");
}

pub fn format_pending(pending: &[TimerInfo]) -> Vec<String> {
    pending
        .iter()
        .map(|timer| {
            let interval = if timer.interval > 0 {
                format!("every {}s", timer.interval)
            } else {
                "once".to_string()
            };
            format!("{:<8} {:<22} {}", timer.id.get(), format_deadline(timer.deadline), interval)
        })
        .collect()
}

fn format_deadline(deadline: Timestamp) -> String {
    i64::try_from(deadline)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| deadline.to_string())
}
