use std::sync::Arc;

use actionlog_core::{FireSpec, ScheduledItem};
use actionlog_service::{PlatformEvent, ReminderRequest, Scheduler, TokioTimerPlatform};
use actionlog_storage::SqliteKv;
use anyhow::{Context as _, Result};
use chrono::{FixedOffset, Utc};
use tokio::sync::mpsc;

use crate::{ReminderArgs, WhenArgs, open_kv, tz_offset};

type CliScheduler = Scheduler<TokioTimerPlatform, Arc<SqliteKv>>;

async fn scheduler() -> Result<(CliScheduler, mpsc::Receiver<PlatformEvent>)> {
    let (platform, events) = TokioTimerPlatform::new(64);
    let scheduler = Scheduler::new(platform, open_kv()?, tz_offset()?);
    scheduler.request_permission().await;
    Ok((scheduler, events))
}

fn fire_spec(when: &WhenArgs) -> Result<FireSpec> {
    match (when.once, when.daily, when.at) {
        (Some(t), None, None) => Ok(FireSpec::Once(t)),
        (None, Some(t), None) => Ok(FireSpec::Daily(t)),
        (None, None, Some(at)) => Ok(FireSpec::Date(at)),
        _ => anyhow::bail!("give exactly one of --once, --daily or --at"),
    }
}

fn request(args: ReminderArgs) -> Result<ReminderRequest> {
    let spec = fire_spec(&args.when)?;
    Ok(ReminderRequest { title: args.title, body: args.body, spec })
}

fn describe(item: &ScheduledItem, offset: FixedOffset) -> String {
    let local = item.when.with_timezone(&offset).format("%Y-%m-%d %H:%M");
    let armed = if item.native_id.is_some() { "" } else { "  (fired)" };
    format!("{}  {local}  {:<5}  {}{armed}", item.id, item.recurrence.as_str(), item.title)
}

pub(crate) async fn run_add(args: ReminderArgs) -> Result<()> {
    let (scheduler, _events) = scheduler().await?;
    let item = scheduler.schedule(request(args)?, Utc::now()).await?;
    println!("Scheduled {}", describe(&item, scheduler.offset()));
    Ok(())
}

pub(crate) async fn run_list() -> Result<()> {
    let (scheduler, _events) = scheduler().await?;
    let items = scheduler.list().await;
    if items.is_empty() {
        println!("No reminders.");
    }
    for item in &items {
        println!("{}", describe(item, scheduler.offset()));
    }
    Ok(())
}

pub(crate) async fn run_cancel(id: &str) -> Result<()> {
    let (scheduler, _events) = scheduler().await?;
    if !scheduler.cancel(id).await {
        anyhow::bail!("reminder not found: {id}");
    }
    println!("Cancelled {id}");
    Ok(())
}

pub(crate) async fn run_edit(id: &str, args: ReminderArgs) -> Result<()> {
    let (scheduler, _events) = scheduler().await?;
    let item = scheduler.edit(id, request(args)?, Utc::now()).await?;
    println!("Updated {}", describe(&item, scheduler.offset()));
    Ok(())
}

pub(crate) async fn run_prune() -> Result<()> {
    let (scheduler, _events) = scheduler().await?;
    let removed = scheduler.prune_expired(Utc::now()).await;
    println!("Removed {removed} expired reminder(s)");
    Ok(())
}

/// Re-arms stored reminders and prints each one as it fires, until Ctrl-C.
pub(crate) async fn run_forever() -> Result<()> {
    let (scheduler, events) = scheduler().await?;
    let armed = scheduler.rehydrate(Utc::now()).await?;
    println!("{armed} reminder(s) armed. Waiting, Ctrl-C to stop.");
    let offset = scheduler.offset();
    tokio::select! {
        () = scheduler.run(events, |item| println!("Reminder: {}", describe(item, offset))) => {},
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
        },
    }
    Ok(())
}
