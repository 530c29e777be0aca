use super::{parse_day, today};
use crate::config::Settings;
use crate::error::Result;
use crate::recorder::Friendships;
use crate::scheduler::{ConsoleNotifier, LogNotifier, Notifier, ReminderPoller};
use crate::types::Reminder;
use std::sync::Arc;
use std::time::Duration;

/// Run the remind command
pub async fn run_remind(settings: &Settings, friend: &str, due: &str, message: &str) -> Result<()> {
    let due = parse_day(due)?;
    let app = Friendships::open(settings).await?;

    // Unknown friends are still accepted, with a placeholder name
    let friend_id = match app.friend(friend) {
        Ok(f) => f.id.clone(),
        Err(_) => friend.to_string(),
    };

    let reminder = app.set_reminder(&friend_id, due, message).await?;
    println!(
        "Reminder set for {} on {} [{}]",
        reminder.friend_name, reminder.due, reminder.id
    );

    Ok(())
}

/// Run the due command
pub async fn run_due(settings: &Settings, all: bool) -> Result<()> {
    let app = Friendships::open(settings).await?;

    let reminders = if all {
        app.pending_reminders().await?
    } else {
        app.due_reminders(today()).await?
    };

    if reminders.is_empty() {
        println!("No reminders due.");
        return Ok(());
    }

    for r in &reminders {
        print_reminder(r);
    }

    Ok(())
}

/// Run the done command
pub async fn run_done(settings: &Settings, id: &str) -> Result<()> {
    let app = Friendships::open(settings).await?;
    let reminder = app.complete_reminder(id).await?;
    println!("Done: contact {} [{}]", reminder.friend_name, reminder.id);
    Ok(())
}

/// Run the watch command: check for due reminders until Ctrl-C
pub async fn run_watch(settings: &Settings, interval_secs: Option<u64>, log_only: bool) -> Result<()> {
    let app = Friendships::open(settings).await?;
    let interval = interval_secs
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
        .unwrap_or(settings.reminder_interval);

    let notifier: Arc<dyn Notifier> = if log_only {
        Arc::new(LogNotifier)
    } else {
        Arc::new(ConsoleNotifier { lang: app.lang() })
    };

    println!(
        "Watching for due reminders every {}s. Press Ctrl-C to stop.",
        interval.as_secs()
    );
    let handle = ReminderPoller::new(app.reminder_manager(), interval, notifier).spawn();

    tokio::signal::ctrl_c().await?;
    handle.stop().await;
    println!("Stopped.");

    Ok(())
}

fn print_reminder(r: &Reminder) {
    println!("[{}] {}  {}", r.id, r.due, r.friend_name);
    if !r.message.is_empty() {
        println!("    {}", r.message);
    }
}
