//! Background check for due reminders.
//!
//! The poller checks once on start, then every interval until stopped. It
//! only reads; reminders stay pending until someone completes them, so a
//! reminder that is not acted on is reported again on every tick.

use crate::labels::{Lang, Text};
use crate::reminders::ReminderManager;
use crate::types::Reminder;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Receives the reminders found due on a tick. Only called when there are any.
pub trait Notifier: Send + Sync {
    fn notify(&self, due: &[Reminder]);
}

/// Writes due reminders to the log
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, due: &[Reminder]) {
        for reminder in due {
            log::info!(
                "Reminder due {}: contact {} ({})",
                reminder.due,
                reminder.friend_name,
                reminder.message
            );
        }
    }
}

/// Prints due reminders to stdout for `friends watch`
pub struct ConsoleNotifier {
    pub lang: Lang,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, due: &[Reminder]) {
        println!("{} ({}):", self.lang.text(Text::UpcomingReminders), due.len());
        for reminder in due {
            println!(
                "  {}  {} {}  {}",
                reminder.due,
                self.lang.text(Text::ReminderTitle),
                reminder.friend_name,
                reminder.message
            );
            println!("      id: {}", reminder.id);
        }
    }
}

pub type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Stops the poller when stopped or dropped
pub struct PollerHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal the poller and wait for the running check, if any, to finish
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("Reminder poller ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

pub struct ReminderPoller {
    reminders: Arc<ReminderManager>,
    interval: Duration,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
}

impl ReminderPoller {
    pub fn new(reminders: Arc<ReminderManager>, interval: Duration, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            reminders,
            interval,
            notifier,
            clock: Box::new(local_today),
        }
    }

    /// Replace the source of "today"
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn spawn(self) -> PollerHandle {
        let (stop, stopped) = watch::channel(false);
        let task = tokio::spawn(self.run(stopped));
        PollerHandle {
            stop,
            task: Some(task),
        }
    }

    async fn run(self, mut stopped: watch::Receiver<bool>) {
        log::info!(
            "Reminder poller started, checking every {}s",
            self.interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.check().await,
                changed = stopped.changed() => {
                    // A closed channel means the handle is gone
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Reminder poller stopped");
    }

    async fn check(&self) {
        let today = (self.clock)();
        match self.reminders.check_due(today).await {
            Ok(due) if due.is_empty() => log::debug!("No reminders due on {}", today),
            Ok(due) => {
                log::debug!("{} reminders due on {}", due.len(), today);
                self.notifier.notify(&due);
            }
            // Try again next tick
            Err(e) => log::error!("Reminder check failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::host::local::LocalHost;
    use crate::types::NewReminder;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, due: &[Reminder]) {
            let ids = due.iter().map(|r| r.id.clone()).collect();
            self.batches.lock().unwrap().push(ids);
        }
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.batches.lock().unwrap().len()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn manager_with_due() -> (Arc<ReminderManager>, String) {
        let host = Arc::new(LocalHost::in_memory().unwrap());
        let reminders = ReminderManager::new(host, Layout::default(), Lang::En);
        let reminder = reminders
            .create(NewReminder {
                friend_id: "friend-alice".to_string(),
                friend_name: "Alice".to_string(),
                due: date("2024-06-01"),
                message: "call".to_string(),
            })
            .await
            .unwrap();
        (Arc::new(reminders), reminder.id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_stopped() {
        let (reminders, id) = manager_with_due().await;
        let recorder = Arc::new(Recorder::default());

        let handle = ReminderPoller::new(reminders, Duration::from_secs(3600), recorder.clone())
            .with_clock(Box::new(|| date("2024-06-01")))
            .spawn();

        // Ticks at 0h, 1h and 2h
        tokio::time::sleep(Duration::from_secs(2 * 3600 + 60)).await;
        assert_eq!(recorder.count(), 3);
        assert_eq!(recorder.batches.lock().unwrap()[0], vec![id]);

        handle.stop().await;
        tokio::time::sleep(Duration::from_secs(5 * 3600)).await;
        assert_eq!(recorder.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_due_is_silent() {
        let (reminders, _) = manager_with_due().await;
        let recorder = Arc::new(Recorder::default());

        let handle = ReminderPoller::new(reminders, Duration::from_secs(60), recorder.clone())
            .with_clock(Box::new(|| date("2024-05-01")))
            .spawn();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(recorder.count(), 0);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_poller() {
        let (reminders, _) = manager_with_due().await;
        let recorder = Arc::new(Recorder::default());

        let handle = ReminderPoller::new(reminders, Duration::from_secs(60), recorder.clone())
            .with_clock(Box::new(|| date("2024-06-01")))
            .spawn();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(recorder.count(), 1);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(recorder.count(), 1);
    }
}
