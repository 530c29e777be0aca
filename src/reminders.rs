use crate::config::Layout;
use crate::error::{Error, Result};
use crate::host::{Attrs, CmpOp, Direction, Host, Query};
use crate::ids::event_id;
use crate::labels::Lang;
use crate::mapper::{attr, date_value, parse_blocks, MapContext, Record};
use crate::types::{NewReminder, Reminder, ReminderStatus};
use chrono::NaiveDate;
use std::sync::Arc;

pub struct ReminderManager {
    host: Arc<dyn Host>,
    layout: Layout,
    lang: Lang,
}

impl ReminderManager {
    pub fn new(host: Arc<dyn Host>, layout: Layout, lang: Lang) -> Self {
        Self { host, layout, lang }
    }

    pub async fn create(&self, input: NewReminder) -> Result<Reminder> {
        if input.friend_id.trim().is_empty() {
            return Err(Error::InvalidInput("reminder needs a friend".to_string()));
        }

        let mut reminder = Reminder {
            id: event_id("reminder"),
            block_id: String::new(),
            friend_id: input.friend_id.trim().to_string(),
            friend_name: input.friend_name,
            due: input.due,
            message: input.message.trim().to_string(),
            status: ReminderStatus::Pending,
        };

        let ctx = MapContext {
            layout: &self.layout,
            lang: self.lang,
        };
        let doc = reminder.to_document(&ctx);

        reminder.block_id = self.host.create_document(&doc.hpath, &doc.markdown).await?;
        self.host.set_block_attrs(&reminder.block_id, &doc.attrs).await?;

        log::info!(
            "Created reminder {} for {} due {}",
            reminder.id,
            reminder.friend_id,
            reminder.due
        );
        Ok(reminder)
    }

    fn pending_query(&self) -> Query {
        Query::documents()
            .path_prefix(Reminder::prefix(&self.layout))
            .attr_eq(attr::REMINDER_STATUS, ReminderStatus::Pending.as_str())
    }

    /// Pending reminders due on or before `today`, earliest first. Read-only.
    pub async fn check_due(&self, today: NaiveDate) -> Result<Vec<Reminder>> {
        let query = self
            .pending_query()
            .attr_cmp(attr::REMINDER_DATE, CmpOp::Le, &date_value(Some(today)))
            .order_by_attr(attr::REMINDER_DATE, Direction::Asc);

        let blocks = self.host.query(&query).await?;
        Ok(parse_blocks(&blocks))
    }

    /// Every pending reminder regardless of due date, earliest first
    pub async fn pending(&self) -> Result<Vec<Reminder>> {
        let query = self
            .pending_query()
            .order_by_attr(attr::REMINDER_DATE, Direction::Asc);

        let blocks = self.host.query(&query).await?;
        Ok(parse_blocks(&blocks))
    }

    /// Mark a reminder done so it no longer comes up as due
    pub async fn complete(&self, reminder_id: &str) -> Result<Reminder> {
        let query = Query::documents()
            .path_prefix(Reminder::prefix(&self.layout))
            .attr_eq(attr::REMINDER_ID, reminder_id)
            .limit(1);

        let block = self
            .host
            .query(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(Reminder::KIND, reminder_id))?;
        let mut reminder = Reminder::from_block(&block).map_err(|e| {
            log::error!("Reminder {} is unreadable: {}", reminder_id, e);
            Error::from(e)
        })?;

        let mut attrs = Attrs::new();
        attrs.insert(
            attr::REMINDER_STATUS.to_string(),
            ReminderStatus::Done.as_str().to_string(),
        );
        self.host.set_block_attrs(&block.id, &attrs).await?;

        reminder.status = ReminderStatus::Done;
        log::info!("Completed reminder {}", reminder.id);
        Ok(reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::local::LocalHost;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn manager() -> ReminderManager {
        let host = Arc::new(LocalHost::in_memory().unwrap());
        ReminderManager::new(host, Layout::default(), Lang::En)
    }

    fn reminder(due: &str, message: &str) -> NewReminder {
        NewReminder {
            friend_id: "friend-alice".to_string(),
            friend_name: "Alice".to_string(),
            due: date(due),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_due_includes_today_and_skips_done() {
        let reminders = manager();
        let today = date("2024-06-01");

        let due_today = reminders.create(reminder("2024-06-01", "call")).await.unwrap();
        let overdue = reminders.create(reminder("2024-05-20", "write")).await.unwrap();
        let future = reminders.create(reminder("2024-06-02", "visit")).await.unwrap();
        let done = reminders.create(reminder("2024-05-01", "old")).await.unwrap();
        reminders.complete(&done.id).await.unwrap();

        let due = reminders.check_due(today).await.unwrap();
        let ids: Vec<&str> = due.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![overdue.id.as_str(), due_today.id.as_str()]);
        assert!(due.iter().all(|r| r.status == ReminderStatus::Pending));

        // Checking does not change anything
        assert_eq!(reminders.check_due(today).await.unwrap(), due);

        let pending = reminders.pending().await.unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[2].id, future.id);
    }

    #[tokio::test]
    async fn test_complete() {
        let reminders = manager();
        let created = reminders.create(reminder("2024-06-01", "call")).await.unwrap();
        assert_eq!(created.status, ReminderStatus::Pending);
        assert!(created.id.starts_with("reminder-"));

        let completed = reminders.complete(&created.id).await.unwrap();
        assert_eq!(completed.status, ReminderStatus::Done);
        assert_eq!(completed.message, "call");
        assert!(reminders
            .check_due(date("2024-06-01"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_complete_unknown() {
        let err = manager().complete("reminder-missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "reminder", .. }));
    }

    #[tokio::test]
    async fn test_create_requires_friend() {
        let mut input = reminder("2024-06-01", "call");
        input.friend_id = " ".to_string();
        let err = manager().create(input).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
