use crate::analytics;
use crate::config::{Backend, Layout, Settings};
use crate::error::{Error, Result};
use crate::friends::FriendManager;
use crate::host::local::LocalHost;
use crate::host::siyuan::SiYuanHost;
use crate::host::Host;
use crate::interactions::InteractionLogger;
use crate::labels::{Lang, Text};
use crate::reminders::ReminderManager;
use crate::types::{
    Friend, FriendUpdate, Interaction, InteractionQuery, NewFriend, NewInteraction, NewReminder,
    OverallStats, Period, Reminder, SearchFilters, TypeStat,
};
use chrono::NaiveDate;
use std::sync::Arc;

/// The main friendship-recorder interface
pub struct Friendships {
    host: Arc<dyn Host>,
    layout: Layout,
    lang: Lang,
    friends: FriendManager,
    interactions: InteractionLogger,
    reminders: Arc<ReminderManager>,
}

/// Build the configured backend
pub fn open_host(settings: &Settings) -> Result<Arc<dyn Host>> {
    let host: Arc<dyn Host> = match settings.backend {
        Backend::SiYuan => Arc::new(SiYuanHost::new(&settings.siyuan())?),
        Backend::Local => Arc::new(LocalHost::open(&settings.db_path)?),
    };
    Ok(host)
}

impl Friendships {
    /// Connect to the configured host and load the friend list
    pub async fn open(settings: &Settings) -> Result<Self> {
        let host = open_host(settings)?;
        Self::with_host(host, settings.layout.clone(), settings.lang).await
    }

    pub async fn with_host(host: Arc<dyn Host>, layout: Layout, lang: Lang) -> Result<Self> {
        let mut friends = FriendManager::new(host.clone(), layout.clone(), lang);
        let report = friends.load().await?;
        if report.skipped > 0 {
            log::warn!("{} friend documents could not be read", report.skipped);
        }

        Ok(Self {
            interactions: InteractionLogger::new(host.clone(), layout.clone(), lang),
            reminders: Arc::new(ReminderManager::new(host.clone(), layout.clone(), lang)),
            host,
            layout,
            lang,
            friends,
        })
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    /// Shared handle for the background poller
    pub fn reminder_manager(&self) -> Arc<ReminderManager> {
        self.reminders.clone()
    }

    // =========================================================================
    // Friends
    // =========================================================================

    pub async fn add_friend(&mut self, input: NewFriend) -> Result<Friend> {
        self.friends.create(input).await
    }

    pub async fn update_friend(&mut self, id: &str, update: &FriendUpdate) -> Result<Friend> {
        self.friends.update(id, update).await
    }

    /// Look a friend up by id, falling back to an exact (case-insensitive) name
    pub fn friend(&self, id_or_name: &str) -> Result<&Friend> {
        if let Some(friend) = self.friends.get(id_or_name) {
            return Ok(friend);
        }

        let wanted = id_or_name.trim().to_lowercase();
        let mut matches = self
            .friends
            .search("", &SearchFilters::default())
            .into_iter()
            .filter(|f| f.name.to_lowercase() == wanted);

        match (matches.next(), matches.next()) {
            (Some(friend), None) => Ok(friend),
            (Some(_), Some(_)) => Err(Error::InvalidInput(format!(
                "several friends are named {:?}, use the id instead",
                id_or_name
            ))),
            _ => Err(Error::not_found("friend", id_or_name)),
        }
    }

    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<&Friend> {
        self.friends.search(query, filters)
    }

    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    pub async fn log_interaction(&mut self, input: NewInteraction) -> Result<Interaction> {
        let logged = self.interactions.log(input).await?;
        if logged.last_contact_updated {
            if let Some(friend_id) = &logged.interaction.friend_id {
                self.friends.note_contact(friend_id, logged.interaction.date);
            }
        }
        Ok(logged.interaction)
    }

    pub async fn interactions(&self, friend_id: &str, opts: &InteractionQuery) -> Result<Vec<Interaction>> {
        self.interactions.for_friend(friend_id, opts).await
    }

    pub async fn friend_stats(&self, friend_id: &str, period: Period, today: NaiveDate) -> Result<Vec<TypeStat>> {
        self.interactions.stats(friend_id, period, today).await
    }

    // =========================================================================
    // Reminders
    // =========================================================================

    /// Schedule a reminder. Unknown friends are allowed and get a placeholder name.
    pub async fn set_reminder(&self, friend_id: &str, due: NaiveDate, message: &str) -> Result<Reminder> {
        let friend_name = match self.friends.get(friend_id) {
            Some(friend) => friend.name.clone(),
            None => {
                log::warn!("Reminder for unknown friend {}", friend_id);
                self.lang.text(Text::UnknownFriend).to_string()
            }
        };

        self.reminders
            .create(NewReminder {
                friend_id: friend_id.to_string(),
                friend_name,
                due,
                message: message.to_string(),
            })
            .await
    }

    pub async fn due_reminders(&self, today: NaiveDate) -> Result<Vec<Reminder>> {
        self.reminders.check_due(today).await
    }

    pub async fn pending_reminders(&self) -> Result<Vec<Reminder>> {
        self.reminders.pending().await
    }

    pub async fn complete_reminder(&self, reminder_id: &str) -> Result<Reminder> {
        self.reminders.complete(reminder_id).await
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    pub async fn overall_stats(&self, period: Period, today: NaiveDate) -> Result<OverallStats> {
        analytics::overall(self.host.as_ref(), &self.layout, period, today).await
    }
}
