use crate::config::Layout;
use crate::error::{Error, Result};
use crate::host::{Attrs, CmpOp, Direction, Host, Query};
use crate::ids::event_id;
use crate::labels::Lang;
use crate::mapper::{attr, date_value, parse_blocks, parse_date, MapContext, Record};
use crate::types::{
    clamp_mood, non_empty, normalize_tags, Friend, Interaction, InteractionKind,
    InteractionQuery, NewInteraction, Period, TypeStat, DEFAULT_MOOD,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of logging an interaction
#[derive(Debug, Clone)]
pub struct LoggedInteraction {
    pub interaction: Interaction,
    /// Whether the friend's last-contact date was moved to this interaction's date
    pub last_contact_updated: bool,
}

/// Writes interaction documents and queries them back
pub struct InteractionLogger {
    host: Arc<dyn Host>,
    layout: Layout,
    lang: Lang,
}

impl InteractionLogger {
    pub fn new(host: Arc<dyn Host>, layout: Layout, lang: Lang) -> Self {
        Self { host, layout, lang }
    }

    /// Persist an interaction, then bump the friend's last-contact date.
    ///
    /// The two host writes are not transactional: if the bump fails the
    /// interaction stays logged and the failure is only reported in the log.
    pub async fn log(&self, input: NewInteraction) -> Result<LoggedInteraction> {
        let mut interaction = Interaction {
            id: event_id("interaction"),
            block_id: String::new(),
            friend_id: input.friend_id.as_deref().and_then(non_empty),
            kind: input.kind,
            date: input.date,
            mood: clamp_mood(input.mood.unwrap_or(DEFAULT_MOOD)),
            location: input.location.as_deref().and_then(non_empty),
            cost: input.cost.filter(|c| c.is_finite()).unwrap_or(0.0),
            tags: normalize_tags(input.tags.iter().map(String::as_str)),
            title: input.title.as_deref().and_then(non_empty),
            content: input.content.as_deref().and_then(non_empty),
        };

        let ctx = MapContext {
            layout: &self.layout,
            lang: self.lang,
        };
        let doc = interaction.to_document(&ctx);

        let block_id = self.host.create_document(&doc.hpath, &doc.markdown).await?;
        self.host.set_block_attrs(&block_id, &doc.attrs).await?;
        interaction.block_id = block_id;
        log::info!("Logged {} interaction {}", interaction.kind, interaction.id);

        let mut last_contact_updated = false;
        if let Some(friend_id) = &interaction.friend_id {
            match self.bump_last_contact(friend_id, interaction.date).await {
                Ok(updated) => last_contact_updated = updated,
                Err(e) => log::warn!(
                    "Interaction {} logged but last contact of {} not updated: {}",
                    interaction.id,
                    friend_id,
                    e
                ),
            }
        }

        Ok(LoggedInteraction {
            interaction,
            last_contact_updated,
        })
    }

    /// Set the friend's last-contact attribute to `date` unless it is already later
    async fn bump_last_contact(&self, friend_id: &str, date: NaiveDate) -> Result<bool> {
        let query = Query::documents()
            .path_prefix(Friend::prefix(&self.layout))
            .attr_eq(attr::FRIEND_ID, friend_id)
            .limit(1);
        let block = self
            .host
            .query(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(Friend::KIND, friend_id))?;

        let current = parse_date(block.attrs().get(attr::FRIEND_LAST_CONTACT).map_or("", String::as_str));
        if current.is_some_and(|d| d > date) {
            log::debug!("Last contact of {} is already later than {}", friend_id, date);
            return Ok(false);
        }

        let mut attrs = Attrs::new();
        attrs.insert(attr::FRIEND_LAST_CONTACT.to_string(), date_value(Some(date)));
        self.host.set_block_attrs(&block.id, &attrs).await?;
        Ok(true)
    }

    /// A friend's interactions, newest first
    pub async fn for_friend(&self, friend_id: &str, opts: &InteractionQuery) -> Result<Vec<Interaction>> {
        log::debug!(
            "Fetching interactions for {} (limit {}, offset {})",
            friend_id,
            opts.limit,
            opts.offset
        );

        let mut query = Query::documents()
            .path_prefix(Interaction::prefix(&self.layout))
            .attr_eq(attr::FRIEND_ID, friend_id);
        if let Some(kind) = opts.kind {
            query = query.attr_eq(attr::INTERACTION_TYPE, kind.as_str());
        }
        let query = query
            .order_by_attr(attr::INTERACTION_DATE, Direction::Desc)
            .limit(opts.limit)
            .offset(opts.offset);

        let blocks = self.host.query(&query).await?;
        Ok(parse_blocks(&blocks))
    }

    /// Count and average mood per interaction type within `period` before `today`
    pub async fn stats(&self, friend_id: &str, period: Period, today: NaiveDate) -> Result<Vec<TypeStat>> {
        let start = period.start_date(today);
        let query = Query::documents()
            .path_prefix(Interaction::prefix(&self.layout))
            .attr_eq(attr::FRIEND_ID, friend_id)
            .attr_cmp(attr::INTERACTION_DATE, CmpOp::Ge, &date_value(Some(start)));

        let blocks = self.host.query(&query).await?;
        let interactions: Vec<Interaction> = parse_blocks(&blocks);
        Ok(summarize(&interactions))
    }
}

/// Group interactions by type, in type order
pub fn summarize(interactions: &[Interaction]) -> Vec<TypeStat> {
    let mut groups: BTreeMap<InteractionKind, (usize, u32)> = BTreeMap::new();
    for interaction in interactions {
        let entry = groups.entry(interaction.kind).or_default();
        entry.0 += 1;
        entry.1 += interaction.mood as u32;
    }

    groups
        .into_iter()
        .map(|(kind, (count, mood_sum))| TypeStat {
            kind,
            count,
            avg_mood: mood_sum as f64 / count as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friends::FriendManager;
    use crate::host::local::LocalHost;
    use crate::host::Block;
    use crate::types::NewFriend;
    use async_trait::async_trait;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn setup() -> (Arc<LocalHost>, InteractionLogger, FriendManager) {
        let host = Arc::new(LocalHost::in_memory().unwrap());
        let mut friends = FriendManager::new(host.clone(), Layout::default(), Lang::En);
        friends
            .create(NewFriend {
                name: "Alice".to_string(),
                relationship: Some("colleague".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let logger = InteractionLogger::new(host.clone(), Layout::default(), Lang::En);
        (host, logger, friends)
    }

    fn meal(friend_id: &str, day: &str) -> NewInteraction {
        NewInteraction {
            friend_id: Some(friend_id.to_string()),
            ..NewInteraction::new(InteractionKind::Meal, date(day))
        }
    }

    async fn last_contact(host: &LocalHost) -> Option<String> {
        let rows = host
            .query(&Query::documents().path_prefix("/Friends/"))
            .await
            .unwrap();
        rows[0].attrs().get(attr::FRIEND_LAST_CONTACT).cloned()
    }

    #[tokio::test]
    async fn test_log_updates_last_contact() {
        let (host, logger, mut friends) = setup().await;

        let logged = logger.log(meal("friend-alice", "2024-01-01")).await.unwrap();
        assert!(logged.last_contact_updated);
        assert_eq!(logged.interaction.mood, 3);
        assert_eq!(logged.interaction.cost, 0.0);
        assert_eq!(last_contact(&host).await.as_deref(), Some("2024-01-01"));

        // An older interaction does not move the date back
        let logged = logger.log(meal("friend-alice", "2023-12-01")).await.unwrap();
        assert!(!logged.last_contact_updated);
        assert_eq!(last_contact(&host).await.as_deref(), Some("2024-01-01"));

        friends.load().await.unwrap();
        assert_eq!(
            friends.get("friend-alice").unwrap().last_contact,
            Some(date("2024-01-01"))
        );
    }

    #[tokio::test]
    async fn test_log_without_friend() {
        let (host, logger, _) = setup().await;

        let logged = logger
            .log(NewInteraction::new(InteractionKind::Chat, date("2024-01-01")))
            .await
            .unwrap();
        assert!(!logged.last_contact_updated);
        assert_eq!(logged.interaction.friend_id, None);
        assert_eq!(last_contact(&host).await, None);
    }

    #[tokio::test]
    async fn test_unknown_friend_does_not_fail_log() {
        let (host, logger, _) = setup().await;

        let logged = logger.log(meal("friend-ghost", "2024-01-01")).await.unwrap();
        assert!(!logged.last_contact_updated);

        let rows = host
            .query(&Query::documents().path_prefix("/Interactions/"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    /// Passes everything through except writes of the last-contact attribute
    struct FailingBump(Arc<LocalHost>);

    #[async_trait]
    impl Host for FailingBump {
        async fn create_document(&self, hpath: &str, markdown: &str) -> Result<String> {
            self.0.create_document(hpath, markdown).await
        }

        async fn set_block_attrs(&self, block_id: &str, attrs: &Attrs) -> Result<()> {
            if attrs.len() == 1 && attrs.contains_key(attr::FRIEND_LAST_CONTACT) {
                return Err(Error::Host {
                    code: -1,
                    msg: "simulated outage".to_string(),
                });
            }
            self.0.set_block_attrs(block_id, attrs).await
        }

        async fn query(&self, query: &Query) -> Result<Vec<Block>> {
            self.0.query(query).await
        }
    }

    #[tokio::test]
    async fn test_failed_bump_keeps_interaction() {
        let (host, _, _) = setup().await;
        let logger = InteractionLogger::new(
            Arc::new(FailingBump(host.clone())),
            Layout::default(),
            Lang::En,
        );

        let logged = logger.log(meal("friend-alice", "2024-01-01")).await.unwrap();
        assert!(!logged.last_contact_updated);
        assert_eq!(last_contact(&host).await, None);

        let history = logger
            .for_friend("friend-alice", &InteractionQuery::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, logged.interaction.id);
    }

    #[tokio::test]
    async fn test_for_friend_filters_and_pages() {
        let (_, logger, _) = setup().await;
        for day in ["2024-01-01", "2024-01-03", "2024-01-02"] {
            logger.log(meal("friend-alice", day)).await.unwrap();
        }
        let mut call = meal("friend-alice", "2024-01-04");
        call.kind = InteractionKind::Call;
        logger.log(call).await.unwrap();
        logger.log(meal("friend-bob", "2024-01-05")).await.unwrap();

        let all = logger
            .for_friend("friend-alice", &InteractionQuery::default())
            .await
            .unwrap();
        let days: Vec<String> = all.iter().map(|i| i.date.to_string()).collect();
        assert_eq!(days, vec!["2024-01-04", "2024-01-03", "2024-01-02", "2024-01-01"]);

        let meals = logger
            .for_friend(
                "friend-alice",
                &InteractionQuery {
                    limit: 1,
                    offset: 1,
                    kind: Some(InteractionKind::Meal),
                },
            )
            .await
            .unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].date, date("2024-01-02"));
    }

    #[tokio::test]
    async fn test_stats_by_type() {
        let (_, logger, _) = setup().await;
        for (kind, day, mood) in [
            (InteractionKind::Meal, "2024-03-20", 5),
            (InteractionKind::Meal, "2024-03-25", 2),
            (InteractionKind::Call, "2024-03-28", 4),
            (InteractionKind::Call, "2023-01-01", 1),
        ] {
            logger
                .log(NewInteraction {
                    friend_id: Some("friend-alice".to_string()),
                    mood: Some(mood),
                    ..NewInteraction::new(kind, date(day))
                })
                .await
                .unwrap();
        }

        let stats = logger
            .stats("friend-alice", Period::Month, date("2024-03-31"))
            .await
            .unwrap();

        assert_eq!(
            stats,
            vec![
                TypeStat {
                    kind: InteractionKind::Call,
                    count: 1,
                    avg_mood: 4.0
                },
                TypeStat {
                    kind: InteractionKind::Meal,
                    count: 2,
                    avg_mood: 3.5
                },
            ]
        );
    }
}
