use crate::cache::{EntityCache, LoadReport, Searchable};
use crate::config::Layout;
use crate::error::{Error, Result};
use crate::host::{Host, Query};
use crate::ids::generate_friend_id;
use crate::labels::Lang;
use crate::mapper::{MapContext, Record};
use crate::types::{
    clamp_intimacy, non_empty, normalize_tags, Contact, Friend, FriendUpdate, NewFriend,
    SearchFilters, DEFAULT_INTIMACY, DEFAULT_RELATIONSHIP,
};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::{Arc, OnceLock};

impl Searchable for Friend {
    fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .nickname
                .as_ref()
                .is_some_and(|n| n.to_lowercase().contains(needle))
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }

    fn matches_filters(&self, filters: &SearchFilters) -> bool {
        if let Some(relationship) = &filters.relationship {
            if &self.relationship != relationship {
                return false;
            }
        }
        filters.tags.iter().all(|tag| self.tags.contains(tag))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(email)
}

fn validate_email(email: &Option<String>) -> Result<()> {
    match email {
        Some(e) if !is_valid_email(e) => Err(Error::InvalidInput(format!("invalid email: {}", e))),
        _ => Ok(()),
    }
}

fn now() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Friend profiles: documents under the friends path, served from a cache
pub struct FriendManager {
    host: Arc<dyn Host>,
    layout: Layout,
    lang: Lang,
    cache: EntityCache<Friend>,
}

impl FriendManager {
    pub fn new(host: Arc<dyn Host>, layout: Layout, lang: Lang) -> Self {
        Self {
            host,
            layout,
            lang,
            cache: EntityCache::new(),
        }
    }

    fn ctx(&self) -> MapContext<'_> {
        MapContext {
            layout: &self.layout,
            lang: self.lang,
        }
    }

    /// Full scan of the friends path into the cache
    pub async fn load(&mut self) -> Result<LoadReport> {
        let query = Query::documents().path_prefix(Friend::prefix(&self.layout));
        let report = self.cache.load(self.host.as_ref(), &query).await?;
        log::info!(
            "Loaded {} friends into cache ({} skipped)",
            report.loaded,
            report.skipped
        );
        Ok(report)
    }

    /// Create the friend's document and attributes, then cache it
    pub async fn create(&mut self, input: NewFriend) -> Result<Friend> {
        let name = non_empty(&input.name)
            .ok_or_else(|| Error::InvalidInput("friend name is required".to_string()))?;
        let contact = Contact {
            phone: input.contact.phone.as_deref().and_then(non_empty),
            wechat: input.contact.wechat.as_deref().and_then(non_empty),
            email: input.contact.email.as_deref().and_then(non_empty),
            social_media: input.contact.social_media.as_deref().and_then(non_empty),
        };
        validate_email(&contact.email)?;

        log::info!("Creating friend: {}", name);

        let id = generate_friend_id(&name, |candidate| self.cache.contains(candidate));
        let mut friend = Friend {
            id,
            block_id: String::new(),
            name,
            nickname: input.nickname.as_deref().and_then(non_empty),
            birthday: input.birthday,
            met_date: input.met_date,
            met_location: input.met_location.as_deref().and_then(non_empty),
            relationship: input
                .relationship
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_RELATIONSHIP.to_string()),
            tags: normalize_tags(input.tags.iter().map(String::as_str)),
            intimacy: clamp_intimacy(input.intimacy.unwrap_or(DEFAULT_INTIMACY)),
            contact,
            notes: input.notes.as_deref().and_then(non_empty),
            last_contact: None,
            created: None,
            updated: None,
        };

        let doc = friend.to_document(&self.ctx());
        let block_id = self.host.create_document(&doc.hpath, &doc.markdown).await?;
        log::debug!("Document created for {} with block id {}", friend.name, block_id);
        self.host.set_block_attrs(&block_id, &doc.attrs).await?;

        let stamp = now();
        friend.block_id = block_id;
        friend.created = Some(stamp);
        friend.updated = Some(stamp);

        self.cache.upsert(friend.clone());
        log::info!("Friend {} created as {}", friend.name, friend.id);
        Ok(friend)
    }

    /// Apply `update` to a cached friend and rewrite its attributes
    pub async fn update(&mut self, id: &str, update: &FriendUpdate) -> Result<Friend> {
        if update.is_empty() {
            return Err(Error::InvalidInput("nothing to update".to_string()));
        }

        let mut friend = self.cache.get(id).cloned().ok_or_else(|| {
            log::warn!("Update requested for unknown friend {}", id);
            Error::not_found(Friend::KIND, id)
        })?;

        update.apply(&mut friend);
        validate_email(&friend.contact.email)?;

        let doc = friend.to_document(&self.ctx());
        self.host.set_block_attrs(&friend.block_id, &doc.attrs).await?;

        friend.updated = Some(now());
        self.cache.upsert(friend.clone());
        log::info!("Friend {} updated", friend.id);
        Ok(friend)
    }

    pub fn get(&self, id: &str) -> Option<&Friend> {
        self.cache.get(id)
    }

    /// Cached friends matching `query` and `filters`, sorted by name
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<&Friend> {
        let mut results = self.cache.search(query, filters);
        results.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        log::debug!("Search {:?} returned {} friends", query, results.len());
        results
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Mirror a last-contact bump that was already written to the host
    pub fn note_contact(&mut self, id: &str, date: NaiveDate) {
        if let Some(friend) = self.cache.get(id) {
            if friend.last_contact.map_or(true, |d| d <= date) {
                let mut friend = friend.clone();
                friend.last_contact = Some(date);
                self.cache.upsert(friend);
            }
        }
    }
}
