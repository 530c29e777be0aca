//! Mapping between records and host documents.
//!
//! Each record becomes a markdown body plus a flat set of `custom-*`
//! attributes. Every field is always written (empty string when unset) and
//! parsing falls back to defaults instead of failing, so partially filled or
//! hand-edited documents still load. Only a missing identity is an error.

use crate::config::Layout;
use crate::display::{format_date, intimacy_stars, mood_faces};
use crate::error::MapError;
use crate::host::{Attrs, Block, Direction, Query};
use crate::labels::{Lang, Text};
use crate::types::{
    clamp_intimacy, clamp_mood, non_empty, normalize_tags, Contact, Friend, Interaction,
    InteractionKind, Reminder, ReminderStatus, DEFAULT_INTIMACY, DEFAULT_MOOD,
    DEFAULT_RELATIONSHIP, INTIMACY_MAX, INTIMACY_MIN, MOOD_MAX, MOOD_MIN,
};
use chrono::NaiveDate;

/// Attribute names. SiYuan only persists user attributes prefixed with `custom-`.
pub mod attr {
    pub const FRIEND_ID: &str = "custom-friend-id";
    pub const FRIEND_NAME: &str = "custom-friend-name";
    pub const FRIEND_NICKNAME: &str = "custom-friend-nickname";
    pub const FRIEND_BIRTHDAY: &str = "custom-friend-birthday";
    pub const FRIEND_MET_DATE: &str = "custom-friend-met-date";
    pub const FRIEND_MET_LOCATION: &str = "custom-friend-met-location";
    pub const FRIEND_RELATIONSHIP: &str = "custom-friend-relationship";
    pub const FRIEND_TAGS: &str = "custom-friend-tags";
    pub const FRIEND_INTIMACY: &str = "custom-friend-intimacy";
    pub const FRIEND_PHONE: &str = "custom-friend-contact-phone";
    pub const FRIEND_WECHAT: &str = "custom-friend-contact-wechat";
    pub const FRIEND_EMAIL: &str = "custom-friend-contact-email";
    pub const FRIEND_SOCIAL: &str = "custom-friend-contact-social";
    pub const FRIEND_NOTES: &str = "custom-friend-notes";
    pub const FRIEND_LAST_CONTACT: &str = "custom-friend-last-contact";

    pub const INTERACTION_ID: &str = "custom-interaction-id";
    pub const INTERACTION_TYPE: &str = "custom-interaction-type";
    pub const INTERACTION_DATE: &str = "custom-interaction-date";
    pub const INTERACTION_MOOD: &str = "custom-interaction-mood";
    pub const INTERACTION_LOCATION: &str = "custom-interaction-location";
    pub const INTERACTION_COST: &str = "custom-interaction-cost";
    pub const INTERACTION_TAGS: &str = "custom-interaction-tags";
    pub const INTERACTION_TITLE: &str = "custom-interaction-title";
    pub const INTERACTION_CONTENT: &str = "custom-interaction-content";

    pub const REMINDER_ID: &str = "custom-reminder-id";
    pub const REMINDER_TYPE: &str = "custom-reminder-type";
    pub const REMINDER_FRIEND_NAME: &str = "custom-reminder-friend-name";
    pub const REMINDER_DATE: &str = "custom-reminder-date";
    pub const REMINDER_MESSAGE: &str = "custom-reminder-message";
    pub const REMINDER_STATUS: &str = "custom-reminder-status";
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record rendered for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub hpath: String,
    pub markdown: String,
    pub attrs: Attrs,
}

/// What a mapper needs beyond the record itself
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    pub layout: &'a Layout,
    pub lang: Lang,
}

pub trait Record: Sized + Clone {
    /// Human-readable kind, used in logs and not-found errors
    const KIND: &'static str;

    /// Cache key
    fn key(&self) -> &str;

    /// Document path prefix this kind lives under
    fn prefix(layout: &Layout) -> &str;

    fn to_document(&self, ctx: &MapContext<'_>) -> Document;

    fn from_block(block: &Block) -> Result<Self, MapError>;
}

// -----------------------------------------------------------------------------
// Field encoding
// -----------------------------------------------------------------------------

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn date_value(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn tags_value(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Dates may arrive as full timestamps, only the day matters
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => normalize_tags(tags.iter().map(String::as_str)),
        Err(_) => Vec::new(),
    }
}

/// Integer score clamped to `min..=max`, `default` when absent or non-numeric
pub fn parse_score(raw: &str, default: u8, min: u8, max: u8) -> u8 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc().clamp(min as f64, max as f64) as u8,
        _ => default,
    }
}

fn parse_cost(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn get<'a>(attrs: &'a Attrs, name: &str) -> &'a str {
    attrs.get(name).map(String::as_str).unwrap_or("")
}

fn opt(attrs: &Attrs, name: &str) -> Option<String> {
    non_empty(get(attrs, name))
}

fn required(attrs: &Attrs, block: &Block, name: &'static str) -> Result<String, MapError> {
    opt(attrs, name).ok_or_else(|| MapError::MissingAttr {
        block: block.id.clone(),
        attr: name,
    })
}

fn required_date(attrs: &Attrs, block: &Block, name: &'static str) -> Result<NaiveDate, MapError> {
    let raw = get(attrs, name);
    if raw.trim().is_empty() {
        return Err(MapError::MissingAttr {
            block: block.id.clone(),
            attr: name,
        });
    }
    parse_date(raw).ok_or_else(|| MapError::InvalidAttr {
        block: block.id.clone(),
        attr: name,
        value: raw.to_string(),
    })
}

/// Parse a batch of query rows, logging and skipping the ones that do not map
pub fn parse_blocks<T: Record>(blocks: &[Block]) -> Vec<T> {
    blocks
        .iter()
        .filter_map(|block| match T::from_block(block) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping unreadable {} document: {}", T::KIND, e);
                None
            }
        })
        .collect()
}

/// Path segment for a title; `/` would nest documents
fn path_segment(title: &str) -> String {
    title.trim().replace('/', "-")
}

// -----------------------------------------------------------------------------
// Friend
// -----------------------------------------------------------------------------

/// Live query listing a friend's documents under `prefix`
pub fn related_query(prefix: &str, friend_id: &str) -> Query {
    Query::documents()
        .path_prefix(prefix)
        .attr_eq(attr::FRIEND_ID, friend_id)
        .order_by_created(Direction::Desc)
}

impl Record for Friend {
    const KIND: &'static str = "friend";

    fn key(&self) -> &str {
        &self.id
    }

    fn prefix(layout: &Layout) -> &str {
        &layout.friends
    }

    fn to_document(&self, ctx: &MapContext<'_>) -> Document {
        let lang = ctx.lang;
        let t = |key| lang.text(key);
        let shown_date = |d: Option<NaiveDate>| d.map(|d| format_date(d, lang)).unwrap_or_default();

        let mut md = String::new();
        md.push_str(&format!("## {}\n\n", t(Text::BasicInfo)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Name), self.name));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Nickname), text(&self.nickname)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::MetDate), shown_date(self.met_date)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::MetLocation), text(&self.met_location)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Relationship), self.relationship));
        md.push_str(&format!("- **{}**: {}\n\n", t(Text::Intimacy), intimacy_stars(self.intimacy)));

        md.push_str(&format!("## {}\n\n", t(Text::ContactInfo)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Phone), text(&self.contact.phone)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::WeChat), text(&self.contact.wechat)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Email), text(&self.contact.email)));
        md.push_str(&format!("- **{}**: {}\n\n", t(Text::SocialMedia), text(&self.contact.social_media)));

        md.push_str(&format!("## {}\n\n", t(Text::Notes)));
        if let Some(notes) = &self.notes {
            md.push_str(notes);
            md.push_str("\n\n");
        }

        md.push_str(&format!("## {}\n\n", t(Text::Interactions)));
        md.push_str(&related_query(&ctx.layout.interactions, &self.id).to_embed());
        md.push_str("\n\n");

        md.push_str(&format!("## {}\n\n", t(Text::Financial)));
        md.push_str(&related_query(&ctx.layout.financial, &self.id).to_embed());
        md.push('\n');

        let mut attrs = Attrs::new();
        let mut set = |name: &str, value: String| {
            attrs.insert(name.to_string(), value);
        };
        set(attr::FRIEND_ID, self.id.clone());
        set(attr::FRIEND_NAME, self.name.clone());
        set(attr::FRIEND_NICKNAME, text(&self.nickname));
        set(attr::FRIEND_BIRTHDAY, date_value(self.birthday));
        set(attr::FRIEND_MET_DATE, date_value(self.met_date));
        set(attr::FRIEND_MET_LOCATION, text(&self.met_location));
        set(attr::FRIEND_RELATIONSHIP, self.relationship.clone());
        set(attr::FRIEND_TAGS, tags_value(&self.tags));
        set(attr::FRIEND_INTIMACY, self.intimacy.to_string());
        set(attr::FRIEND_PHONE, text(&self.contact.phone));
        set(attr::FRIEND_WECHAT, text(&self.contact.wechat));
        set(attr::FRIEND_EMAIL, text(&self.contact.email));
        set(attr::FRIEND_SOCIAL, text(&self.contact.social_media));
        set(attr::FRIEND_NOTES, text(&self.notes));
        set(attr::FRIEND_LAST_CONTACT, date_value(self.last_contact));

        Document {
            hpath: format!("{}{}", ctx.layout.friends, path_segment(&self.name)),
            markdown: md,
            attrs,
        }
    }

    fn from_block(block: &Block) -> Result<Self, MapError> {
        let attrs = block.attrs();

        let id = required(&attrs, block, attr::FRIEND_ID)?;
        let name = opt(&attrs, attr::FRIEND_NAME)
            .or_else(|| non_empty(&block.content))
            .ok_or_else(|| MapError::MissingAttr {
                block: block.id.clone(),
                attr: attr::FRIEND_NAME,
            })?;

        Ok(Friend {
            id,
            block_id: block.id.clone(),
            name,
            nickname: opt(&attrs, attr::FRIEND_NICKNAME),
            birthday: parse_date(get(&attrs, attr::FRIEND_BIRTHDAY)),
            met_date: parse_date(get(&attrs, attr::FRIEND_MET_DATE)),
            met_location: opt(&attrs, attr::FRIEND_MET_LOCATION),
            relationship: opt(&attrs, attr::FRIEND_RELATIONSHIP)
                .unwrap_or_else(|| DEFAULT_RELATIONSHIP.to_string()),
            tags: parse_tags(get(&attrs, attr::FRIEND_TAGS)),
            intimacy: clamp_intimacy(parse_score(
                get(&attrs, attr::FRIEND_INTIMACY),
                DEFAULT_INTIMACY,
                INTIMACY_MIN,
                INTIMACY_MAX,
            )),
            contact: Contact {
                phone: opt(&attrs, attr::FRIEND_PHONE),
                wechat: opt(&attrs, attr::FRIEND_WECHAT),
                email: opt(&attrs, attr::FRIEND_EMAIL),
                social_media: opt(&attrs, attr::FRIEND_SOCIAL),
            },
            notes: opt(&attrs, attr::FRIEND_NOTES),
            last_contact: parse_date(get(&attrs, attr::FRIEND_LAST_CONTACT)),
            created: block.created_at(),
            updated: block.updated_at(),
        })
    }
}

// -----------------------------------------------------------------------------
// Interaction
// -----------------------------------------------------------------------------

impl Record for Interaction {
    const KIND: &'static str = "interaction";

    fn key(&self) -> &str {
        &self.id
    }

    fn prefix(layout: &Layout) -> &str {
        &layout.interactions
    }

    fn to_document(&self, ctx: &MapContext<'_>) -> Document {
        let lang = ctx.lang;
        let t = |key| lang.text(key);
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| t(Text::DefaultInteractionTitle).to_string());

        let mut md = String::new();
        md.push_str(&format!("# {}\n\n", title));
        md.push_str(&format!("## {}\n\n", t(Text::InteractionDetails)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Date), format_date(self.date, lang)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Type), lang.kind(self.kind)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Mood), mood_faces(self.mood)));
        md.push_str(&format!("- **{}**: {}\n", t(Text::Location), text(&self.location)));
        if let Some(content) = &self.content {
            md.push('\n');
            md.push_str(content);
            md.push('\n');
        }

        let mut attrs = Attrs::new();
        let mut set = |name: &str, value: String| {
            attrs.insert(name.to_string(), value);
        };
        set(attr::INTERACTION_ID, self.id.clone());
        set(attr::INTERACTION_TYPE, self.kind.as_str().to_string());
        set(attr::INTERACTION_DATE, date_value(Some(self.date)));
        set(attr::INTERACTION_MOOD, self.mood.to_string());
        set(attr::INTERACTION_LOCATION, text(&self.location));
        set(attr::INTERACTION_COST, self.cost.to_string());
        set(attr::INTERACTION_TAGS, tags_value(&self.tags));
        set(attr::INTERACTION_TITLE, text(&self.title));
        set(attr::INTERACTION_CONTENT, text(&self.content));
        set(attr::FRIEND_ID, text(&self.friend_id));

        Document {
            hpath: format!("{}{}", ctx.layout.interactions, self.id),
            markdown: md,
            attrs,
        }
    }

    fn from_block(block: &Block) -> Result<Self, MapError> {
        let attrs = block.attrs();

        let id = required(&attrs, block, attr::INTERACTION_ID)?;
        let date = required_date(&attrs, block, attr::INTERACTION_DATE)?;
        let kind = get(&attrs, attr::INTERACTION_TYPE)
            .parse()
            .unwrap_or(InteractionKind::Other);

        Ok(Interaction {
            id,
            block_id: block.id.clone(),
            friend_id: opt(&attrs, attr::FRIEND_ID),
            kind,
            date,
            mood: clamp_mood(parse_score(
                get(&attrs, attr::INTERACTION_MOOD),
                DEFAULT_MOOD,
                MOOD_MIN,
                MOOD_MAX,
            )),
            location: opt(&attrs, attr::INTERACTION_LOCATION),
            cost: parse_cost(get(&attrs, attr::INTERACTION_COST)),
            tags: parse_tags(get(&attrs, attr::INTERACTION_TAGS)),
            title: opt(&attrs, attr::INTERACTION_TITLE),
            content: opt(&attrs, attr::INTERACTION_CONTENT),
        })
    }
}

// -----------------------------------------------------------------------------
// Reminder
// -----------------------------------------------------------------------------

impl Record for Reminder {
    const KIND: &'static str = "reminder";

    fn key(&self) -> &str {
        &self.id
    }

    fn prefix(layout: &Layout) -> &str {
        &layout.reminders
    }

    fn to_document(&self, ctx: &MapContext<'_>) -> Document {
        let lang = ctx.lang;
        let t = |key| lang.text(key);
        let checkbox = match self.status {
            ReminderStatus::Pending => "[ ]",
            ReminderStatus::Done => "[x]",
        };

        let md = format!(
            "# {} {}\n\n- {}: {}\n- {}: {}\n- {}: {}\n\n- {} {}\n",
            t(Text::ReminderTitle),
            self.friend_name,
            t(Text::Date),
            date_value(Some(self.due)),
            t(Text::Friend),
            self.friend_name,
            t(Text::Content),
            self.message,
            checkbox,
            t(Text::Done),
        );

        let mut attrs = Attrs::new();
        let mut set = |name: &str, value: String| {
            attrs.insert(name.to_string(), value);
        };
        set(attr::REMINDER_ID, self.id.clone());
        set(attr::REMINDER_TYPE, "friend".to_string());
        set(attr::FRIEND_ID, self.friend_id.clone());
        set(attr::REMINDER_FRIEND_NAME, self.friend_name.clone());
        set(attr::REMINDER_DATE, date_value(Some(self.due)));
        set(attr::REMINDER_MESSAGE, self.message.clone());
        set(attr::REMINDER_STATUS, self.status.as_str().to_string());

        Document {
            hpath: format!("{}{}", ctx.layout.reminders, self.id),
            markdown: md,
            attrs,
        }
    }

    fn from_block(block: &Block) -> Result<Self, MapError> {
        let attrs = block.attrs();

        let id = required(&attrs, block, attr::REMINDER_ID)?;
        let due = required_date(&attrs, block, attr::REMINDER_DATE)?;

        Ok(Reminder {
            id,
            block_id: block.id.clone(),
            friend_id: get(&attrs, attr::FRIEND_ID).to_string(),
            friend_name: get(&attrs, attr::REMINDER_FRIEND_NAME).to_string(),
            due,
            message: get(&attrs, attr::REMINDER_MESSAGE).to_string(),
            status: get(&attrs, attr::REMINDER_STATUS)
                .parse()
                .unwrap_or(ReminderStatus::Pending),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::render_ial;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    /// What a host hands back after storing `doc`: empty attributes are dropped
    fn stored(block_id: &str, doc: &Document) -> Block {
        let kept: Attrs = doc
            .attrs
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Block {
            id: block_id.to_string(),
            kind: "d".to_string(),
            hpath: doc.hpath.clone(),
            content: doc.hpath.rsplit('/').next().unwrap_or_default().to_string(),
            ial: render_ial(&kept),
            created: "20240101093000".to_string(),
            updated: "20240102093000".to_string(),
        }
    }

    fn bare_friend() -> Friend {
        let block = Block {
            created: "20240101093000".to_string(),
            updated: "20240102093000".to_string(),
            ..Default::default()
        };
        Friend {
            id: "friend-alice".to_string(),
            block_id: "20240101093000-abcdefg".to_string(),
            name: "Alice".to_string(),
            nickname: None,
            birthday: None,
            met_date: None,
            met_location: None,
            relationship: "colleague".to_string(),
            tags: Vec::new(),
            intimacy: DEFAULT_INTIMACY,
            contact: Contact::default(),
            notes: None,
            last_contact: None,
            created: block.created_at(),
            updated: block.updated_at(),
        }
    }

    #[test]
    fn test_friend_round_trip_all_optional_combinations() {
        let layout = Layout::default();
        let ctx = MapContext { layout: &layout, lang: Lang::ZhCn };

        for mask in 0u32..(1 << 10) {
            let on = |bit: u32| mask & (1 << bit) != 0;
            let mut friend = bare_friend();
            if on(0) { friend.nickname = Some("Ally".to_string()); }
            if on(1) { friend.birthday = Some(date("1990-05-17")); }
            if on(2) { friend.met_date = Some(date("2015-09-01")); }
            if on(3) { friend.met_location = Some("Campus \"B\" café".to_string()); }
            if on(4) { friend.tags = vec!["college".to_string(), "hiking".to_string()]; }
            if on(5) { friend.intimacy = 9; }
            if on(6) {
                friend.contact = Contact {
                    phone: Some("+86 138 0000 0000".to_string()),
                    wechat: Some("alice_w".to_string()),
                    email: None,
                    social_media: None,
                };
            }
            if on(7) {
                friend.contact.email = Some("alice@example.com".to_string());
                friend.contact.social_media = Some("@alice".to_string());
            }
            if on(8) { friend.notes = Some("Likes tea.\nAllergic to <nuts> & 'shellfish'".to_string()); }
            if on(9) { friend.last_contact = Some(date("2024-01-01")); }

            let doc = friend.to_document(&ctx);
            let parsed = Friend::from_block(&stored(&friend.block_id, &doc)).unwrap();
            assert_eq!(parsed, friend, "mask {:#b}", mask);
        }
    }

    #[test]
    fn test_friend_attributes_are_total() {
        let layout = Layout::default();
        let ctx = MapContext { layout: &layout, lang: Lang::En };
        let doc = bare_friend().to_document(&ctx);

        assert_eq!(doc.attrs.len(), 15);
        assert_eq!(doc.attrs[attr::FRIEND_NICKNAME], "");
        assert_eq!(doc.attrs[attr::FRIEND_TAGS], "[]");
        assert_eq!(doc.attrs[attr::FRIEND_INTIMACY], "5");
        assert_eq!(doc.attrs[attr::FRIEND_LAST_CONTACT], "");
        assert_eq!(doc.hpath, "/Friends/Alice");
    }

    #[test]
    fn test_friend_document_embeds_live_queries() {
        let layout = Layout::default();
        let ctx = MapContext { layout: &layout, lang: Lang::En };
        let doc = bare_friend().to_document(&ctx);

        assert!(doc.markdown.contains("## Interactions\n\n{{SELECT * FROM blocks WHERE type = 'd' AND hpath LIKE '/Interactions/%'"));
        assert!(doc.markdown.contains("name = 'custom-friend-id' AND value = 'friend-alice'"));
        assert!(doc.markdown.contains("hpath LIKE '/Financial/%'"));
        assert!(doc.markdown.contains("⭐⭐⭐⭐⭐☆☆☆☆☆"));
        assert_eq!(doc.markdown, bare_friend().to_document(&ctx).markdown);
    }

    #[test]
    fn test_friend_parse_is_tolerant() {
        let mut attrs = Attrs::new();
        attrs.insert(attr::FRIEND_ID.to_string(), "friend-bob".to_string());
        attrs.insert(attr::FRIEND_TAGS.to_string(), "not json".to_string());
        attrs.insert(attr::FRIEND_INTIMACY.to_string(), "lots".to_string());
        attrs.insert(attr::FRIEND_BIRTHDAY.to_string(), "sometime".to_string());
        let block = Block {
            id: "b2".to_string(),
            content: "Bob".to_string(),
            ial: render_ial(&attrs),
            ..Default::default()
        };

        let friend = Friend::from_block(&block).unwrap();
        assert_eq!(friend.name, "Bob");
        assert!(friend.tags.is_empty());
        assert_eq!(friend.intimacy, DEFAULT_INTIMACY);
        assert_eq!(friend.birthday, None);
        assert_eq!(friend.relationship, DEFAULT_RELATIONSHIP);
    }

    #[test]
    fn test_friend_without_identity_is_rejected() {
        let block = Block {
            id: "b3".to_string(),
            content: "Stray".to_string(),
            ..Default::default()
        };
        assert_eq!(
            Friend::from_block(&block),
            Err(MapError::MissingAttr {
                block: "b3".to_string(),
                attr: attr::FRIEND_ID
            })
        );
    }

    #[test]
    fn test_scores_clamp_and_default() {
        assert_eq!(parse_score("", 5, 1, 10), 5);
        assert_eq!(parse_score("7", 5, 1, 10), 7);
        assert_eq!(parse_score("7.9", 5, 1, 10), 7);
        assert_eq!(parse_score("99", 5, 1, 10), 10);
        assert_eq!(parse_score("-3", 3, 1, 5), 1);
        assert_eq!(parse_score("NaN", 3, 1, 5), 3);
    }

    #[test]
    fn test_interaction_round_trip() {
        let layout = Layout::default();
        let ctx = MapContext { layout: &layout, lang: Lang::ZhCn };
        let interaction = Interaction {
            id: "interaction-1704067200000-abcdefghi".to_string(),
            block_id: "20240101093000-hijklmn".to_string(),
            friend_id: Some("friend-alice".to_string()),
            kind: InteractionKind::Meal,
            date: date("2024-01-01"),
            mood: 4,
            location: Some("Hotpot place".to_string()),
            cost: 128.5,
            tags: vec!["dinner".to_string()],
            title: None,
            content: Some("Talked about the trip.".to_string()),
        };

        let doc = interaction.to_document(&ctx);
        assert_eq!(doc.hpath, "/Interactions/interaction-1704067200000-abcdefghi");
        assert!(doc.markdown.starts_with("# 互动记录\n"));
        assert!(doc.markdown.contains("聚餐"));

        let parsed = Interaction::from_block(&stored(&interaction.block_id, &doc)).unwrap();
        assert_eq!(parsed, interaction);
    }

    #[test]
    fn test_interaction_bad_date_is_error() {
        let mut attrs = Attrs::new();
        attrs.insert(attr::INTERACTION_ID.to_string(), "interaction-1".to_string());
        attrs.insert(attr::INTERACTION_DATE.to_string(), "yesterday".to_string());
        attrs.insert(attr::INTERACTION_TYPE.to_string(), "karaoke".to_string());
        let block = Block {
            id: "b4".to_string(),
            ial: render_ial(&attrs),
            ..Default::default()
        };

        assert!(matches!(
            Interaction::from_block(&block),
            Err(MapError::InvalidAttr { attr: attr::INTERACTION_DATE, .. })
        ));
    }

    #[test]
    fn test_reminder_round_trip() {
        let layout = Layout::default();
        let ctx = MapContext { layout: &layout, lang: Lang::En };
        let reminder = Reminder {
            id: "reminder-1704067200000-abcdefghi".to_string(),
            block_id: "20240101093000-opqrstu".to_string(),
            friend_id: "friend-alice".to_string(),
            friend_name: "Alice".to_string(),
            due: date("2024-02-01"),
            message: "Ask about the new job".to_string(),
            status: ReminderStatus::Pending,
        };

        let doc = reminder.to_document(&ctx);
        assert!(doc.markdown.starts_with("# Reminder: contact Alice\n"));
        assert!(doc.markdown.contains("- [ ] Done"));
        assert_eq!(doc.attrs[attr::REMINDER_TYPE], "friend");

        let parsed = Reminder::from_block(&stored(&reminder.block_id, &doc)).unwrap();
        assert_eq!(parsed, reminder);
    }

    #[test]
    fn test_parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2024-01-01T10:00:00Z"), Some(date("2024-01-01")));
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date(""), None);
    }
}
