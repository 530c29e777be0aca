use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const INTIMACY_MIN: u8 = 1;
pub const INTIMACY_MAX: u8 = 10;
pub const DEFAULT_INTIMACY: u8 = 5;

pub const MOOD_MIN: u8 = 1;
pub const MOOD_MAX: u8 = 5;
pub const DEFAULT_MOOD: u8 = 3;

pub const DEFAULT_RELATIONSHIP: &str = "friend";

/// Ways to reach a friend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub wechat: Option<String>,
    pub email: Option<String>,
    pub social_media: Option<String>,
}

/// A friend profile, mirrored from a document under the friends path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: String,
    pub block_id: String,
    pub name: String,
    pub nickname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub met_date: Option<NaiveDate>,
    pub met_location: Option<String>,
    pub relationship: String,
    pub tags: Vec<String>,
    pub intimacy: u8,
    pub contact: Contact,
    pub notes: Option<String>,
    pub last_contact: Option<NaiveDate>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
}

/// Input for creating a friend
#[derive(Debug, Clone, Default)]
pub struct NewFriend {
    pub name: String,
    pub nickname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub met_date: Option<NaiveDate>,
    pub met_location: Option<String>,
    pub relationship: Option<String>,
    pub tags: Vec<String>,
    pub intimacy: Option<u8>,
    pub contact: Contact,
    pub notes: Option<String>,
}

/// Partial update of a friend. `Some("")` clears an optional text field.
#[derive(Debug, Clone, Default)]
pub struct FriendUpdate {
    pub nickname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub met_location: Option<String>,
    pub relationship: Option<String>,
    pub tags: Option<Vec<String>>,
    pub intimacy: Option<u8>,
    pub phone: Option<String>,
    pub wechat: Option<String>,
    pub email: Option<String>,
    pub social_media: Option<String>,
    pub notes: Option<String>,
    pub last_contact: Option<NaiveDate>,
}

impl FriendUpdate {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none()
            && self.birthday.is_none()
            && self.met_location.is_none()
            && self.relationship.is_none()
            && self.tags.is_none()
            && self.intimacy.is_none()
            && self.phone.is_none()
            && self.wechat.is_none()
            && self.email.is_none()
            && self.social_media.is_none()
            && self.notes.is_none()
            && self.last_contact.is_none()
    }

    pub fn apply(&self, friend: &mut Friend) {
        if let Some(v) = &self.nickname {
            friend.nickname = non_empty(v);
        }
        if let Some(v) = self.birthday {
            friend.birthday = Some(v);
        }
        if let Some(v) = &self.met_location {
            friend.met_location = non_empty(v);
        }
        if let Some(v) = &self.relationship {
            if !v.trim().is_empty() {
                friend.relationship = v.trim().to_string();
            }
        }
        if let Some(v) = &self.tags {
            friend.tags = normalize_tags(v.iter().map(String::as_str));
        }
        if let Some(v) = self.intimacy {
            friend.intimacy = clamp_intimacy(v);
        }
        if let Some(v) = &self.phone {
            friend.contact.phone = non_empty(v);
        }
        if let Some(v) = &self.wechat {
            friend.contact.wechat = non_empty(v);
        }
        if let Some(v) = &self.email {
            friend.contact.email = non_empty(v);
        }
        if let Some(v) = &self.social_media {
            friend.contact.social_media = non_empty(v);
        }
        if let Some(v) = &self.notes {
            friend.notes = non_empty(v);
        }
        if let Some(v) = self.last_contact {
            friend.last_contact = Some(v);
        }
    }
}

/// In-memory search filters over cached friends
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub relationship: Option<String>,
    pub tags: Vec<String>,
}

/// Category of an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Meeting,
    Chat,
    Activity,
    Gift,
    Call,
    Meal,
    Travel,
    Other,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 8] = [
        InteractionKind::Meeting,
        InteractionKind::Chat,
        InteractionKind::Activity,
        InteractionKind::Gift,
        InteractionKind::Call,
        InteractionKind::Meal,
        InteractionKind::Travel,
        InteractionKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Meeting => "meeting",
            InteractionKind::Chat => "chat",
            InteractionKind::Activity => "activity",
            InteractionKind::Gift => "gift",
            InteractionKind::Call => "call",
            InteractionKind::Meal => "meal",
            InteractionKind::Travel => "travel",
            InteractionKind::Other => "other",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        InteractionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown interaction type: {}", s))
    }
}

/// A logged interaction with a friend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub block_id: String,
    pub friend_id: Option<String>,
    pub kind: InteractionKind,
    pub date: NaiveDate,
    pub mood: u8,
    pub location: Option<String>,
    pub cost: f64,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Input for logging an interaction
#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub friend_id: Option<String>,
    pub kind: InteractionKind,
    pub date: NaiveDate,
    pub mood: Option<u8>,
    pub location: Option<String>,
    pub cost: Option<f64>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NewInteraction {
    pub fn new(kind: InteractionKind, date: NaiveDate) -> Self {
        Self {
            friend_id: None,
            kind,
            date,
            mood: None,
            location: None,
            cost: None,
            tags: Vec::new(),
            title: None,
            content: None,
        }
    }
}

/// Paging and filtering for a friend's interaction history
#[derive(Debug, Clone)]
pub struct InteractionQuery {
    pub limit: usize,
    pub offset: usize,
    pub kind: Option<InteractionKind>,
}

impl Default for InteractionQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            kind: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Done,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Done => "done",
        }
    }
}

impl FromStr for ReminderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(ReminderStatus::Pending),
            "done" => Ok(ReminderStatus::Done),
            other => Err(format!("unknown reminder status: {}", other)),
        }
    }
}

/// A one-shot reminder to get in touch with a friend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub block_id: String,
    pub friend_id: String,
    pub friend_name: String,
    pub due: NaiveDate,
    pub message: String,
    pub status: ReminderStatus,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub friend_id: String,
    pub friend_name: String,
    pub due: NaiveDate,
    pub message: String,
}

/// Statistics window, counted back from a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            Period::Week => today.checked_sub_signed(chrono::Duration::days(7)),
            Period::Month => today.checked_sub_months(Months::new(1)),
            Period::Year => today.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

/// Interaction count and average mood for one interaction type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeStat {
    pub kind: InteractionKind,
    pub count: usize,
    pub avg_mood: f64,
}

/// Interactions of one type on one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub kind: InteractionKind,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OverallStats {
    pub friend_count: usize,
    pub daily: Vec<DailyCount>,
}

// -----------------------------------------------------------------------------
// Field helpers
// -----------------------------------------------------------------------------

pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn clamp_intimacy(value: u8) -> u8 {
    value.clamp(INTIMACY_MIN, INTIMACY_MAX)
}

pub fn clamp_mood(value: u8) -> u8 {
    value.clamp(MOOD_MIN, MOOD_MAX)
}

/// Trim, drop empties and duplicates, keep first-seen order
pub fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Split a comma-separated CLI argument into tags
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}
