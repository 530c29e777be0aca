//! User-facing strings written into documents and notifications.

use crate::types::InteractionKind;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    ZhCn,
    En,
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "zh_CN" | "zh-CN" | "zh" => Ok(Lang::ZhCn),
            "en" | "en_US" | "en-US" => Ok(Lang::En),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    BasicInfo,
    ContactInfo,
    Notes,
    Interactions,
    Financial,
    InteractionDetails,
    Name,
    Nickname,
    MetDate,
    MetLocation,
    Relationship,
    Intimacy,
    Phone,
    WeChat,
    Email,
    SocialMedia,
    Date,
    Type,
    Mood,
    Location,
    Friend,
    Content,
    Done,
    DefaultInteractionTitle,
    UnknownFriend,
    ReminderTitle,
    UpcomingReminders,
}

impl Lang {
    pub fn text(&self, text: Text) -> &'static str {
        match self {
            Lang::ZhCn => zh_cn(text),
            Lang::En => en(text),
        }
    }

    pub fn kind(&self, kind: InteractionKind) -> &'static str {
        match (self, kind) {
            (Lang::ZhCn, InteractionKind::Meeting) => "见面",
            (Lang::ZhCn, InteractionKind::Chat) => "聊天",
            (Lang::ZhCn, InteractionKind::Activity) => "活动",
            (Lang::ZhCn, InteractionKind::Gift) => "礼物",
            (Lang::ZhCn, InteractionKind::Call) => "通话",
            (Lang::ZhCn, InteractionKind::Meal) => "聚餐",
            (Lang::ZhCn, InteractionKind::Travel) => "旅行",
            (Lang::ZhCn, InteractionKind::Other) => "其他",
            (Lang::En, InteractionKind::Meeting) => "Meeting",
            (Lang::En, InteractionKind::Chat) => "Chat",
            (Lang::En, InteractionKind::Activity) => "Activity",
            (Lang::En, InteractionKind::Gift) => "Gift",
            (Lang::En, InteractionKind::Call) => "Call",
            (Lang::En, InteractionKind::Meal) => "Meal",
            (Lang::En, InteractionKind::Travel) => "Travel",
            (Lang::En, InteractionKind::Other) => "Other",
        }
    }
}

fn zh_cn(text: Text) -> &'static str {
    match text {
        Text::BasicInfo => "基本信息",
        Text::ContactInfo => "联系方式",
        Text::Notes => "个人备注",
        Text::Interactions => "互动记录",
        Text::Financial => "财务记录",
        Text::InteractionDetails => "互动详情",
        Text::Name => "姓名",
        Text::Nickname => "昵称",
        Text::MetDate => "认识时间",
        Text::MetLocation => "认识地点",
        Text::Relationship => "关系",
        Text::Intimacy => "亲密度",
        Text::Phone => "电话",
        Text::WeChat => "微信",
        Text::Email => "邮箱",
        Text::SocialMedia => "社交媒体",
        Text::Date => "日期",
        Text::Type => "类型",
        Text::Mood => "心情",
        Text::Location => "地点",
        Text::Friend => "朋友",
        Text::Content => "内容",
        Text::Done => "已完成",
        Text::DefaultInteractionTitle => "互动记录",
        Text::UnknownFriend => "未知朋友",
        Text::ReminderTitle => "提醒：联系",
        Text::UpcomingReminders => "即将提醒",
    }
}

fn en(text: Text) -> &'static str {
    match text {
        Text::BasicInfo => "Basic info",
        Text::ContactInfo => "Contact",
        Text::Notes => "Notes",
        Text::Interactions => "Interactions",
        Text::Financial => "Financial records",
        Text::InteractionDetails => "Details",
        Text::Name => "Name",
        Text::Nickname => "Nickname",
        Text::MetDate => "Met on",
        Text::MetLocation => "Met at",
        Text::Relationship => "Relationship",
        Text::Intimacy => "Intimacy",
        Text::Phone => "Phone",
        Text::WeChat => "WeChat",
        Text::Email => "Email",
        Text::SocialMedia => "Social media",
        Text::Date => "Date",
        Text::Type => "Type",
        Text::Mood => "Mood",
        Text::Location => "Location",
        Text::Friend => "Friend",
        Text::Content => "Message",
        Text::Done => "Done",
        Text::DefaultInteractionTitle => "Interaction",
        Text::UnknownFriend => "unknown friend",
        Text::ReminderTitle => "Reminder: contact",
        Text::UpcomingReminders => "Upcoming reminders",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_parse() {
        assert_eq!("zh_CN".parse::<Lang>(), Ok(Lang::ZhCn));
        assert_eq!("en".parse::<Lang>(), Ok(Lang::En));
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Lang::ZhCn.kind(InteractionKind::Meal), "聚餐");
        assert_eq!(Lang::En.kind(InteractionKind::Meal), "Meal");
    }
}
