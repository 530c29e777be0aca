use super::{parse_optional_day, preview, today};
use crate::config::Settings;
use crate::display::{format_date, intimacy_stars, mood_faces, relative_time};
use crate::error::Result;
use crate::labels::Lang;
use crate::recorder::Friendships;
use crate::types::{
    parse_tag_list, Contact, Friend, FriendUpdate, InteractionQuery, NewFriend, SearchFilters,
};

/// Profile fields shared by `add` and `update`
#[derive(Debug, Default)]
pub struct ProfileArgs {
    pub nickname: Option<String>,
    pub birthday: Option<String>,
    pub met_date: Option<String>,
    pub met_location: Option<String>,
    pub relationship: Option<String>,
    pub tags: Option<String>,
    pub intimacy: Option<u8>,
    pub phone: Option<String>,
    pub wechat: Option<String>,
    pub email: Option<String>,
    pub social: Option<String>,
    pub notes: Option<String>,
}

/// Run the add command
pub async fn run_add(settings: &Settings, name: &str, args: ProfileArgs) -> Result<()> {
    let mut app = Friendships::open(settings).await?;

    let friend = app
        .add_friend(NewFriend {
            name: name.to_string(),
            nickname: args.nickname,
            birthday: parse_optional_day(args.birthday.as_deref())?,
            met_date: parse_optional_day(args.met_date.as_deref())?,
            met_location: args.met_location,
            relationship: args.relationship,
            tags: args.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            intimacy: args.intimacy,
            contact: Contact {
                phone: args.phone,
                wechat: args.wechat,
                email: args.email,
                social_media: args.social,
            },
            notes: args.notes,
        })
        .await?;

    println!("Added {} [{}]", friend.name, friend.id);
    if !friend.tags.is_empty() {
        println!("  tags: {}", friend.tags.join(", "));
    }

    Ok(())
}

/// Run the update command
pub async fn run_update(settings: &Settings, friend: &str, args: ProfileArgs, last_contact: Option<&str>) -> Result<()> {
    let mut app = Friendships::open(settings).await?;
    let id = app.friend(friend)?.id.clone();

    let update = FriendUpdate {
        nickname: args.nickname,
        birthday: parse_optional_day(args.birthday.as_deref())?,
        met_location: args.met_location,
        relationship: args.relationship,
        tags: args.tags.as_deref().map(parse_tag_list),
        intimacy: args.intimacy,
        phone: args.phone,
        wechat: args.wechat,
        email: args.email,
        social_media: args.social,
        notes: args.notes,
        last_contact: parse_optional_day(last_contact)?,
    };

    let friend = app.update_friend(&id, &update).await?;
    println!("Updated {} [{}]", friend.name, friend.id);

    Ok(())
}

/// Run the show command
pub async fn run_show(settings: &Settings, friend: &str, recent: usize) -> Result<()> {
    let app = Friendships::open(settings).await?;
    let lang = app.lang();
    let friend = app.friend(friend)?;

    print_profile(friend, lang);

    let interactions = app
        .interactions(
            &friend.id,
            &InteractionQuery {
                limit: recent,
                ..Default::default()
            },
        )
        .await?;

    if !interactions.is_empty() {
        println!("\nRecent interactions:");
        for i in interactions {
            println!(
                "  {}  {:8} {}  {}",
                i.date,
                lang.kind(i.kind),
                mood_faces(i.mood),
                i.title.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

/// Run the search command
pub async fn run_search(settings: &Settings, query: Option<&str>, relationship: Option<String>, tags: Option<&str>) -> Result<()> {
    let app = Friendships::open(settings).await?;
    let filters = SearchFilters {
        relationship,
        tags: tags.map(parse_tag_list).unwrap_or_default(),
    };

    if app.friend_count() == 0 {
        println!("No friends yet. Add one with: friends add <name>");
        return Ok(());
    }

    let results = app.search(query.unwrap_or(""), &filters);
    if results.is_empty() {
        println!("No matching friends.");
        return Ok(());
    }

    let lang = app.lang();
    for friend in results {
        print_friend_line(friend, lang);
    }

    Ok(())
}

fn print_friend_line(f: &Friend, lang: Lang) {
    let last = f
        .last_contact
        .map(|d| relative_time(d, today(), lang))
        .unwrap_or_else(|| "-".to_string());

    println!("[{}] {}", f.id, f.name);
    println!(
        "    {} | {} | last contact: {}",
        f.relationship,
        intimacy_stars(f.intimacy),
        last
    );
    if !f.tags.is_empty() {
        println!("    tags: {}", f.tags.join(", "));
    }
}

fn print_profile(f: &Friend, lang: Lang) {
    println!("{} [{}]", f.name, f.id);
    println!("{}", "=".repeat(40));

    let field = |label: &str, value: Option<String>| {
        if let Some(v) = value {
            println!("  {:14} {}", label, v);
        }
    };
    field("nickname", f.nickname.clone());
    field("relationship", Some(f.relationship.clone()));
    field("intimacy", Some(intimacy_stars(f.intimacy)));
    field("birthday", f.birthday.map(|d| format_date(d, lang)));
    field("met", f.met_date.map(|d| format_date(d, lang)));
    field("met at", f.met_location.clone());
    field("phone", f.contact.phone.clone());
    field("wechat", f.contact.wechat.clone());
    field("email", f.contact.email.clone());
    field("social", f.contact.social_media.clone());
    field(
        "last contact",
        f.last_contact.map(|d| relative_time(d, today(), lang)),
    );
    if !f.tags.is_empty() {
        field("tags", Some(f.tags.join(", ")));
    }
    field("notes", f.notes.as_deref().map(|n| preview(n, 200)));
}
