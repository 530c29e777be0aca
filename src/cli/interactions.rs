use super::{parse_day, preview, today};
use crate::config::Settings;
use crate::display::mood_faces;
use crate::error::{Error, Result};
use crate::recorder::Friendships;
use crate::types::{parse_tag_list, InteractionKind, InteractionQuery, NewInteraction, Period};

/// Options of the log command
#[derive(Debug, Default)]
pub struct LogArgs {
    pub friend: Option<String>,
    pub date: Option<String>,
    pub mood: Option<u8>,
    pub location: Option<String>,
    pub cost: Option<f64>,
    pub tags: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

fn parse_kind(raw: &str) -> Result<InteractionKind> {
    raw.parse().map_err(Error::InvalidInput)
}

/// Run the log command
pub async fn run_log(settings: &Settings, kind: &str, args: LogArgs) -> Result<()> {
    let kind = parse_kind(kind)?;
    let date = match args.date.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => today(),
    };

    let mut app = Friendships::open(settings).await?;
    let friend_id = match args.friend.as_deref() {
        Some(friend) => Some(app.friend(friend)?.id.clone()),
        None => None,
    };

    let interaction = app
        .log_interaction(NewInteraction {
            friend_id,
            mood: args.mood,
            location: args.location,
            cost: args.cost,
            tags: args.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            title: args.title,
            content: args.content,
            ..NewInteraction::new(kind, date)
        })
        .await?;

    println!("Logged {} on {} [{}]", interaction.kind, interaction.date, interaction.id);
    if let Some(friend_id) = &interaction.friend_id {
        println!("  with: {}", friend_id);
    }

    Ok(())
}

/// Run the interactions command
pub async fn run_interactions(settings: &Settings, friend: &str, limit: usize, offset: usize, kind: Option<&str>) -> Result<()> {
    let app = Friendships::open(settings).await?;
    let friend = app.friend(friend)?;
    let lang = app.lang();

    let opts = InteractionQuery {
        limit,
        offset,
        kind: kind.map(parse_kind).transpose()?,
    };
    let interactions = app.interactions(&friend.id, &opts).await?;

    if interactions.is_empty() {
        println!("No interactions with {} yet.", friend.name);
        return Ok(());
    }

    println!("Interactions with {}:\n", friend.name);
    for i in interactions {
        println!("[{}] {}  {}  {}", i.id, i.date, lang.kind(i.kind), mood_faces(i.mood));
        if let Some(title) = &i.title {
            println!("    {}", title);
        }
        if let Some(location) = &i.location {
            println!("    at {}", location);
        }
        if i.cost > 0.0 {
            println!("    cost: {:.2}", i.cost);
        }
        if !i.tags.is_empty() {
            println!("    tags: {}", i.tags.join(", "));
        }
        if let Some(content) = &i.content {
            println!("    {}", preview(content, 200));
        }
        println!();
    }

    Ok(())
}

/// Run the stats command
pub async fn run_stats(settings: &Settings, friend: &str, period: &str) -> Result<()> {
    let period: Period = period.parse().map_err(Error::InvalidInput)?;
    let app = Friendships::open(settings).await?;
    let friend = app.friend(friend)?;
    let lang = app.lang();

    let stats = app.friend_stats(&friend.id, period, today()).await?;
    if stats.is_empty() {
        println!("No interactions with {} in this period.", friend.name);
        return Ok(());
    }

    println!("Interactions with {} since {}\n", friend.name, period.start_date(today()));
    println!("  {:10} {:>6} {:>9}", "type", "count", "avg mood");
    println!("  {}", "-".repeat(27));
    for stat in &stats {
        println!("  {:10} {:>6} {:>9.1}", lang.kind(stat.kind), stat.count, stat.avg_mood);
    }
    let total: usize = stats.iter().map(|s| s.count).sum();
    println!("  {:10} {:>6}", "total", total);

    Ok(())
}
