use crate::config::Layout;
use crate::display::bar;
use crate::error::Result;
use crate::host::{CmpOp, Host, Query};
use crate::labels::Lang;
use crate::mapper::{attr, date_value, parse_blocks, Record};
use crate::types::{DailyCount, Friend, Interaction, InteractionKind, OverallStats, Period};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const CHART_WIDTH: usize = 30;

/// Friend count plus interactions per day and type since the start of `period`
pub async fn overall(host: &dyn Host, layout: &Layout, period: Period, today: NaiveDate) -> Result<OverallStats> {
    let start = period.start_date(today);

    let friends_query = Query::documents().path_prefix(Friend::prefix(layout));
    let interactions_query = Query::documents()
        .path_prefix(Interaction::prefix(layout))
        .attr_cmp(attr::INTERACTION_DATE, CmpOp::Ge, &date_value(Some(start)));

    let (friend_blocks, interaction_blocks) =
        tokio::try_join!(host.query(&friends_query), host.query(&interactions_query))?;

    let friends: Vec<Friend> = parse_blocks(&friend_blocks);
    let interactions: Vec<Interaction> = parse_blocks(&interaction_blocks);
    log::debug!(
        "Analytics since {}: {} friends, {} interactions",
        start,
        friends.len(),
        interactions.len()
    );

    Ok(OverallStats {
        friend_count: friends.len(),
        daily: daily_counts(&interactions),
    })
}

/// Counts per (day, type), ordered by day then type
pub fn daily_counts(interactions: &[Interaction]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<(NaiveDate, InteractionKind), usize> = BTreeMap::new();
    for interaction in interactions {
        *counts.entry((interaction.date, interaction.kind)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((date, kind), count)| DailyCount { date, kind, count })
        .collect()
}

/// Text chart: one bar per day, then totals per type
pub fn render_chart(stats: &OverallStats, lang: Lang) -> String {
    let mut per_day: BTreeMap<NaiveDate, Vec<&DailyCount>> = BTreeMap::new();
    let mut per_kind: BTreeMap<InteractionKind, usize> = BTreeMap::new();
    for row in &stats.daily {
        per_day.entry(row.date).or_default().push(row);
        *per_kind.entry(row.kind).or_default() += row.count;
    }

    let mut out = String::new();
    out.push_str(&format!("Friends: {}\n", stats.friend_count));

    if per_day.is_empty() {
        out.push_str("No interactions in this period\n");
        return out;
    }

    let day_totals: Vec<(NaiveDate, usize, String)> = per_day
        .iter()
        .map(|(date, rows)| {
            let total = rows.iter().map(|r| r.count).sum();
            let detail = rows
                .iter()
                .map(|r| format!("{} {}", lang.kind(r.kind), r.count))
                .collect::<Vec<_>>()
                .join(", ");
            (*date, total, detail)
        })
        .collect();
    let max = day_totals.iter().map(|(_, total, _)| *total).max().unwrap_or(0);

    out.push('\n');
    for (date, total, detail) in &day_totals {
        out.push_str(&format!(
            "{}  {:<width$} {:>3}  ({})\n",
            date,
            bar(*total, max, CHART_WIDTH),
            total,
            detail,
            width = CHART_WIDTH
        ));
    }

    out.push('\n');
    let total: usize = per_kind.values().sum();
    for (kind, count) in &per_kind {
        out.push_str(&format!("{:<8} {:>4}\n", lang.kind(*kind), count));
    }
    out.push_str(&format!("{:<8} {:>4}\n", "total", total));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friends::FriendManager;
    use crate::host::local::LocalHost;
    use crate::interactions::InteractionLogger;
    use crate::types::{NewFriend, NewInteraction};
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_overall() {
        let host = Arc::new(LocalHost::in_memory().unwrap());
        let mut friends = FriendManager::new(host.clone(), Layout::default(), Lang::En);
        for name in ["Alice", "Bob"] {
            friends
                .create(NewFriend {
                    name: name.to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let logger = InteractionLogger::new(host.clone(), Layout::default(), Lang::En);
        for (kind, day) in [
            (InteractionKind::Meal, "2024-03-10"),
            (InteractionKind::Meal, "2024-03-10"),
            (InteractionKind::Call, "2024-03-10"),
            (InteractionKind::Chat, "2024-03-12"),
            (InteractionKind::Chat, "2024-01-01"),
        ] {
            logger
                .log(NewInteraction {
                    friend_id: Some("friend-alice".to_string()),
                    ..NewInteraction::new(kind, date(day))
                })
                .await
                .unwrap();
        }

        let stats = overall(host.as_ref(), &Layout::default(), Period::Month, date("2024-03-15"))
            .await
            .unwrap();

        assert_eq!(stats.friend_count, 2);
        assert_eq!(
            stats.daily,
            vec![
                DailyCount {
                    date: date("2024-03-10"),
                    kind: InteractionKind::Call,
                    count: 1
                },
                DailyCount {
                    date: date("2024-03-10"),
                    kind: InteractionKind::Meal,
                    count: 2
                },
                DailyCount {
                    date: date("2024-03-12"),
                    kind: InteractionKind::Chat,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_render_chart() {
        let stats = OverallStats {
            friend_count: 4,
            daily: vec![
                DailyCount {
                    date: date("2024-03-10"),
                    kind: InteractionKind::Meal,
                    count: 2,
                },
                DailyCount {
                    date: date("2024-03-11"),
                    kind: InteractionKind::Call,
                    count: 1,
                },
            ],
        };

        let chart = render_chart(&stats, Lang::En);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], "Friends: 4");
        assert!(lines[2].starts_with("2024-03-10  ██████████████████████████████"));
        assert!(lines[2].ends_with("2  (Meal 2)"));
        assert!(lines[3].starts_with(&format!("2024-03-11  {} ", "█".repeat(15))));
        assert!(chart.contains("total       3"));
    }

    #[test]
    fn test_render_empty() {
        let chart = render_chart(&OverallStats::default(), Lang::En);
        assert!(chart.contains("No interactions"));
    }
}
