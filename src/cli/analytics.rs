use super::today;
use crate::analytics::render_chart;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::recorder::Friendships;
use crate::types::Period;

/// Run the analytics command
pub async fn run_analytics(settings: &Settings, period: &str) -> Result<()> {
    let period: Period = period.parse().map_err(Error::InvalidInput)?;
    let app = Friendships::open(settings).await?;

    let stats = app.overall_stats(period, today()).await?;
    println!("Since {}\n", period.start_date(today()));
    print!("{}", render_chart(&stats, app.lang()));

    Ok(())
}
