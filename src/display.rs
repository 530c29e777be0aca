use crate::labels::Lang;
use crate::types::{INTIMACY_MAX, MOOD_MAX};
use chrono::NaiveDate;

/// Long-form date, e.g. `2024年1月5日` or `January 5, 2024`
pub fn format_date(date: NaiveDate, lang: Lang) -> String {
    match lang {
        Lang::ZhCn => date.format("%Y年%-m月%-d日").to_string(),
        Lang::En => date.format("%B %-d, %Y").to_string(),
    }
}

/// How long ago `date` was, relative to `today`
pub fn relative_time(date: NaiveDate, today: NaiveDate, lang: Lang) -> String {
    let days = (today - date).num_days();

    match lang {
        Lang::ZhCn => match days {
            d if d < 0 => format_date(date, lang),
            0 => "今天".to_string(),
            1 => "昨天".to_string(),
            d if d < 7 => format!("{}天前", d),
            d if d < 30 => format!("{}周前", d / 7),
            d if d < 365 => format!("{}个月前", d / 30),
            d => format!("{}年前", d / 365),
        },
        Lang::En => match days {
            d if d < 0 => format_date(date, lang),
            0 => "today".to_string(),
            1 => "yesterday".to_string(),
            d if d < 7 => format!("{} days ago", d),
            d if d < 30 => plural(d / 7, "week"),
            d if d < 365 => plural(d / 30, "month"),
            d => plural(d / 365, "year"),
        },
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

pub fn intimacy_stars(level: u8) -> String {
    let level = level.min(INTIMACY_MAX) as usize;
    format!(
        "{}{}",
        "⭐".repeat(level),
        "☆".repeat(INTIMACY_MAX as usize - level)
    )
}

pub fn mood_faces(mood: u8) -> String {
    let mood = mood.min(MOOD_MAX) as usize;
    format!("{}{}", "😊".repeat(mood), "😐".repeat(MOOD_MAX as usize - mood))
}

/// Horizontal bar scaled so `max` fills `width` cells
pub fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cells = ((value * width) + max - 1) / max;
    "█".repeat(cells.min(width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_relative_time() {
        let today = date("2024-06-30");
        assert_eq!(relative_time(today, today, Lang::En), "today");
        assert_eq!(relative_time(date("2024-06-29"), today, Lang::En), "yesterday");
        assert_eq!(relative_time(date("2024-06-27"), today, Lang::En), "3 days ago");
        assert_eq!(relative_time(date("2024-06-16"), today, Lang::En), "2 weeks ago");
        assert_eq!(relative_time(date("2024-05-31"), today, Lang::En), "1 month ago");
        assert_eq!(relative_time(date("2022-06-30"), today, Lang::En), "2 years ago");
        assert_eq!(relative_time(date("2024-06-27"), today, Lang::ZhCn), "3天前");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date("2024-01-05"), Lang::ZhCn), "2024年1月5日");
        assert_eq!(format_date(date("2024-01-05"), Lang::En), "January 5, 2024");
    }

    #[test]
    fn test_scales() {
        assert_eq!(intimacy_stars(3), "⭐⭐⭐☆☆☆☆☆☆☆");
        assert_eq!(mood_faces(4), "😊😊😊😊😐");
        assert_eq!(bar(5, 10, 10), "█████");
        assert_eq!(bar(1, 10, 4), "█");
        assert_eq!(bar(0, 10, 4), "");
    }
}
