use chrono::{Datelike, NaiveDate};

/// Default round name for the ISO week containing `date`, e.g. "Week 42, 2026"
pub fn weekly_round_name(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("Week {}, {}", week.week(), week.year())
}
