// SPDX-License-Identifier: MPL-2.0

//! Week and month arithmetic for the schedule view. Weeks start on Monday.

use crate::model::ScheduleItem;
use crate::timefmt;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleView {
    #[default]
    Week,
    Month,
}

/// Monday and Sunday of the week containing `day`.
pub fn week_range(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = day.week(Weekday::Mon);
    (week.first_day(), week.last_day())
}

pub fn week_days(day: NaiveDate) -> Vec<NaiveDate> {
    let (start, _) = week_range(day);
    start.iter_days().take(7).collect()
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub fn last_of_month(day: NaiveDate) -> NaiveDate {
    first_of_month(day)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(day)
}

/// Whole Monday-start weeks covering the month of `day`.
pub fn month_grid(day: NaiveDate) -> Vec<[NaiveDate; 7]> {
    let (mut start, _) = week_range(first_of_month(day));
    let last = last_of_month(day);

    let mut weeks = Vec::new();
    while start <= last {
        let mut week = [start; 7];
        for (i, slot) in week.iter_mut().enumerate() {
            *slot = start + Days::new(i as u64);
        }
        weeks.push(week);
        start = start + Days::new(7);
    }
    weeks
}

pub fn previous_week(day: NaiveDate) -> NaiveDate {
    day - Days::new(7)
}

pub fn next_week(day: NaiveDate) -> NaiveDate {
    day + Days::new(7)
}

/// Same day of the previous month, clamped to its last day.
pub fn previous_month(day: NaiveDate) -> NaiveDate {
    day.checked_sub_months(Months::new(1)).unwrap_or(day)
}

pub fn next_month(day: NaiveDate) -> NaiveDate {
    day.checked_add_months(Months::new(1)).unwrap_or(day)
}

pub fn step(view: ScheduleView, day: NaiveDate, forward: bool) -> NaiveDate {
    match (view, forward) {
        (ScheduleView::Week, true) => next_week(day),
        (ScheduleView::Week, false) => previous_week(day),
        (ScheduleView::Month, true) => next_month(day),
        (ScheduleView::Month, false) => previous_month(day),
    }
}

/// Heading for the visible range: the month of the week's Monday, or the
/// month itself.
pub fn heading(view: ScheduleView, day: NaiveDate) -> String {
    match view {
        ScheduleView::Week => timefmt::month_label(week_range(day).0),
        ScheduleView::Month => timefmt::month_label(day),
    }
}

/// Items on `day`, earliest first.
pub fn items_on(items: &[ScheduleItem], day: NaiveDate) -> Vec<&ScheduleItem> {
    let mut found: Vec<_> = items.iter().filter(|i| i.date == day).collect();
    found.sort_by_key(|i| i.start_time);
    found
}

pub fn items_in_month(items: &[ScheduleItem], day: NaiveDate) -> Vec<&ScheduleItem> {
    let (first, last) = (first_of_month(day), last_of_month(day));
    let mut found: Vec<_> = items
        .iter()
        .filter(|i| i.date >= first && i.date <= last)
        .collect();
    found.sort_by_key(|i| (i.date, i.start_time));
    found
}

/// Items grouped by day, each day sorted by start time.
pub fn group_by_day(items: &[ScheduleItem]) -> BTreeMap<NaiveDate, Vec<&ScheduleItem>> {
    let mut days: BTreeMap<NaiveDate, Vec<&ScheduleItem>> = BTreeMap::new();
    for item in items {
        days.entry(item.date).or_default().push(item);
    }
    for list in days.values_mut() {
        list.sort_by_key(|i| i.start_time);
    }
    days
}

/// Days of the month of `day` that have at least one item.
pub fn busy_days(items: &[ScheduleItem], day: NaiveDate) -> Vec<NaiveDate> {
    let mut days: Vec<_> = items_in_month(items, day).iter().map(|i| i.date).collect();
    days.dedup();
    days
}
