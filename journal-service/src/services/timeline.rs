//! Calendar bucketing of activity records.
//!
//! The one piece of the journal that is computed locally rather than
//! delegated: activities are grouped by the UTC calendar date they
//! begin on, each day ascending by begin time.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeMap;

use crate::models::Activity;

/// Activities keyed by the UTC date of their begin timestamp, dates
/// ascending (BTreeMap order), each day's list ascending by begin time
/// with activity_id as the tie-breaker.
pub type Timeline = BTreeMap<NaiveDate, Vec<Activity>>;

/// Bucket activities by begin date and sort each day.
///
/// Every input record lands in exactly one bucket; nothing is merged or
/// dropped.
pub fn group_by_day(activities: Vec<Activity>) -> Timeline {
    let mut days: Timeline = BTreeMap::new();

    for activity in activities {
        days.entry(activity.begin_utc.date_naive())
            .or_default()
            .push(activity);
    }

    for day in days.values_mut() {
        day.sort_by(|a, b| {
            a.begin_utc
                .cmp(&b.begin_utc)
                .then(a.activity_id.cmp(&b.activity_id))
        });
    }

    days
}

/// Render a timeline as the plain-text digest fed to prompt templates
/// and the newsletter body.
pub fn render_digest(timeline: &Timeline) -> String {
    if timeline.is_empty() {
        return "No activities recorded.".to_string();
    }

    let mut out = String::new();
    for (date, activities) in timeline {
        out.push_str(&format!("{}:\n", date.format("%A, %Y-%m-%d")));
        for activity in activities {
            out.push_str(&format!(
                "  - {} ({}m, {}–{})",
                activity.name,
                activity.duration_minutes(),
                activity.begin_utc.format("%H:%M"),
                activity.end_utc.format("%H:%M"),
            ));
            if !activity.memo.is_empty() {
                out.push_str(&format!(": {}", activity.memo));
            }
            out.push('\n');
        }
    }
    out
}

/// Total number of activities across all days.
pub fn activity_count(timeline: &Timeline) -> usize {
    timeline.values().map(|day| day.len()).sum()
}

/// Midnight UTC at the start of a calendar date.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Convert an inclusive date range into the half-open UTC instant range
/// [start of `from`, start of the day after `to`).
pub fn range_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (day_start(from), day_start(to + Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn activity(name: &str, begin: &str, end: &str) -> Activity {
        Activity::new(
            Uuid::new_v4(),
            name.to_string(),
            begin.parse::<DateTime<Utc>>().unwrap(),
            end.parse::<DateTime<Utc>>().unwrap(),
            String::new(),
        )
    }

    #[test]
    fn buckets_by_utc_begin_date() {
        let timeline = group_by_day(vec![
            activity("read", "2024-03-01T21:00:00Z", "2024-03-01T22:00:00Z"),
            activity("run", "2024-03-02T07:00:00Z", "2024-03-02T08:00:00Z"),
            // Ends on the 2nd but begins on the 1st: bucketed on the 1st.
            activity("late write", "2024-03-01T23:30:00Z", "2024-03-02T00:30:00Z"),
        ]);

        assert_eq!(timeline.len(), 2);
        let first = &timeline[&"2024-03-01".parse::<NaiveDate>().unwrap()];
        assert_eq!(first.len(), 2);
        let second = &timeline[&"2024-03-02".parse::<NaiveDate>().unwrap()];
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "run");
    }

    #[test]
    fn each_day_is_ascending_by_begin_time() {
        let timeline = group_by_day(vec![
            activity("afternoon", "2024-03-01T15:00:00Z", "2024-03-01T16:00:00Z"),
            activity("morning", "2024-03-01T08:00:00Z", "2024-03-01T09:00:00Z"),
            activity("noon", "2024-03-01T12:00:00Z", "2024-03-01T12:30:00Z"),
        ]);

        let day = &timeline[&"2024-03-01".parse::<NaiveDate>().unwrap()];
        let names: Vec<_> = day.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["morning", "noon", "afternoon"]);

        for pair in day.windows(2) {
            assert!(pair[0].begin_utc <= pair[1].begin_utc);
        }
    }

    #[test]
    fn grouping_preserves_every_record_exactly_once() {
        let input: Vec<Activity> = (0..50)
            .map(|i| {
                activity(
                    &format!("a{}", i),
                    &format!("2024-03-{:02}T{:02}:00:00Z", 1 + i % 7, i % 24),
                    &format!("2024-03-{:02}T{:02}:30:00Z", 1 + i % 7, i % 24),
                )
            })
            .collect();
        let input_ids: HashSet<Uuid> = input.iter().map(|a| a.activity_id).collect();

        let timeline = group_by_day(input);

        let output_ids: HashSet<Uuid> = timeline
            .values()
            .flatten()
            .map(|a| a.activity_id)
            .collect();
        assert_eq!(activity_count(&timeline), 50);
        assert_eq!(input_ids, output_ids);
    }

    #[test]
    fn range_bounds_cover_the_whole_last_day() {
        let from = "2024-03-01".parse::<NaiveDate>().unwrap();
        let to = "2024-03-07".parse::<NaiveDate>().unwrap();
        let (start, end) = range_bounds(from, to);

        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-08T00:00:00+00:00");

        let last_minute = "2024-03-07T23:59:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(last_minute >= start && last_minute < end);
    }

    #[test]
    fn empty_input_yields_empty_timeline() {
        let timeline = group_by_day(Vec::new());
        assert!(timeline.is_empty());
        assert_eq!(render_digest(&timeline), "No activities recorded.");
    }

    #[test]
    fn digest_lists_days_in_order_with_memos() {
        let mut a = activity("deep work", "2024-03-01T09:00:00Z", "2024-03-01T11:00:00Z");
        a.memo = "draft finished".to_string();
        let timeline = group_by_day(vec![
            a,
            activity("run", "2024-03-02T07:00:00Z", "2024-03-02T08:00:00Z"),
        ]);

        let digest = render_digest(&timeline);
        let first = digest.find("deep work").unwrap();
        let second = digest.find("run").unwrap();
        assert!(first < second);
        assert!(digest.contains("draft finished"));
        assert!(digest.contains("120m"));
    }
}
