use chrono::{DateTime, Utc};

/// Turn a creation timestamp into a coarse relative label
/// ("3 days ago", "1 day ago", "5 hours ago", "now")
///
/// `now` is passed in so a whole aggregation pass labels every PR against
/// the same instant. Timestamps in the future count as "now".
pub fn age_label(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created_at;

    let days = elapsed.num_days();
    if days >= 1 {
        return if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{} days ago", days)
        };
    }

    let hours = elapsed.num_hours();
    if hours >= 1 {
        format!("{} hours ago", hours)
    } else {
        "now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_age_label_now() {
        let now = fixed_now();
        assert_eq!(age_label(now, now), "now");
        assert_eq!(age_label(now - Duration::minutes(59), now), "now");
    }

    #[test]
    fn test_age_label_hours() {
        let now = fixed_now();
        assert_eq!(age_label(now - Duration::hours(1), now), "1 hours ago");
        assert_eq!(age_label(now - Duration::minutes(150), now), "2 hours ago");
        assert_eq!(age_label(now - Duration::hours(23), now), "23 hours ago");
    }

    #[test]
    fn test_age_label_single_day() {
        let now = fixed_now();
        assert_eq!(age_label(now - Duration::hours(24), now), "1 day ago");
        assert_eq!(age_label(now - Duration::hours(47), now), "1 day ago");
    }

    #[test]
    fn test_age_label_days() {
        let now = fixed_now();
        assert_eq!(age_label(now - Duration::hours(48), now), "2 days ago");
        assert_eq!(age_label(now - Duration::days(400), now), "400 days ago");
    }

    #[test]
    fn test_age_label_future_timestamp_is_now() {
        let now = fixed_now();
        assert_eq!(age_label(now + Duration::hours(5), now), "now");
    }

    #[test]
    fn test_age_label_monotonic_across_buckets() {
        // Rank buckets: now < hours < days, and within a bucket the count
        // never goes down as elapsed time grows.
        fn rank(label: &str) -> (u8, i64) {
            if label == "now" {
                return (0, 0);
            }
            let count: i64 = label.split(' ').next().unwrap().parse().unwrap();
            if label.contains("hour") {
                (1, count)
            } else {
                (2, count)
            }
        }

        let now = fixed_now();
        let mut previous = (0, 0);
        for minutes in (0..(60 * 24 * 5)).step_by(17) {
            let label = age_label(now - Duration::minutes(minutes), now);
            let current = rank(&label);
            assert!(
                current >= previous,
                "age went backwards at {} minutes: {}",
                minutes,
                label
            );
            previous = current;
        }
    }
}
