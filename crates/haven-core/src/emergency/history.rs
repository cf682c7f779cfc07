//! Call history statistics and display helpers.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use super::model::{CallLog, ContactType};

/// Default number of call logs shown in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Summary counts over a list of call logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallStats {
    pub total: usize,
    pub emergency: usize,
    pub buddy: usize,
}

impl CallStats {
    pub fn from_logs(logs: &[CallLog]) -> Self {
        logs.iter().fold(Self::default(), |mut stats, log| {
            stats.total += 1;
            match log.contact_type {
                ContactType::Emergency => stats.emergency += 1,
                ContactType::Buddy => stats.buddy += 1,
            }
            stats
        })
    }
}

/// Formats a call duration as `m:ss`; zero reads as "No duration".
pub fn format_duration(seconds: u32) -> String {
    if seconds == 0 {
        return "No duration".to_string();
    }
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Formats `at` relative to `now`: minutes or hours ago within a day,
/// otherwise a short date with the year only when it differs.
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes().max(0);
    if minutes < 60 {
        format!("{} minutes ago", minutes)
    } else if minutes < 24 * 60 {
        format!("{} hours ago", minutes / 60)
    } else if at.year() != now.year() {
        at.format("%b %-d, %Y").to_string()
    } else {
        at.format("%b %-d").to_string()
    }
}

/// Clock time of a call, e.g. `02:05 PM`.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emergency::CallStatus;
    use chrono::{Duration, TimeZone};

    fn log(contact_type: ContactType) -> CallLog {
        CallLog {
            id: "id".to_string(),
            contact_type,
            contact_name: "name".to_string(),
            phone_number: "999".to_string(),
            call_status: CallStatus::Initiated,
            call_duration: 0,
            emergency_context: serde_json::Value::Null,
            called_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats() {
        let logs = vec![
            log(ContactType::Emergency),
            log(ContactType::Buddy),
            log(ContactType::Buddy),
        ];
        let stats = CallStats::from_logs(&logs);
        assert_eq!(
            stats,
            CallStats {
                total: 3,
                emergency: 1,
                buddy: 2
            }
        );
        assert_eq!(CallStats::from_logs(&[]), CallStats::default());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "No duration");
        assert_eq!(format_duration(5), "0:05");
        assert_eq!(format_duration(125), "2:05");
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_relative(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "Jun 13");
        let last_year = Utc.with_ymd_and_hms(2023, 12, 31, 9, 0, 0).unwrap();
        assert_eq!(format_relative(last_year, now), "Dec 31, 2023");
        assert_eq!(format_relative(now + Duration::minutes(1), now), "0 minutes ago");
    }

    #[test]
    fn test_format_time() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 14, 5, 0).unwrap();
        assert_eq!(format_time(at), "02:05 PM");
    }
}
