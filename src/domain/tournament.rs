//! Tournament lifecycle types and the registration rules.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::text_enum;

text_enum! {
    pub enum TournamentStatus("status") {
        Upcoming => "upcoming",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    pub enum TournamentFormat("format") {
        SingleElimination => "single_elimination",
        DoubleElimination => "double_elimination",
        RoundRobin => "round_robin",
        Swiss => "swiss",
    }
}

pub const MIN_PARTICIPANTS: i32 = 2;
pub const MAX_PARTICIPANTS: i32 = 1024;

/// Reasons a join request is refused. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinRejection {
    #[error("Tournament is not open for registration")]
    NotOpen,

    #[error("Registration deadline has passed")]
    DeadlinePassed,

    #[error("Tournament is full")]
    Full,

    #[error("Already registered for this tournament")]
    AlreadyRegistered,
}

/// Snapshot of the facts a join decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct JoinSnapshot {
    pub status: TournamentStatus,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub participant_count: u64,
    pub max_participants: i32,
    pub already_registered: bool,
}

/// Pure admission check. The store re-enforces capacity and uniqueness in the
/// insert itself, so this only decides which message a refused caller sees.
pub fn check_join(snapshot: &JoinSnapshot, now: DateTime<Utc>) -> Result<(), JoinRejection> {
    if snapshot.status != TournamentStatus::Upcoming {
        return Err(JoinRejection::NotOpen);
    }

    if let Some(deadline) = snapshot.registration_deadline
        && now >= deadline
    {
        return Err(JoinRejection::DeadlinePassed);
    }

    let capacity = u64::try_from(snapshot.max_participants).unwrap_or(0);
    if snapshot.participant_count >= capacity {
        return Err(JoinRejection::Full);
    }

    if snapshot.already_registered {
        return Err(JoinRejection::AlreadyRegistered);
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid start date")]
    InvalidStart,

    #[error("Invalid end date")]
    InvalidEnd,

    #[error("Invalid registration deadline")]
    InvalidDeadline,

    #[error("Start date must be in the future")]
    StartInPast,

    #[error("End date must be after start date")]
    EndBeforeStart,

    #[error("Registration deadline must be before start date")]
    DeadlineAfterStart,
}

/// Normalized tournament dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
}

impl Schedule {
    /// Validates submitted dates. `require_future_start` is set on creation;
    /// edits of an already running tournament keep their past start date.
    pub fn parse(
        start: &str,
        end: Option<&str>,
        registration_deadline: Option<&str>,
        now: DateTime<Utc>,
        require_future_start: bool,
    ) -> Result<Self, ScheduleError> {
        let start = parse_timestamp(start).ok_or(ScheduleError::InvalidStart)?;
        let end = parse_optional(end, ScheduleError::InvalidEnd)?;
        let registration_deadline =
            parse_optional(registration_deadline, ScheduleError::InvalidDeadline)?;

        if require_future_start && start <= now {
            return Err(ScheduleError::StartInPast);
        }

        if let Some(end) = end
            && end <= start
        {
            return Err(ScheduleError::EndBeforeStart);
        }

        if let Some(deadline) = registration_deadline
            && deadline > start
        {
            return Err(ScheduleError::DeadlineAfterStart);
        }

        Ok(Self {
            start,
            end,
            registration_deadline,
        })
    }
}

fn parse_optional(
    value: Option<&str>,
    err: ScheduleError,
) -> Result<Option<DateTime<Utc>>, ScheduleError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_timestamp(raw).map(Some).ok_or(err),
    }
}

/// Accepts RFC 3339, HTML `datetime-local` values (treated as UTC) and bare
/// dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_snapshot() -> JoinSnapshot {
        JoinSnapshot {
            status: TournamentStatus::Upcoming,
            registration_deadline: None,
            participant_count: 0,
            max_participants: 2,
            already_registered: false,
        }
    }

    #[test]
    fn test_join_accepted_when_open() {
        assert_eq!(check_join(&open_snapshot(), Utc::now()), Ok(()));
    }

    #[test]
    fn test_join_rejected_unless_upcoming() {
        for status in [
            TournamentStatus::Active,
            TournamentStatus::Completed,
            TournamentStatus::Cancelled,
        ] {
            let snapshot = JoinSnapshot {
                status,
                ..open_snapshot()
            };
            assert_eq!(
                check_join(&snapshot, Utc::now()),
                Err(JoinRejection::NotOpen)
            );
        }
    }

    #[test]
    fn test_join_rejected_after_deadline() {
        let now = Utc::now();
        let snapshot = JoinSnapshot {
            registration_deadline: Some(now - Duration::minutes(1)),
            ..open_snapshot()
        };
        assert_eq!(check_join(&snapshot, now), Err(JoinRejection::DeadlinePassed));
    }

    #[test]
    fn test_full_is_reported_before_already_registered() {
        let snapshot = JoinSnapshot {
            participant_count: 2,
            already_registered: true,
            ..open_snapshot()
        };
        assert_eq!(check_join(&snapshot, Utc::now()), Err(JoinRejection::Full));
    }

    #[test]
    fn test_already_registered() {
        let snapshot = JoinSnapshot {
            participant_count: 1,
            already_registered: true,
            ..open_snapshot()
        };
        assert_eq!(
            check_join(&snapshot, Utc::now()),
            Err(JoinRejection::AlreadyRegistered)
        );
    }

    #[test]
    fn test_schedule_requires_future_start() {
        let now = Utc::now();
        let past = (now - Duration::days(1)).to_rfc3339();
        assert_eq!(
            Schedule::parse(&past, None, None, now, true),
            Err(ScheduleError::StartInPast)
        );
        assert!(Schedule::parse(&past, None, None, now, false).is_ok());
    }

    #[test]
    fn test_schedule_ordering_rules() {
        let now = Utc::now();
        let start = (now + Duration::days(7)).to_rfc3339();
        let before = (now + Duration::days(6)).to_rfc3339();
        let after = (now + Duration::days(8)).to_rfc3339();

        assert_eq!(
            Schedule::parse(&start, Some(&before), None, now, true),
            Err(ScheduleError::EndBeforeStart)
        );
        assert_eq!(
            Schedule::parse(&start, None, Some(&after), now, true),
            Err(ScheduleError::DeadlineAfterStart)
        );

        let schedule = Schedule::parse(&start, Some(&after), Some(&before), now, true).unwrap();
        assert!(schedule.end.is_some());
        assert!(schedule.registration_deadline.is_some());
    }

    #[test]
    fn test_schedule_rejects_garbage() {
        assert_eq!(
            Schedule::parse("next tuesday", None, None, Utc::now(), true),
            Err(ScheduleError::InvalidStart)
        );
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2030-05-01T18:00:00Z").is_some());
        assert!(parse_timestamp("2030-05-01T18:00:00+02:00").is_some());
        assert!(parse_timestamp("2030-05-01T18:00").is_some());
        assert!(parse_timestamp("2030-05-01").is_some());
        assert!(parse_timestamp("").is_none());
    }
}
