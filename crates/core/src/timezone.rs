//! Resolution of naive local timestamps into absolute UTC instants.
//!
//! Events store an IANA timezone name next to their schedule. Incoming
//! payloads carry wall-clock times in that zone, which must be resolved
//! before they can be compared with stored values.

use chrono::{Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Parse an IANA timezone name (e.g. `"Europe/Madrid"`).
pub fn parse_timezone(name: &str) -> Result<Tz, CoreError> {
    name.parse::<Tz>()
        .map_err(|_| CoreError::Validation(format!("invalid timezone '{name}'")))
}

/// Resolve a wall-clock time in `tz` to an absolute instant.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant.
/// Non-existent local times (DST spring-forward gap) resolve to the instant
/// one hour later, which is where clocks land after the jump.
pub fn resolve_in(tz: &Tz, local: NaiveDateTime) -> Timestamp {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = local + Duration::hours(1);
            match tz.from_local_datetime(&shifted).earliest() {
                Some(dt) => dt.with_timezone(&Utc),
                // Zones never skip two consecutive hours; fall back to UTC wall time.
                None => Utc.from_utc_datetime(&local),
            }
        }
    }
}

/// Resolve an optional wall-clock time given a timezone name.
pub fn resolve_local(
    local: Option<NaiveDateTime>,
    timezone: &str,
) -> Result<Option<Timestamp>, CoreError> {
    let tz = parse_timezone(timezone)?;
    Ok(local.map(|l| resolve_in(&tz, l)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_known_zone() {
        assert!(parse_timezone("America/New_York").is_ok());
        assert!(parse_timezone("UTC").is_ok());
    }

    #[test]
    fn rejects_unknown_zone() {
        let err = parse_timezone("Mars/Olympus_Mons").unwrap_err();
        assert!(err.to_string().contains("invalid timezone"));
    }

    #[test]
    fn resolves_with_offset() {
        let tz = parse_timezone("Europe/Madrid").unwrap();
        // CEST is UTC+2 in July.
        let resolved = resolve_in(&tz, naive(2030, 7, 1, 12, 0));
        assert_eq!(resolved, Utc.with_ymd_and_hms(2030, 7, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn same_wall_time_differs_across_zones() {
        let local = Some(naive(2030, 1, 15, 18, 0));
        let a = resolve_local(local, "Europe/London").unwrap();
        let b = resolve_local(local, "America/Los_Angeles").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn ambiguous_time_picks_earliest() {
        let tz = parse_timezone("America/New_York").unwrap();
        // 2030-11-03 01:30 happens twice in New York.
        let resolved = resolve_in(&tz, naive(2030, 11, 3, 1, 30));
        assert_eq!(resolved, Utc.with_ymd_and_hms(2030, 11, 3, 5, 30, 0).unwrap());
    }

    #[test]
    fn gap_time_moves_forward() {
        let tz = parse_timezone("America/New_York").unwrap();
        // 2030-03-10 02:30 does not exist in New York.
        let resolved = resolve_in(&tz, naive(2030, 3, 10, 2, 30));
        assert_eq!(resolved, Utc.with_ymd_and_hms(2030, 3, 10, 7, 30, 0).unwrap());
    }

    #[test]
    fn none_stays_none() {
        assert_eq!(resolve_local(None, "UTC").unwrap(), None);
    }
}
