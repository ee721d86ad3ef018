use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

use crate::core::{
    models::TimeReading,
    utils::{FORMATTED_TIME_FORMAT, UTC_OFFSET_FORMAT, UTC_ZONE_NAME},
};

/// Curated zones per region, each list in display order
const COMMON_TIMEZONES: &[(&str, &[&str])] = &[
    (
        "America",
        &[
            "America/New_York",
            "America/Chicago",
            "America/Denver",
            "America/Los_Angeles",
            "America/Toronto",
            "America/Vancouver",
            "America/Mexico_City",
            "America/Sao_Paulo",
            "America/Buenos_Aires",
            "America/Lima",
            "America/Bogota",
        ],
    ),
    (
        "Europe",
        &[
            "Europe/London",
            "Europe/Paris",
            "Europe/Berlin",
            "Europe/Rome",
            "Europe/Madrid",
            "Europe/Amsterdam",
            "Europe/Stockholm",
            "Europe/Moscow",
            "Europe/Istanbul",
            "Europe/Athens",
        ],
    ),
    (
        "Asia",
        &[
            "Asia/Tokyo",
            "Asia/Seoul",
            "Asia/Shanghai",
            "Asia/Hong_Kong",
            "Asia/Singapore",
            "Asia/Bangkok",
            "Asia/Kolkata",
            "Asia/Dubai",
            "Asia/Jakarta",
            "Asia/Manila",
        ],
    ),
    (
        "Australia",
        &[
            "Australia/Sydney",
            "Australia/Melbourne",
            "Australia/Perth",
            "Australia/Brisbane",
            "Australia/Adelaide",
            "Australia/Darwin",
        ],
    ),
    (
        "Africa",
        &[
            "Africa/Cairo",
            "Africa/Lagos",
            "Africa/Johannesburg",
            "Africa/Nairobi",
            "Africa/Casablanca",
            "Africa/Tunis",
        ],
    ),
    ("UTC", &["UTC"]),
];

/// A usable timezone plus the name callers should see for it.
///
/// `name` is the requested name when it resolved, and `"UTC"` whenever the
/// resolver fell back.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimezone {
    pub tz: Tz,
    pub name: String,
    pub fell_back: bool,
}

impl ResolvedTimezone {
    pub fn utc() -> Self {
        Self {
            tz: chrono_tz::UTC,
            name: UTC_ZONE_NAME.to_string(),
            fell_back: false,
        }
    }

    fn fallback() -> Self {
        Self {
            fell_back: true,
            ..Self::utc()
        }
    }
}

/// Resolve a timezone name, degrading to UTC instead of failing.
///
/// Names match case-insensitively; the reported name is the one requested.
pub fn resolve_timezone(name: Option<&str>) -> ResolvedTimezone {
    let name = match name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => return ResolvedTimezone::utc(),
    };

    match Tz::from_str(name).or_else(|_| Tz::from_str_insensitive(name)) {
        Ok(tz) => ResolvedTimezone {
            tz,
            name: name.to_string(),
            fell_back: false,
        },
        Err(_) => {
            tracing::warn!("Unknown timezone '{}', falling back to UTC", name);
            ResolvedTimezone::fallback()
        }
    }
}

/// Detect the host's timezone, defaulting to UTC
pub fn local_timezone() -> ResolvedTimezone {
    match iana_time_zone::get_timezone() {
        Ok(tz_name) => resolve_timezone(Some(&tz_name)),
        Err(_) => {
            tracing::warn!("Could not detect system timezone, defaulting to UTC");
            ResolvedTimezone::utc()
        }
    }
}

/// Read the current instant through the resolved timezone
pub fn read_now(resolved: &ResolvedTimezone) -> TimeReading {
    read_at(resolved, Utc::now())
}

/// Render a fixed instant through the resolved timezone.
///
/// Offset and DST come from the zone's rules at `instant`.
pub fn read_at(resolved: &ResolvedTimezone, instant: DateTime<Utc>) -> TimeReading {
    let local = instant.with_timezone(&resolved.tz);
    let is_dst = observes_dst(&resolved.tz, &local);

    TimeReading {
        current_time: local.to_rfc3339_opts(SecondsFormat::Micros, false),
        timezone: resolved.name.clone(),
        utc_offset: local.format(UTC_OFFSET_FORMAT).to_string(),
        formatted_time: local.format(FORMATTED_TIME_FORMAT).to_string(),
        timestamp: instant.timestamp_micros() as f64 / 1_000_000.0,
        is_dst,
    }
}

/// Whether summer time is in effect at `local`.
///
/// Zones stored with a negative save (Europe/Dublin) carry the adjustment in
/// winter, so a zero save there is the summer period.
fn observes_dst(tz: &Tz, local: &DateTime<Tz>) -> bool {
    match local.offset().dst_offset().num_seconds().signum() {
        1 => true,
        -1 => false,
        _ => (1..=12).any(|month| {
            Utc.with_ymd_and_hms(local.year(), month, 15, 12, 0, 0)
                .single()
                .is_some_and(|sample| {
                    tz.offset_from_utc_datetime(&sample.naive_utc())
                        .dst_offset()
                        .num_seconds()
                        < 0
                })
        }),
    }
}

/// Region to representative zones, deterministic across calls
pub fn common_timezones() -> BTreeMap<&'static str, Vec<&'static str>> {
    COMMON_TIMEZONES
        .iter()
        .map(|(region, zones)| (*region, zones.to_vec()))
        .collect()
}

/// Number of zone identifiers known to the timezone database
pub fn total_available_timezones() -> usize {
    chrono_tz::TZ_VARIANTS.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_resolve_known_zone() {
        let resolved = resolve_timezone(Some("Asia/Seoul"));
        assert_eq!(resolved.tz, chrono_tz::Asia::Seoul);
        assert_eq!(resolved.name, "Asia/Seoul");
        assert!(!resolved.fell_back);
    }

    #[test]
    fn test_resolve_unknown_zone_falls_back() {
        for name in ["Not/AZone", "Asia/Seol", "garbage", "+09:00"] {
            let resolved = resolve_timezone(Some(name));
            assert_eq!(resolved.tz, chrono_tz::UTC, "{name}");
            assert_eq!(resolved.name, "UTC", "{name}");
            assert!(resolved.fell_back, "{name}");
        }
    }

    #[test]
    fn test_resolve_ignores_case() {
        for name in ["asia/seoul", "ASIA/SEOUL", "Asia/seoul"] {
            let resolved = resolve_timezone(Some(name));
            assert_eq!(resolved.tz, chrono_tz::Asia::Seoul, "{name}");
            assert_eq!(resolved.name, name);
            assert!(!resolved.fell_back);
        }

        let resolved = resolve_timezone(Some("utc"));
        assert_eq!(resolved.tz, chrono_tz::UTC);
        assert_eq!(resolved.name, "utc");
    }

    #[test]
    fn test_resolve_absent_or_empty_is_utc() {
        assert_eq!(resolve_timezone(None), ResolvedTimezone::utc());
        assert_eq!(resolve_timezone(Some("")), ResolvedTimezone::utc());
        assert_eq!(resolve_timezone(Some("   ")), ResolvedTimezone::utc());
    }

    #[test]
    fn test_every_database_zone_resolves_to_itself() {
        for tz in chrono_tz::TZ_VARIANTS.iter() {
            let resolved = resolve_timezone(Some(tz.name()));
            assert_eq!(resolved.name, tz.name());
            assert!(!resolved.fell_back);
        }
    }

    #[test]
    fn test_local_timezone_is_usable() {
        let local = local_timezone();
        assert!(!local.name.is_empty());
        if local.fell_back {
            assert_eq!(local.name, "UTC");
        }
    }

    #[test]
    fn test_read_at_utc() {
        let reading = read_at(&ResolvedTimezone::utc(), instant(2024, 1, 1, 12, 0, 0));

        assert_eq!(reading.current_time, "2024-01-01T12:00:00.000000+00:00");
        assert_eq!(reading.timezone, "UTC");
        assert_eq!(reading.utc_offset, "+0000");
        assert_eq!(reading.formatted_time, "2024-01-01 12:00:00 UTC");
        assert_eq!(reading.timestamp, 1_704_110_400.0);
        assert!(!reading.is_dst);
    }

    #[test]
    fn test_read_at_seoul() {
        let resolved = resolve_timezone(Some("Asia/Seoul"));
        let reading = read_at(&resolved, instant(2024, 1, 1, 12, 0, 0));

        assert_eq!(reading.current_time, "2024-01-01T21:00:00.000000+09:00");
        assert_eq!(reading.utc_offset, "+0900");
        assert_eq!(reading.formatted_time, "2024-01-01 21:00:00 KST");
    }

    #[test]
    fn test_dst_follows_the_instant() {
        let resolved = resolve_timezone(Some("America/New_York"));

        let winter = read_at(&resolved, instant(2024, 1, 15, 12, 0, 0));
        assert!(!winter.is_dst);
        assert_eq!(winter.utc_offset, "-0500");
        assert!(winter.formatted_time.ends_with("EST"));

        let summer = read_at(&resolved, instant(2024, 7, 15, 12, 0, 0));
        assert!(summer.is_dst);
        assert_eq!(summer.utc_offset, "-0400");
        assert!(summer.formatted_time.ends_with("EDT"));

        let dublin = resolve_timezone(Some("Europe/Dublin"));

        let winter = read_at(&dublin, instant(2024, 1, 15, 12, 0, 0));
        assert!(!winter.is_dst);
        assert_eq!(winter.utc_offset, "+0000");
        assert!(winter.formatted_time.ends_with("GMT"));

        let summer = read_at(&dublin, instant(2024, 7, 15, 12, 0, 0));
        assert!(summer.is_dst);
        assert_eq!(summer.utc_offset, "+0100");
        assert!(summer.formatted_time.ends_with("IST"));
    }

    #[test]
    fn test_zone_without_dst_never_reports_it() {
        let resolved = resolve_timezone(Some("Asia/Seoul"));
        for month in 1..=12 {
            assert!(!read_at(&resolved, instant(2024, month, 1, 0, 0, 0)).is_dst);
        }
    }

    #[test]
    fn test_half_hour_offset() {
        let resolved = resolve_timezone(Some("Asia/Kolkata"));
        let reading = read_at(&resolved, instant(2024, 3, 1, 0, 0, 0));
        assert_eq!(reading.utc_offset, "+0530");
    }

    #[test]
    fn test_iso_string_round_trips_to_instant() {
        let at = Utc.timestamp_micros(1_718_000_123_456_789).unwrap();
        for name in ["UTC", "Asia/Seoul", "America/New_York"] {
            let reading = read_at(&resolve_timezone(Some(name)), at);
            let parsed = DateTime::parse_from_rfc3339(&reading.current_time).unwrap();
            assert_eq!(parsed.with_timezone(&Utc), at, "{name}");

            let prefix = parsed.format("%Y-%m-%d %H:%M:%S").to_string();
            assert!(reading.formatted_time.starts_with(&prefix), "{name}");
        }
    }

    #[test]
    fn test_fractional_timestamp() {
        let at = Utc.timestamp_micros(1_700_000_000_250_000).unwrap();
        let reading = read_at(&ResolvedTimezone::utc(), at);
        assert_eq!(reading.timestamp, 1_700_000_000.25);
    }

    #[test]
    fn test_common_timezones_are_deterministic() {
        let first = common_timezones();
        let second = common_timezones();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert_eq!(first["UTC"], vec!["UTC"]);
        assert_eq!(first["Asia"][1], "Asia/Seoul");
    }

    #[test]
    fn test_common_timezones_all_resolve() {
        for zones in common_timezones().values() {
            for zone in zones {
                assert!(!resolve_timezone(Some(zone)).fell_back, "{zone}");
            }
        }
        assert!(common_timezones()["America"].contains(&"America/Buenos_Aires"));
    }

    #[test]
    fn test_total_available_matches_database() {
        assert_eq!(total_available_timezones(), chrono_tz::TZ_VARIANTS.len());
        assert!(total_available_timezones() > 400);
    }
}
