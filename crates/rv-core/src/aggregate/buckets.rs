//! Bucket classifiers for expiration horizon and on-disk size.
//!
//! Both tables are ordered by ascending upper bound; a value lands in the
//! first bucket whose bound is at least the value.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Label for keys without an expiration.
pub const NO_EXPIRE: &str = "no-expire";

/// Label for keys whose expiration is at or before the reference time.
pub const EXPIRED: &str = "expired";

/// A named range with an inclusive upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketBound<T> {
    pub label: &'static str,
    pub max: T,
}

const HOUR: u64 = 3_600;
const DAY: u64 = 24 * HOUR;

/// Time-until-expiry buckets.
pub const TTL_BUCKETS: [BucketBound<Duration>; 6] = [
    BucketBound {
        label: "<=1h",
        max: Duration::from_secs(HOUR),
    },
    BucketBound {
        label: "1h-1d",
        max: Duration::from_secs(DAY),
    },
    BucketBound {
        label: "1d-7d",
        max: Duration::from_secs(7 * DAY),
    },
    BucketBound {
        label: "7d-30d",
        max: Duration::from_secs(30 * DAY),
    },
    BucketBound {
        label: "30d-90d",
        max: Duration::from_secs(90 * DAY),
    },
    BucketBound {
        label: ">90d",
        max: Duration::from_secs(36_500 * DAY),
    },
];

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// On-disk size buckets.
pub const SIZE_BUCKETS: [BucketBound<u64>; 7] = [
    BucketBound {
        label: "0-1KB",
        max: KIB,
    },
    BucketBound {
        label: "1KB-10KB",
        max: 10 * KIB,
    },
    BucketBound {
        label: "10KB-100KB",
        max: 100 * KIB,
    },
    BucketBound {
        label: "100KB-1MB",
        max: MIB,
    },
    BucketBound {
        label: "1MB-10MB",
        max: 10 * MIB,
    },
    BucketBound {
        label: "10MB-100MB",
        max: 100 * MIB,
    },
    BucketBound {
        label: ">100MB",
        max: u64::MAX,
    },
];

const TTL_FALLBACK: &str = ">90d";
const SIZE_FALLBACK: &str = ">100MB";

/// Classify an optional expiration against the run's reference time.
pub fn classify_ttl(expiration: Option<DateTime<Utc>>, now: DateTime<Utc>) -> &'static str {
    let Some(expiration) = expiration else {
        return NO_EXPIRE;
    };
    if expiration <= now {
        return EXPIRED;
    }
    // Strictly positive here, so the conversion only fails on overflow.
    let Ok(delta) = (expiration - now).to_std() else {
        return TTL_FALLBACK;
    };
    TTL_BUCKETS
        .iter()
        .find(|b| delta <= b.max)
        .map_or(TTL_FALLBACK, |b| b.label)
}

/// Classify a byte size.
pub fn classify_size(size: u64) -> &'static str {
    SIZE_BUCKETS
        .iter()
        .find(|b| size <= b.max)
        .map_or(SIZE_FALLBACK, |b| b.label)
}

/// TTL labels in report order: `no-expire`, `expired`, then ascending horizon.
pub fn ttl_labels() -> impl Iterator<Item = &'static str> {
    [NO_EXPIRE, EXPIRED]
        .into_iter()
        .chain(TTL_BUCKETS.iter().map(|b| b.label))
}

/// Size labels in report order.
pub fn size_labels() -> impl Iterator<Item = &'static str> {
    SIZE_BUCKETS.iter().map(|b| b.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_ttl_no_expiration() {
        assert_eq!(classify_ttl(None, now()), NO_EXPIRE);
    }

    #[test]
    fn test_ttl_expired_includes_now() {
        assert_eq!(classify_ttl(Some(now()), now()), EXPIRED);
        assert_eq!(
            classify_ttl(Some(now() - ChronoDuration::seconds(1)), now()),
            EXPIRED
        );
    }

    #[test]
    fn test_ttl_buckets() {
        let at = |d: ChronoDuration| classify_ttl(Some(now() + d), now());
        assert_eq!(at(ChronoDuration::minutes(30)), "<=1h");
        assert_eq!(at(ChronoDuration::hours(1)), "<=1h");
        assert_eq!(at(ChronoDuration::hours(1) + ChronoDuration::seconds(1)), "1h-1d");
        assert_eq!(at(ChronoDuration::days(3)), "1d-7d");
        assert_eq!(at(ChronoDuration::days(8)), "7d-30d");
        assert_eq!(at(ChronoDuration::days(40)), "30d-90d");
        assert_eq!(at(ChronoDuration::days(91)), ">90d");
        assert_eq!(at(ChronoDuration::days(50_000)), ">90d");
    }

    #[test]
    fn test_size_buckets_inclusive_upper_bound() {
        assert_eq!(classify_size(0), "0-1KB");
        assert_eq!(classify_size(1024), "0-1KB");
        assert_eq!(classify_size(1025), "1KB-10KB");
        assert_eq!(classify_size(100 * 1024), "10KB-100KB");
        assert_eq!(classify_size(MIB), "100KB-1MB");
        assert_eq!(classify_size(5 * MIB), "1MB-10MB");
        assert_eq!(classify_size(100 * MIB + 1), ">100MB");
        assert_eq!(classify_size(u64::MAX), ">100MB");
    }

    #[test]
    fn test_label_order() {
        let ttl: Vec<_> = ttl_labels().collect();
        assert_eq!(
            ttl,
            vec!["no-expire", "expired", "<=1h", "1h-1d", "1d-7d", "7d-30d", "30d-90d", ">90d"]
        );
        assert_eq!(size_labels().count(), 7);
        assert_eq!(size_labels().last(), Some(">100MB"));
    }
}
