//! Wall-clock and NTP timestamp helpers.

use std::ops::Add;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Seconds between the NTP epoch (1900) and the unix epoch (1970).
const NTP_UNIX_OFFSET_SECS: u64 = 0x83AA7E80;

/// Pairs a monotonic [`Instant`] with the wall-clock time it was taken at, so
/// later instants can be converted to 64-bit NTP timestamps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemInstant {
    instant: Instant,
    duration_since_unix_epoch: Duration,
}

impl SystemInstant {
    pub fn now() -> Self {
        Self::new(
            Instant::now(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_else(|_| Duration::from_secs(0)),
        )
    }

    pub fn new(instant: Instant, duration_since_unix_epoch: Duration) -> Self {
        Self {
            instant,
            duration_since_unix_epoch,
        }
    }

    pub fn unix(&self, now: Instant) -> Duration {
        now.duration_since(self.instant)
            .add(self.duration_since_unix_epoch)
    }

    pub fn ntp(&self, now: Instant) -> u64 {
        SystemInstant::unix2ntp(self.unix(now))
    }

    pub fn unix2ntp(duration_since_unix_epoch: Duration) -> u64 {
        let u = duration_since_unix_epoch.as_nanos() as u64;

        let mut s = u / 1_000_000_000;
        s += NTP_UNIX_OFFSET_SECS;
        let mut f = u % 1_000_000_000;
        f <<= 32;
        f /= 1_000_000_000;
        s <<= 32;

        s | f
    }
}

/// Middle 32 bits of a 64-bit NTP timestamp (RFC 3550 "LSR" format): 16 bits
/// of seconds and 16 bits of fraction.
pub fn ntp_short(ntp: u64) -> u32 {
    (ntp >> 16) as u32
}

/// Converts a duration to units of 1/65536 seconds, truncating. Saturates at
/// `u32::MAX` (about 18 hours).
pub fn duration_to_ntp_short(d: Duration) -> u32 {
    (d.as_secs_f64() * 65536.0) as u32
}
