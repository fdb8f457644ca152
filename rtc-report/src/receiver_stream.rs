//! Per-SSRC reception statistics for RTCP Receiver Reports.

use crate::window::{DEFAULT_SIZE, ReceivedWindow};
use log::{debug, trace, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rtcp::reception_report::MAX_TOTAL_LOST;
use shared::error::{Error, Result};
use shared::time::{duration_to_ntp_short, ntp_short};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Half of u16 max value, used for sequence number wraparound detection.
const UINT16_SIZE_HALF: u16 = 1 << 15;

/// Builder for [`ReceiverStream`].
///
/// # Example
///
/// ```
/// use rtc_report::ReceiverStreamBuilder;
///
/// let stream = ReceiverStreamBuilder::new()
///     .with_size(256)
///     .with_seed(7)
///     .build(0x1234_5678, 90000)
///     .unwrap();
///
/// assert_eq!(stream.ssrc(), 0x1234_5678);
/// ```
#[derive(Debug, Clone)]
pub struct ReceiverStreamBuilder {
    /// Number of u64 entries in the received-packet bitmap (power of 2: 1, 2, ..., 1024).
    size: u16,
    /// Seed for the generator of the reporting SSRC.
    seed: Option<u64>,
}

impl Default for ReceiverStreamBuilder {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            seed: None,
        }
    }
}

impl ReceiverStreamBuilder {
    /// Create a new builder with default settings.
    ///
    /// The default window is 128 entries, tracking 8192 sequence numbers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size of the received-packet bitmap, in 64-bit entries.
    ///
    /// The window tracks `size * 64` sequence numbers. Reports must be
    /// generated at least that often, otherwise loss is under-counted.
    pub fn with_size(mut self, size: u16) -> Self {
        self.size = size;
        self
    }

    /// Seed the non-cryptographic generator that picks the reporting SSRC.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create the stream for the remote source `ssrc` whose media clock runs
    /// at `clock_rate` Hz.
    ///
    /// Fails with [`Error::InvalidWindowSize`] if the configured size is not
    /// a power of two in `1..=1024`.
    pub fn build(self, ssrc: u32, clock_rate: u32) -> Result<ReceiverStream> {
        let window =
            ReceivedWindow::new(self.size).ok_or(Error::InvalidWindowSize(self.size))?;

        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };

        Ok(ReceiverStream::with_window(
            ssrc,
            rng.random::<u32>(),
            clock_rate,
            window,
        ))
    }
}

/// Mutable reception state, guarded by the stream lock.
#[derive(Debug)]
struct StreamState {
    window: ReceivedWindow,
    seq_num_cycles: u16,
    last_seq_num: u16,
    last_report_seq_num: u16,
    /// RTP timestamp and arrival time of the last packet. `None` until the
    /// first packet arrives.
    last_rtp_time: Option<(u32, Instant)>,
    jitter: f64,
    last_sender_report: u32,
    last_sender_report_time: Option<Instant>,
    total_lost: u32,
}

impl StreamState {
    fn new(window: ReceivedWindow) -> Self {
        Self {
            window,
            seq_num_cycles: 0,
            last_seq_num: 0,
            last_report_seq_num: 0,
            last_rtp_time: None,
            jitter: 0.0,
            last_sender_report: 0,
            last_sender_report_time: None,
            total_lost: 0,
        }
    }

    /// Moves the highest sequence number forward if `seq` is ahead of it,
    /// marking the skipped numbers as not received.
    fn advance(&mut self, ssrc: u32, seq: u16) {
        let diff = seq.wrapping_sub(self.last_seq_num);
        if diff == 0 || diff >= UINT16_SIZE_HALF {
            // duplicate or older packet
            return;
        }

        if seq < self.last_seq_num {
            self.seq_num_cycles = self.seq_num_cycles.wrapping_add(1);
            trace!(
                "ssrc {ssrc}: sequence number wrapped, cycles {}",
                self.seq_num_cycles
            );
        }

        if diff > 1 {
            trace!("ssrc {ssrc}: {} packets missing before {seq}", diff - 1);
        }
        let mut i = self.last_seq_num.wrapping_add(1);
        while i != seq {
            self.window.mark_lost(i);
            i = i.wrapping_add(1);
        }

        self.last_seq_num = seq;
    }

    /// Counts packets in `(last_report_seq_num, last_seq_num)` not marked received.
    fn lost_since_report(&self) -> u32 {
        if self.last_seq_num == self.last_report_seq_num {
            return 0;
        }

        let mut lost = 0u32;
        let mut i = self.last_report_seq_num.wrapping_add(1);
        while i != self.last_seq_num {
            if !self.window.is_received(i) {
                lost += 1;
            }
            i = i.wrapping_add(1);
        }
        lost
    }

    fn extended_seq_num(&self) -> u32 {
        (self.seq_num_cycles as u32) << 16 | self.last_seq_num as u32
    }
}

/// Reception statistics for one remote RTP source.
///
/// Tracks which recent sequence numbers arrived, the interarrival jitter
/// (RFC 3550 §6.4.1) and cumulative loss, and turns them into a
/// [`rtcp::ReceiverReport`] on demand. All methods take `&self` and serialize on
/// an internal lock, so one stream can be shared between a packet path and a
/// report timer.
///
/// Deciding when to report is up to the caller. Reports must be generated
/// before the stream advances by more than the window size (8192 packets by
/// default), or older arrivals are forgotten and counted as lost.
#[derive(Debug)]
pub struct ReceiverStream {
    ssrc: u32,
    receiver_ssrc: u32,
    clock_rate: u32,

    state: Mutex<StreamState>,
}

impl ReceiverStream {
    /// Create a stream with the default window and a randomly chosen
    /// reporting SSRC.
    pub fn new(ssrc: u32, clock_rate: u32) -> Self {
        Self::with_window(
            ssrc,
            SmallRng::from_rng(&mut rand::rng()).random::<u32>(),
            clock_rate,
            ReceivedWindow::default(),
        )
    }

    fn with_window(ssrc: u32, receiver_ssrc: u32, clock_rate: u32, window: ReceivedWindow) -> Self {
        debug!(
            "receiver stream for ssrc {ssrc} (clock rate {clock_rate}, window {}) reporting as {receiver_ssrc}",
            window.capacity()
        );

        Self {
            ssrc,
            receiver_ssrc,
            clock_rate,
            state: Mutex::new(StreamState::new(window)),
        }
    }

    /// SSRC of the remote source being monitored.
    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    /// SSRC this receiver puts on the reports it generates.
    pub fn receiver_ssrc(&self) -> u32 {
        self.receiver_ssrc
    }

    /// Media clock rate of the monitored source, in Hz.
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    fn state(&self) -> MutexGuard<'_, StreamState> {
        // every critical section leaves the state consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the arrival of an RTP packet at `now`.
    pub fn process_rtp(&self, now: Instant, header: &rtp::Header) {
        let seq = header.sequence_number;
        let mut state = self.state();

        state.window.mark_received(seq);

        let last_rtp_time = state.last_rtp_time;
        match last_rtp_time {
            None => {
                // first packet: the first report covers it
                state.last_seq_num = seq;
                state.last_report_seq_num = seq.wrapping_sub(1);
            }
            Some((last_rtp, last_time)) => {
                state.advance(self.ssrc, seq);

                // compute jitter
                // https://tools.ietf.org/html/rfc3550#page-39
                let d = now.duration_since(last_time).as_secs_f64() * self.clock_rate as f64
                    - (header.timestamp as f64 - last_rtp as f64);
                state.jitter += (d.abs() - state.jitter) / 16.0;
            }
        }

        state.last_rtp_time = Some((header.timestamp, now));
    }

    /// Record a sender report from the monitored source, received at `now`.
    pub fn process_sender_report(&self, now: Instant, sr: &rtcp::SenderReport) {
        trace!("ssrc {}: {sr}", self.ssrc);
        let mut state = self.state();

        state.last_sender_report = ntp_short(sr.ntp_time);
        state.last_sender_report_time = Some(now);
    }

    /// Build a receiver report covering the packets since the previous one.
    ///
    /// Each call starts a new reporting interval, so a second call without
    /// new packets reports no interval loss.
    pub fn generate_report(&self, now: Instant) -> rtcp::ReceiverReport {
        let mut state = self.state();

        let total_since_report = state.last_seq_num.wrapping_sub(state.last_report_seq_num);
        if total_since_report as usize > state.window.capacity() {
            warn!(
                "ssrc {}: {total_since_report} packets since last report exceed window of {}, loss is under-counted",
                self.ssrc,
                state.window.capacity()
            );
        }

        let mut total_lost_since_report = state.lost_since_report();
        state.total_lost = state
            .total_lost
            .saturating_add(total_lost_since_report)
            .min(MAX_TOTAL_LOST);

        // allow up to 24 bits
        if total_lost_since_report > MAX_TOTAL_LOST {
            total_lost_since_report = MAX_TOTAL_LOST;
        }

        let fraction_lost = if total_since_report > 0 {
            ((total_lost_since_report * 256) as f64 / total_since_report as f64) as u8
        } else {
            0
        };

        // Calculate DLSR (Delay Since Last SR) - RFC 3550
        let delay = match state.last_sender_report_time {
            Some(sr_time) => duration_to_ntp_short(now.duration_since(sr_time)),
            None => 0,
        };

        let report = rtcp::ReceiverReport {
            ssrc: self.receiver_ssrc,
            reports: vec![rtcp::ReceptionReport {
                ssrc: self.ssrc,
                last_sequence_number: state.extended_seq_num(),
                last_sender_report: state.last_sender_report,
                fraction_lost,
                total_lost: state.total_lost,
                delay,
                jitter: state.jitter as u32,
            }],
            ..Default::default()
        };

        trace!(
            "ssrc {}: {total_lost_since_report}/{total_since_report} lost since last report, {} total",
            self.ssrc, state.total_lost
        );

        state.last_report_seq_num = state.last_seq_num;

        report
    }
}
