//! RTC Report - reception statistics for RTCP Receiver Reports.
//!
//! A [`ReceiverStream`] follows one inbound RTP source (one SSRC) and keeps
//! what RFC 3550 §6.4 needs for a reception report block:
//!
//! - which of the most recent sequence numbers arrived, in a fixed-size ring
//!   bitmap,
//! - the extended highest sequence number, counting 16-bit wraparounds,
//! - the interarrival jitter estimate,
//! - cumulative and per-interval packet loss,
//! - the last sender report reference (LSR) and when it arrived (for DLSR).
//!
//! # Scope
//!
//! The stream works on already-parsed input ([`rtp::Header`] and
//! [`rtcp::SenderReport`]) and produces an [`rtcp::ReceiverReport`]. Transport
//! I/O, report scheduling and keeping one stream per SSRC are the caller's
//! job. Time is always passed in, which keeps the statistics deterministic.
//!
//! # Quick Start
//!
//! ```
//! use rtc_report::ReceiverStream;
//! use std::time::{Duration, Instant};
//!
//! let stream = ReceiverStream::new(0x1234_5678, 8000);
//! let start = Instant::now();
//!
//! for (i, seq) in [100u16, 101, 103].into_iter().enumerate() {
//!     let header = rtp::Header {
//!         ssrc: 0x1234_5678,
//!         sequence_number: seq,
//!         timestamp: 160 * i as u32,
//!     };
//!     stream.process_rtp(start + Duration::from_millis(20 * i as u64), &header);
//! }
//!
//! let rr = stream.generate_report(start + Duration::from_secs(1));
//! assert_eq!(rr.reports[0].last_sequence_number, 103);
//! assert_eq!(rr.reports[0].total_lost, 1);
//! ```
//!
//! # Window Size
//!
//! Arrivals are remembered for the last `size * 64` sequence numbers (8192 by
//! default, see [`ReceiverStreamBuilder::with_size`]). If more packets than
//! that pass between two reports, older arrivals are overwritten before they
//! are counted and loss is under-reported. This is logged but not prevented.

#![warn(rust_2018_idioms)]

mod receiver_stream;
mod window;

pub use receiver_stream::{ReceiverStream, ReceiverStreamBuilder};
