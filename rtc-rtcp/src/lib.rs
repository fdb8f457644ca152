//! RTCP report types exchanged by RTP receivers.
//!
//! Only the pieces a receiver needs are modelled: the [`SenderReport`] it
//! consumes and the [`ReceiverReport`] it produces. Receiver reports can be
//! serialized to the RFC 3550 wire layout through [`shared::marshal::Marshal`].

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod header;
pub mod receiver_report;
pub mod reception_report;
pub mod sender_report;
mod util;

pub use receiver_report::ReceiverReport;
pub use reception_report::ReceptionReport;
pub use sender_report::SenderReport;
