use std::fmt;

use bytes::{BufMut, Bytes};
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize};

use crate::header::{COUNT_MAX, HEADER_LENGTH, Header, PacketType, SSRC_LENGTH};
use crate::reception_report::ReceptionReport;
use crate::util::get_padding_size;

/// A ReceiverReport (RR) packet provides reception quality feedback for an RTP stream
///
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// header |V=2|P|    RC   |   PT=RR=201   |             length            |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                     SSRC of packet sender                     |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// report |                 SSRC_1 (SSRC of first source)                 |
/// block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   1    | fraction lost |       cumulative number of packets lost       |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |           extended highest sequence number received           |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                      interarrival jitter                      |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         last SR (LSR)                         |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                   delay since last SR (DLSR)                  |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// report |                 SSRC_2 (SSRC of second source)                |
/// block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   2    :                               ...                             :
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
///        |                  profile-specific extensions                  |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ReceiverReport {
    /// The synchronization source identifier for the originator of this RR packet.
    pub ssrc: u32,
    /// Zero or more reception report blocks depending on the number of other
    /// sources heard by this sender since the last report. Each reception report
    /// block conveys statistics on the reception of RTP packets from a
    /// single synchronization source.
    pub reports: Vec<ReceptionReport>,
    /// Extension contains additional, payload-specific information that needs to
    /// be reported regularly about the receiver.
    pub profile_extensions: Bytes,
}

impl fmt::Display for ReceiverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("ReceiverReport from {}\n", self.ssrc);
        out += "\tSSRC    \tLost\t\tLastSequence\tJitter\n";
        for rep in &self.reports {
            out += format!(
                "\t{:x}\t{}/{}\t{}\t{}\n",
                rep.ssrc, rep.fraction_lost, rep.total_lost, rep.last_sequence_number, rep.jitter
            )
            .as_str();
        }
        out += format!("\tProfile Extension Data: {:?}\n", self.profile_extensions).as_str();

        write!(f, "{out}")
    }
}

impl ReceiverReport {
    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + SSRC_LENGTH
            + self.reports.iter().map(|r| r.marshal_size()).sum::<usize>()
            + self.profile_extensions.len()
    }

    /// Header returns the Header associated with this packet.
    pub fn header(&self) -> Header {
        Header {
            padding: get_padding_size(self.raw_size()) != 0,
            count: self.reports.len() as u8,
            packet_type: PacketType::ReceiverReport,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|x| x.ssrc).collect()
    }
}

impl MarshalSize for ReceiverReport {
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        // align to 32-bit boundary
        l + get_padding_size(l)
    }
}

impl Marshal for ReceiverReport {
    /// marshal_to encodes the packet in binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.reports.len() > COUNT_MAX {
            return Err(Error::TooManyReports);
        }
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort);
        }

        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.ssrc);

        for report in &self.reports {
            let n = report.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        buf.put(self.profile_extensions.clone());

        if h.padding {
            let padding_size = get_padding_size(self.raw_size());
            for i in 0..padding_size {
                if i == padding_size - 1 {
                    buf.put_u8(padding_size as u8);
                } else {
                    buf.put_u8(0);
                }
            }
        }

        Ok(self.marshal_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_block(ssrc: u32) -> ReceptionReport {
        ReceptionReport {
            ssrc,
            fraction_lost: 0,
            total_lost: 0,
            last_sequence_number: 0x46e1,
            jitter: 273,
            last_sender_report: 0x9f36432,
            delay: 150137,
        }
    }

    #[test]
    fn test_receiver_report_marshal() {
        let rr = ReceiverReport {
            ssrc: 0x902f9e2e,
            reports: vec![report_block(0xbc5e9a40)],
            profile_extensions: Bytes::new(),
        };

        let raw = rr.marshal().unwrap();
        assert_eq!(
            &raw[..],
            &[
                0x81, 0xc9, 0x00, 0x07, // v=2, p=0, count=1, RR, len=7
                0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
                0xbc, 0x5e, 0x9a, 0x40, // ssrc=0xbc5e9a40
                0x00, 0x00, 0x00, 0x00, // fracLost=0, totalLost=0
                0x00, 0x00, 0x46, 0xe1, // lastSeq=0x46e1
                0x00, 0x00, 0x01, 0x11, // jitter=273
                0x09, 0xf3, 0x64, 0x32, // lsr=0x9f36432
                0x00, 0x02, 0x4a, 0x79, // delay=150137
            ]
        );
    }

    #[test]
    fn test_receiver_report_marshal_no_reports() {
        let rr = ReceiverReport {
            ssrc: 0x902f9e2e,
            ..Default::default()
        };

        let raw = rr.marshal().unwrap();
        assert_eq!(&raw[..], &[0x80, 0xc9, 0x00, 0x01, 0x90, 0x2f, 0x9e, 0x2e]);
    }

    #[test]
    fn test_receiver_report_marshal_padded_extensions() {
        let rr = ReceiverReport {
            ssrc: 0x902f9e2e,
            reports: vec![],
            profile_extensions: Bytes::from_static(&[0x54, 0x45, 0x53, 0x54, 0x01]),
        };

        assert!(rr.header().padding);
        assert_eq!(rr.marshal_size(), 16);

        let raw = rr.marshal().unwrap();
        assert_eq!(
            &raw[..],
            &[
                0xa0, 0xc9, 0x00, 0x03, // v=2, p=1, count=0, RR, len=3
                0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
                0x54, 0x45, 0x53, 0x54, // profile extensions
                0x01, 0x00, 0x00, 0x03, // padding
            ]
        );
    }

    #[test]
    fn test_receiver_report_too_many_reports() {
        let rr = ReceiverReport {
            ssrc: 1,
            reports: (0..=COUNT_MAX as u32).map(report_block).collect(),
            ..Default::default()
        };

        assert_eq!(rr.marshal(), Err(Error::TooManyReports));
    }

    #[test]
    fn test_receiver_report_buffer_too_short() {
        let rr = ReceiverReport {
            ssrc: 1,
            reports: vec![report_block(2)],
            ..Default::default()
        };
        let mut buf = vec![0u8; rr.marshal_size() - 1];

        assert_eq!(rr.marshal_to(&mut buf), Err(Error::BufferTooShort));
    }

    #[test]
    fn test_receiver_report_destination_ssrc() {
        let rr = ReceiverReport {
            ssrc: 1,
            reports: vec![report_block(2), report_block(3)],
            ..Default::default()
        };

        assert_eq!(rr.destination_ssrc(), vec![2, 3]);
        assert_eq!(rr.header().count, 2);
        assert_eq!(rr.header().length, 13);
    }

    #[test]
    fn test_receiver_report_display() {
        let rr = ReceiverReport {
            ssrc: 1,
            reports: vec![report_block(0xbc5e9a40)],
            ..Default::default()
        };

        let s = rr.to_string();
        assert!(s.starts_with("ReceiverReport from 1\n"));
        assert!(s.contains("bc5e9a40\t0/0\t18145\t273"));
    }
}
