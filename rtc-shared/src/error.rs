use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    //Receiver stream errors
    /// Receive window does not cover a power-of-two number of sequence numbers.
    #[error("invalid receive window size {0}: entries * 64 must be a power of two in 64..=65536")]
    InvalidWindowSize(u16),

    //RTCP errors
    /// Wrong marshal size.
    #[error("Wrong marshal size: wrote {0} bytes, expected {1}")]
    WrongMarshalSize(usize, usize),
    /// Packet lost exceeds maximum amount of packets
    /// that can possibly be lost.
    #[error("Invalid total lost count")]
    InvalidTotalLost,
    /// Too many reports.
    #[error("Too many reports")]
    TooManyReports,
    /// Buffer is too short.
    #[error("Buffer too short to be written")]
    BufferTooShort,
}
