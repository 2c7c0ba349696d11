use std::{fmt, io};

/// Result type returned by every engine operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while compressing or decompressing.
///
/// A returned error always means the destination may hold partial output that should not be
/// trusted.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The compressed source does not start with a valid zlib header, or pooled codec state
    /// could not be reconfigured.
    #[error("invalid zlib stream header: {0}")]
    CodecInit(&'static str),

    /// The compressed stream is truncated or corrupt, or the codec failed internally.
    #[error("corrupt deflate stream: {0}")]
    CodecData(String),

    /// Writing to the destination failed.
    #[error("failed to write to destination")]
    DestinationWrite(#[source] io::Error),

    /// Reading the compressed source failed.
    #[error("failed to read compressed source")]
    SourceRead(#[source] io::Error),

    /// The number of decompressed bytes does not fit in a `usize`.
    #[error("too much data inflated: {0} bytes")]
    SizeOverflow(u64),

    /// A dispatcher worker exited without completing the submitted job.
    #[error("compression worker exited before completing the job")]
    WorkerGone,
}

/// The error returned by the buffer API, handing the destination buffer back.
///
/// The buffer holds its original contents followed by any output appended before the failure.
#[derive(thiserror::Error)]
#[error("{error}")]
pub struct BufferError {
    buffer: Vec<u8>,
    error: Error,
}

impl BufferError {
    pub(crate) fn new(buffer: Vec<u8>, error: Error) -> Self {
        Self { buffer, error }
    }

    /// The error that stopped the operation.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// The destination buffer as it was when the error occurred.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the destination buffer, discarding the error.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// Splits into the destination buffer and the error.
    pub fn into_parts(self) -> (Vec<u8>, Error) {
        (self.buffer, self.error)
    }
}

impl fmt::Debug for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferError")
            .field("buffer_len", &self.buffer.len())
            .field("error", &self.error)
            .finish()
    }
}

impl From<BufferError> for Error {
    fn from(err: BufferError) -> Self {
        err.error
    }
}

impl From<BufferError> for io::Error {
    fn from(err: BufferError) -> Self {
        err.error.into()
    }
}

impl Error {
    pub(crate) fn truncated() -> Self {
        Error::CodecData("unexpected end of compressed stream".into())
    }
}

impl From<flate2::DecompressError> for Error {
    fn from(err: flate2::DecompressError) -> Self {
        if err.needs_dictionary().is_some() {
            Error::CodecInit("preset dictionary is not supported")
        } else {
            Error::CodecData(err.to_string())
        }
    }
}

impl From<flate2::CompressError> for Error {
    fn from(err: flate2::CompressError) -> Self {
        Error::CodecData(err.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::DestinationWrite(err) | Error::SourceRead(err) => err,
            Error::WorkerGone => io::Error::new(io::ErrorKind::BrokenPipe, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
