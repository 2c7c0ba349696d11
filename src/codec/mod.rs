use crate::{util::PartialBuffer, Error, Result};

mod flate;
mod huffman;
mod zlib;

pub(crate) use self::flate::{FlateDecoder, FlateEncoder};
pub(crate) use self::huffman::HuffmanEncoder;
pub(crate) use self::zlib::{ZlibDecoder, ZlibEncoder};

pub(crate) trait Encode {
    /// Discard all stream state so the next `encode` starts a fresh stream.
    fn reset(&mut self);

    /// Consume as much of `input` as fits, producing into `output`.
    fn encode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<()>;

    /// Return `Ok(true)` once the stream trailer has been completely written
    fn finish(
        &mut self,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<bool>;
}

pub(crate) trait Decode {
    /// Prepare to decode a new stream.
    fn reinit(&mut self);

    /// Return `Ok(true)` once the end of the stream has been decoded
    fn decode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<bool>;

    /// The error to report when the source ends before the stream does.
    fn unexpected_eof(&self) -> Error;
}
