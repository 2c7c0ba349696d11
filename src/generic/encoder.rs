use std::io::Write;

use crate::{codec::Encode, util::PartialBuffer, Error, Result};

/// A pooled codec writer.
///
/// Compressed output is produced into `buffer` one chunk at a time and written straight to the
/// destination, so a stream of any size only ever needs this one allocation.
#[derive(Debug)]
pub(crate) struct Encoder<E> {
    encoder: E,
    buffer: Box<[u8]>,
}

impl<E: Encode> Encoder<E> {
    pub(crate) fn new(encoder: E, chunk_size: usize) -> Self {
        Self {
            encoder,
            buffer: vec![0; chunk_size].into_boxed_slice(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.encoder.reset();
    }

    pub(crate) fn write<W: Write + ?Sized>(&mut self, dst: &mut W, payload: &[u8]) -> Result<()> {
        let mut input = PartialBuffer::new(payload);

        while !input.unwritten().is_empty() {
            let consumed = input.written().len();
            let mut output = PartialBuffer::new(&mut self.buffer[..]);
            self.encoder.encode(&mut input, &mut output)?;

            let produced = output.written();
            if produced.is_empty() && input.written().len() == consumed {
                return Err(Error::CodecData("encoder made no progress".into()));
            }
            dst.write_all(produced).map_err(Error::DestinationWrite)?;
        }

        Ok(())
    }

    /// Write the end of the stream, including everything the codec still buffers.
    pub(crate) fn finish<W: Write + ?Sized>(&mut self, dst: &mut W) -> Result<()> {
        loop {
            let mut output = PartialBuffer::new(&mut self.buffer[..]);
            let done = self.encoder.finish(&mut output)?;

            let produced = output.written();
            dst.write_all(produced).map_err(Error::DestinationWrite)?;
            if done {
                return Ok(());
            }
            if produced.is_empty() {
                return Err(Error::CodecData("encoder made no progress".into()));
            }
        }
    }
}
