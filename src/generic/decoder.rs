use std::io::{BufRead, ErrorKind, Write};

use crate::{codec::Decode, util::PartialBuffer, Error, Result};

/// The outcome of decoding one chunk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    /// Bytes now available through [`Decoder::output`].
    pub(crate) produced: usize,
    /// The end of the stream has been reached.
    pub(crate) done: bool,
}

/// Fill the buffer of `src`, retrying interrupted reads. Returns `true` at the end of the source.
pub(crate) fn fill<R: BufRead + ?Sized>(src: &mut R) -> Result<bool> {
    loop {
        match src.fill_buf() {
            Ok(buf) => return Ok(buf.is_empty()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::SourceRead(err)),
        }
    }
}

/// A pooled codec reader.
#[derive(Debug)]
pub(crate) struct Decoder<D> {
    decoder: D,
    buffer: Box<[u8]>,
}

impl<D: Decode> Decoder<D> {
    pub(crate) fn new(decoder: D, chunk_size: usize) -> Self {
        Self {
            decoder,
            buffer: vec![0; chunk_size].into_boxed_slice(),
        }
    }

    pub(crate) fn reinit(&mut self) {
        self.decoder.reinit();
    }

    /// Decode at most one chunk of output from `src`.
    pub(crate) fn step<R: BufRead + ?Sized>(&mut self, src: &mut R) -> Result<Step> {
        // After `fill` the second `fill_buf` only returns what is already buffered.
        let input = if fill(src)? {
            &[][..]
        } else {
            src.fill_buf().map_err(Error::SourceRead)?
        };

        let mut input = PartialBuffer::new(input);
        let mut output = PartialBuffer::new(&mut self.buffer[..]);
        let done = self.decoder.decode(&mut input, &mut output)?;

        let consumed = input.written().len();
        let produced = output.written().len();
        src.consume(consumed);

        if !done && consumed == 0 && produced == 0 {
            return Err(self.decoder.unexpected_eof());
        }

        Ok(Step { produced, done })
    }

    /// The chunk produced by the last [`step`](Self::step).
    pub(crate) fn output(&self, step: Step) -> &[u8] {
        &self.buffer[..step.produced]
    }

    /// Decode all of `src` into `dst`, returning the number of bytes written.
    pub(crate) fn copy<R, W>(&mut self, src: &mut R, dst: &mut W) -> Result<u64>
    where
        R: BufRead + ?Sized,
        W: Write + ?Sized,
    {
        let mut total = 0u64;
        loop {
            let step = self.step(src)?;
            dst.write_all(self.output(step))
                .map_err(Error::DestinationWrite)?;
            total += step.produced as u64;
            if step.done {
                return Ok(total);
            }
        }
    }
}
