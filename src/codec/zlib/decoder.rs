use crate::{
    codec::{Decode, FlateDecoder},
    util::PartialBuffer,
    Error, Result,
};

/// Compression method 8 is DEFLATE, the only one RFC 1950 defines.
const CM_DEFLATE: u8 = 8;
/// The largest window RFC 1950 allows is 2^(7 + 8) bytes.
const MAX_CINFO: u8 = 7;
const FDICT: u8 = 0x20;

#[derive(Debug)]
enum State {
    /// Collecting the two header bytes.
    Header(PartialBuffer<[u8; 2]>),
    /// Header validated, feeding it to the inflater.
    Replay(PartialBuffer<[u8; 2]>),
    Body,
    Done,
}

/// Inflates a zlib stream, rejecting bad headers before any body byte is decoded.
#[derive(Debug)]
pub(crate) struct ZlibDecoder {
    inner: FlateDecoder,
    state: State,
}

impl ZlibDecoder {
    pub(crate) fn new() -> Self {
        Self {
            inner: FlateDecoder::new(true),
            state: State::Header(PartialBuffer::new([0; 2])),
        }
    }
}

fn check_header([cmf, flg]: [u8; 2]) -> Result<()> {
    if cmf & 0x0f != CM_DEFLATE {
        return Err(Error::CodecInit("unsupported compression method"));
    }
    if cmf >> 4 > MAX_CINFO {
        return Err(Error::CodecInit("window size too large"));
    }
    if (u16::from(cmf) << 8 | u16::from(flg)) % 31 != 0 {
        return Err(Error::CodecInit("header check bits mismatch"));
    }
    if flg & FDICT != 0 {
        return Err(Error::CodecInit("preset dictionary is not supported"));
    }
    Ok(())
}

impl Decode for ZlibDecoder {
    fn reinit(&mut self) {
        self.inner.reinit();
        self.state = State::Header(PartialBuffer::new([0; 2]));
    }

    fn decode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<bool> {
        loop {
            match &mut self.state {
                State::Header(header) => {
                    header.copy_unwritten_from(input);
                    if !header.unwritten().is_empty() {
                        return Ok(false);
                    }
                    let bytes = [header.written()[0], header.written()[1]];
                    check_header(bytes)?;
                    self.state = State::Replay(PartialBuffer::new(bytes));
                }

                State::Replay(header) => {
                    self.inner.decode(header, output)?;
                    if !header.unwritten().is_empty() {
                        return Ok(false);
                    }
                    self.state = State::Body;
                }

                State::Body => {
                    let done = self.inner.decode(input, output)?;
                    if done {
                        self.state = State::Done;
                    }
                    return Ok(done);
                }

                State::Done => return Ok(true),
            }
        }
    }

    fn unexpected_eof(&self) -> Error {
        match self.state {
            State::Header(_) => Error::CodecInit("stream ends inside the header"),
            _ => self.inner.unexpected_eof(),
        }
    }
}
