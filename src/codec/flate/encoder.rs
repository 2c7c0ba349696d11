use crate::{codec::Encode, util::PartialBuffer, Result};

use flate2::{Compress, Compression, FlushCompress, Status};

#[derive(Debug)]
pub(crate) struct FlateEncoder {
    compress: Compress,
}

impl FlateEncoder {
    pub(crate) fn new(level: Compression, zlib_header: bool) -> Self {
        Self {
            compress: Compress::new(level, zlib_header),
        }
    }

    fn do_encode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
        flush: FlushCompress,
    ) -> Result<Status> {
        let prior_in = self.compress.total_in();
        let prior_out = self.compress.total_out();

        let status = self
            .compress
            .compress(input.unwritten(), output.unwritten_mut(), flush)?;

        input.advance((self.compress.total_in() - prior_in) as usize);
        output.advance((self.compress.total_out() - prior_out) as usize);

        Ok(status)
    }
}

impl Encode for FlateEncoder {
    fn reset(&mut self) {
        self.compress.reset();
    }

    fn encode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<()> {
        // `BufError` only signals that no progress was possible, the caller retries with a
        // drained output buffer.
        match self.do_encode(input, output, FlushCompress::None)? {
            Status::Ok | Status::BufError => Ok(()),
            Status::StreamEnd => Err(crate::Error::CodecData(
                "encoder finished before all input was written".into(),
            )),
        }
    }

    fn finish(
        &mut self,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<bool> {
        let mut input = PartialBuffer::new(&[0u8; 0][..]);
        match self.do_encode(&mut input, output, FlushCompress::Finish)? {
            Status::Ok | Status::BufError => Ok(false),
            Status::StreamEnd => Ok(true),
        }
    }
}
