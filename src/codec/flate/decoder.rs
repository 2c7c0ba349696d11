use crate::{codec::Decode, util::PartialBuffer, Error, Result};

use flate2::{Decompress, FlushDecompress, Status};

#[derive(Debug)]
pub(crate) struct FlateDecoder {
    decompress: Decompress,
    zlib_header: bool,
}

impl FlateDecoder {
    pub(crate) fn new(zlib_header: bool) -> Self {
        Self {
            decompress: Decompress::new(zlib_header),
            zlib_header,
        }
    }

    fn do_decode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
        flush: FlushDecompress,
    ) -> Result<Status> {
        let prior_in = self.decompress.total_in();
        let prior_out = self.decompress.total_out();

        let status = self
            .decompress
            .decompress(input.unwritten(), output.unwritten_mut(), flush)?;

        input.advance((self.decompress.total_in() - prior_in) as usize);
        output.advance((self.decompress.total_out() - prior_out) as usize);

        Ok(status)
    }
}

impl Decode for FlateDecoder {
    fn reinit(&mut self) {
        self.decompress.reset(self.zlib_header);
    }

    fn decode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<bool> {
        match self.do_decode(input, output, FlushDecompress::None)? {
            Status::Ok | Status::BufError => Ok(false),
            Status::StreamEnd => Ok(true),
        }
    }

    fn unexpected_eof(&self) -> Error {
        Error::truncated()
    }
}
