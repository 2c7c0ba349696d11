use std::fmt;

use miniz_oxide::deflate::{
    core::{
        compress, create_comp_flags_from_zip_params, CompressionStrategy, CompressorOxide,
        TDEFLFlush, TDEFLStatus,
    },
    CompressionLevel,
};

use crate::{codec::Encode, util::PartialBuffer, Error, Result};

/// Positive window bits ask for zlib framing.
const ZLIB_WINDOW_BITS: i32 = 15;

/// A zlib encoder that emits literals only.
pub(crate) struct HuffmanEncoder {
    compressor: CompressorOxide,
}

impl HuffmanEncoder {
    pub(crate) fn new() -> Self {
        // Greedy levels make miniz take its single-probe matching fast path, which ignores the
        // strategy, so this must stay a lazy-parsing level.
        let flags = create_comp_flags_from_zip_params(
            CompressionLevel::DefaultLevel as i32,
            ZLIB_WINDOW_BITS,
            CompressionStrategy::HuffmanOnly as i32,
        );
        Self {
            compressor: CompressorOxide::new(flags),
        }
    }

    fn do_encode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
        flush: TDEFLFlush,
    ) -> Result<TDEFLStatus> {
        let (status, consumed, produced) = compress(
            &mut self.compressor,
            input.unwritten(),
            output.unwritten_mut(),
            flush,
        );
        input.advance(consumed);
        output.advance(produced);

        match status {
            TDEFLStatus::Okay | TDEFLStatus::Done => Ok(status),
            TDEFLStatus::BadParam | TDEFLStatus::PutBufFailed => Err(Error::CodecData(format!(
                "huffman encoder failed: {status:?}"
            ))),
        }
    }
}

impl fmt::Debug for HuffmanEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuffmanEncoder").finish_non_exhaustive()
    }
}

impl Encode for HuffmanEncoder {
    fn reset(&mut self) {
        self.compressor.reset();
    }

    fn encode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<()> {
        match self.do_encode(input, output, TDEFLFlush::None)? {
            TDEFLStatus::Done => Err(Error::CodecData(
                "encoder finished before all input was written".into(),
            )),
            _ => Ok(()),
        }
    }

    fn finish(
        &mut self,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<bool> {
        let mut input = PartialBuffer::new(&[0u8; 0][..]);
        let status = self.do_encode(&mut input, output, TDEFLFlush::Finish)?;
        Ok(status == TDEFLStatus::Done)
    }
}
