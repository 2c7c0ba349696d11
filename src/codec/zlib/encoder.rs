use crate::{
    codec::{Encode, FlateEncoder, HuffmanEncoder},
    level::Codec,
    util::PartialBuffer,
    Result,
};

#[derive(Debug)]
enum Backend {
    Flate(FlateEncoder),
    Huffman(HuffmanEncoder),
}

#[derive(Debug)]
pub(crate) struct ZlibEncoder {
    backend: Backend,
}

impl ZlibEncoder {
    pub(crate) fn new(codec: Codec) -> Self {
        let backend = match codec {
            Codec::Flate(level) => Backend::Flate(FlateEncoder::new(level, true)),
            Codec::HuffmanOnly => Backend::Huffman(HuffmanEncoder::new()),
        };
        Self { backend }
    }
}

impl Encode for ZlibEncoder {
    fn reset(&mut self) {
        match &mut self.backend {
            Backend::Flate(inner) => inner.reset(),
            Backend::Huffman(inner) => inner.reset(),
        }
    }

    fn encode(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<()> {
        match &mut self.backend {
            Backend::Flate(inner) => inner.encode(input, output),
            Backend::Huffman(inner) => inner.encode(input, output),
        }
    }

    fn finish(
        &mut self,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
    ) -> Result<bool> {
        match &mut self.backend {
            Backend::Flate(inner) => inner.finish(output),
            Backend::Huffman(inner) => inner.finish(output),
        }
    }
}
