mod decoder;
mod encoder;

pub(crate) use self::{decoder::ZlibDecoder, encoder::ZlibEncoder};
