//! Codec writers and readers: a codec plus the fixed chunk buffer it produces into.

mod decoder;
mod encoder;

pub(crate) use self::{
    decoder::{fill, Decoder},
    encoder::Encoder,
};
