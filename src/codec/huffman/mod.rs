mod encoder;

pub(crate) use self::encoder::HuffmanEncoder;
