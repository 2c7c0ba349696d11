//! Compression levels and their mapping onto pool slots.
//!
//! Levels are plain `i32`s so that callers can pass through whatever their configuration
//! carries. Every integer is accepted: values outside `-2..=9` are treated as
//! [`DEFAULT_COMPRESSION`].

/// Huffman coding only, no LZ77 matching.
///
/// Fast and useful for data without repeated sequences; highly repetitive input compresses far
/// worse than at [`BEST_SPEED`].
pub const HUFFMAN_ONLY: i32 = -2;
/// Let the engine choose, currently level 6.
pub const DEFAULT_COMPRESSION: i32 = -1;
/// Store the input without compressing it.
pub const NO_COMPRESSION: i32 = 0;
/// Fastest compression, usually the biggest output.
pub const BEST_SPEED: i32 = 1;
/// Slowest compression, usually the smallest output.
pub const BEST_COMPRESSION: i32 = 9;

/// The level [`DEFAULT_COMPRESSION`] and out-of-range levels resolve to.
pub(crate) const ENGINE_DEFAULT: i32 = 6;

/// Number of pool slots, one per level in `-2..=9`.
pub(crate) const SLOTS: usize = 12;

/// Resolves a caller supplied level to one of `-2..=9`.
fn coerce(level: i32) -> i32 {
    match level {
        DEFAULT_COMPRESSION => ENGINE_DEFAULT,
        HUFFMAN_ONLY..=BEST_COMPRESSION => level,
        _ => ENGINE_DEFAULT,
    }
}

/// Maps any level onto a pool slot in `0..SLOTS`.
///
/// Levels that produce the same codec configuration share a slot, so the default level, level
/// 6 and every out-of-range level all land in the same one.
pub(crate) fn normalize(level: i32) -> usize {
    (coerce(level) - HUFFMAN_ONLY) as usize
}

/// How a level is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Codec {
    /// Literals only, through `miniz_oxide`'s Huffman-only strategy.
    HuffmanOnly,
    Flate(flate2::Compression),
}

/// The codec configuration used for a level.
pub(crate) fn codec(level: i32) -> Codec {
    match coerce(level) {
        HUFFMAN_ONLY => Codec::HuffmanOnly,
        level => Codec::Flate(flate2::Compression::new(level as u32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_cover_documented_range() {
        let slots: Vec<usize> = (HUFFMAN_ONLY..=BEST_COMPRESSION)
            .filter(|&level| level != DEFAULT_COMPRESSION)
            .map(normalize)
            .collect();

        assert_eq!(slots, vec![0, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert!(slots.iter().all(|&slot| slot < SLOTS));
    }

    #[test]
    fn out_of_range_levels_use_default_slot() {
        for level in [i32::MIN, -100, -3, 10, 11, 42, i32::MAX] {
            assert_eq!(normalize(level), normalize(DEFAULT_COMPRESSION), "level {level}");
        }
        assert_eq!(normalize(DEFAULT_COMPRESSION), normalize(ENGINE_DEFAULT));
    }

    #[test]
    fn codec_per_level() {
        use flate2::Compression;

        assert_eq!(codec(NO_COMPRESSION), Codec::Flate(Compression::none()));
        assert_eq!(codec(BEST_SPEED), Codec::Flate(Compression::fast()));
        assert_eq!(codec(BEST_COMPRESSION), Codec::Flate(Compression::best()));
        assert_eq!(codec(DEFAULT_COMPRESSION), Codec::Flate(Compression::default()));
        assert_eq!(codec(HUFFMAN_ONLY), Codec::HuffmanOnly);
        assert_eq!(codec(1000), Codec::Flate(Compression::default()));
    }
}
