//! Pooled zlib compression and decompression for servers with many concurrent callers.
//!
//! DEFLATE codec state is expensive to create (a sliding window plus Huffman tables), so this
//! crate keeps idle encoders and decoders in lock-free pools, one per compression level, and
//! resets them between uses. Compression for destinations that may block (sockets, files) runs
//! on a small fixed set of dispatcher threads, bounding the memory held by codec state to
//! `workers × codec size` no matter how many callers are waiting on slow peers. In-memory
//! destinations are compressed directly on the calling thread.
//!
//! All output is standard RFC 1950 zlib framing around RFC 1951 DEFLATE, and any conforming
//! zlib stream can be decompressed.
//!
//! # Levels
//!
//! Levels are plain integers, see the [`level`] constants. Any integer is accepted, values
//! outside `-2..=9` compress at [`DEFAULT_COMPRESSION`].
//!
//! # Example
//!
//! ```
//! let compressed = pooled_flate::compress_to_buffer(b"XYZ".to_vec(), b"hello", 5)?;
//! assert_eq!(&compressed[..3], b"XYZ");
//!
//! let output = pooled_flate::decompress_to_buffer(Vec::new(), &compressed[3..])?;
//! assert_eq!(output, b"hello");
//! # Ok::<(), pooled_flate::Error>(())
//! ```
//!
//! # Features
//!
//!  Feature | Does
//! ---------|------
#![cfg_attr(
    feature = "tokio",
    doc = "`tokio` | [`Engine::compress_async`] and [`Engine::decompress_async`] over [`tokio::io::AsyncWrite`](::tokio::io::AsyncWrite)"
)]
#![cfg_attr(
    not(feature = "tokio"),
    doc = "`tokio` (*inactive*) | `Engine::compress_async` and `Engine::decompress_async` over `tokio::io::AsyncWrite`"
)]
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_copy_implementations,
    missing_debug_implementations
)]

use std::io::{BufRead, Write};

mod codec;
mod dispatch;
mod engine;
mod error;
mod generic;
pub mod level;
mod pool;
mod sink;
#[cfg(feature = "tokio")]
mod tokio;
mod util;

pub use crate::{
    engine::{Config, Engine},
    error::{BufferError, Error, Result},
    level::{BEST_COMPRESSION, BEST_SPEED, DEFAULT_COMPRESSION, HUFFMAN_ONLY, NO_COMPRESSION},
    sink::{Blocking, Sink},
};

/// Compresses `payload` into `dst` using the [global engine](Engine::global).
///
/// See [`Engine::compress`].
pub fn compress<S: Sink + ?Sized>(dst: &mut S, level: i32, payload: &[u8]) -> Result<usize> {
    Engine::global().compress(dst, level, payload)
}

/// Decompresses `payload` into `dst` using the [global engine](Engine::global).
///
/// See [`Engine::decompress`].
pub fn decompress<W: Write + ?Sized>(dst: &mut W, payload: &[u8]) -> Result<usize> {
    Engine::global().decompress(dst, payload)
}

/// Decompresses the stream read from `src` into `dst` using the
/// [global engine](Engine::global).
pub fn decompress_from<W: Write + ?Sized, R: BufRead>(dst: &mut W, src: R) -> Result<usize> {
    Engine::global().decompress_from(dst, src)
}

/// Appends `src` compressed at `level` to `dst`.
///
/// ```
/// let out = pooled_flate::compress_to_buffer(Vec::new(), b"", pooled_flate::BEST_SPEED)?;
/// assert!(!out.is_empty());
/// # Ok::<(), pooled_flate::Error>(())
/// ```
pub fn compress_to_buffer(dst: Vec<u8>, src: &[u8], level: i32) -> Result<Vec<u8>, BufferError> {
    Engine::global().compress_to_buffer(dst, src, level)
}

/// Appends the decompressed contents of `src` to `dst`.
///
/// A failure hands `dst` back:
///
/// ```
/// let err = pooled_flate::decompress_to_buffer(b"kept".to_vec(), &[0x78, 0x9c, 0xff]).unwrap_err();
/// assert_eq!(err.buffer(), b"kept");
/// ```
pub fn decompress_to_buffer(dst: Vec<u8>, src: &[u8]) -> Result<Vec<u8>, BufferError> {
    Engine::global().decompress_to_buffer(dst, src)
}

const _: () = {
    util::_assert_send::<Engine>();
    util::_assert_sync::<Engine>();
};
