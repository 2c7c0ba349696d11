#![allow(dead_code)] // Different tests use a different subset of functions

use std::io::{self, BufRead, Read, Write};

use pooled_flate::{Config, Engine};

/// `"hello"`, as compressed by a reference zlib at the default level with a sync flush.
pub const HELLO: &[u8] = &[
    0x78, 0x9c, 0xca, 0x48, 0xcd, 0xc9, 0xc9, 0x07, 0x04, 0x00, 0x00, 0xff, 0xff, 0x06, 0x2c,
    0x02, 0x15,
];

/// An empty payload, compressed the same way.
pub const EMPTY: &[u8] = &[
    0x78, 0x9c, 0x01, 0x00, 0x00, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

pub fn engine(workers: usize) -> Engine {
    Engine::with_config(Config::default().workers(workers).max_idle(8))
}

pub mod sync {
    use super::*;
    use flate2::{bufread, write, Compression};

    pub fn compress(bytes: &[u8], level: u32) -> Vec<u8> {
        let mut encoder = write::ZlibEncoder::new(Vec::new(), Compression::new(level));
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    pub fn decompress(bytes: &[u8]) -> Vec<u8> {
        let mut output = Vec::new();
        bufread::ZlibDecoder::new(bytes)
            .read_to_end(&mut output)
            .unwrap();
        output
    }
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|_| rand::random()).collect()
}

/// Text-like input that actually compresses.
pub fn repetitive_bytes(len: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// A writer that accepts at most `limit` bytes per call, exercising partial writes.
pub struct Trickle {
    pub inner: Vec<u8>,
    pub limit: usize,
}

impl Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(self.limit);
        self.inner.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A source whose first `fill_buf` after every `consume` is interrupted.
pub struct Interrupting<R> {
    pub inner: R,
    pending: bool,
}

impl<R> Interrupting<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: true,
        }
    }
}

impl<R: BufRead> Read for Interrupting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.fill_buf()?.read(buf)?;
        self.consume(len);
        Ok(len)
    }
}

impl<R: BufRead> BufRead for Interrupting<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pending {
            self.pending = false;
            return Err(io::ErrorKind::Interrupted.into());
        }
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.pending = true;
        self.inner.consume(amt);
    }
}
