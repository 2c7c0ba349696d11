//! Classification of compression destinations.

use std::{
    fs::File,
    io::{self, BufWriter, Cursor, LineWriter, Write},
    net::TcpStream,
    process::ChildStdin,
};

/// A destination for compressed output.
///
/// Whether a destination can block is a property of its type: in-memory buffers never wait, so
/// the codec runs directly on the calling thread. Anything that may wait on the outside world
/// (sockets, files, pipes) keeps the default, and the codec runs on a dispatcher worker while
/// the caller only performs the final write.
///
/// To compress into a writer type that does not implement this trait, wrap it in [`Blocking`].
pub trait Sink: Write {
    /// `true` if writes never wait on anything but memory.
    const NON_BLOCKING: bool = false;
}

macro_rules! non_blocking {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sink for $ty {
                const NON_BLOCKING: bool = true;
            }
        )*
    };
}

non_blocking! {
    Vec<u8>,
    Cursor<Vec<u8>>,
    Cursor<&mut Vec<u8>>,
    Cursor<&mut [u8]>,
    Cursor<Box<[u8]>>,
    io::Sink,
}

impl Sink for File {}
impl Sink for TcpStream {}
impl Sink for ChildStdin {}
impl Sink for io::Stdout {}
impl Sink for io::StdoutLock<'_> {}
impl Sink for io::Stderr {}
impl Sink for io::StderrLock<'_> {}
#[cfg(unix)]
impl Sink for std::os::unix::net::UnixStream {}
impl<W: Write> Sink for BufWriter<W> {}
impl<W: Write> Sink for LineWriter<W> {}

impl<S: Sink + ?Sized> Sink for &mut S {
    const NON_BLOCKING: bool = S::NON_BLOCKING;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    const NON_BLOCKING: bool = S::NON_BLOCKING;
}

/// Marks any [`Write`] as a potentially blocking [`Sink`].
#[derive(Debug, Default)]
pub struct Blocking<W>(pub W);

impl<W> Blocking<W> {
    /// Acquires a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.0
    }

    /// Acquires a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.0
    }

    /// Consumes this wrapper returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> Write for Blocking<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[io::IoSlice<'_>]) -> io::Result<usize> {
        self.0.write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> Sink for Blocking<W> {}
