//! Adapters writing to [`tokio::io::AsyncWrite`](::tokio::io::AsyncWrite) destinations.
//!
//! An async destination is always treated as one that may block: compression is handed to the
//! dispatcher workers and the task awaits a queue slot and then the result instead of parking
//! its thread.

use ::tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{dispatch::Done, Engine, Error, Result};

impl Engine {
    /// Writes `payload` compressed at `level` to `dst` as one complete zlib stream.
    ///
    /// The asynchronous counterpart of [`Engine::compress`], returning `payload.len()` on
    /// success.
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub async fn compress_async<W>(&self, dst: &mut W, level: i32, payload: &[u8]) -> Result<usize>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let Done { work, result } = self.workers.run_async(self.pools.work(level, payload)).await?;

        let written = match result {
            Ok(()) => dst
                .write_all(&work.output)
                .await
                .map_err(Error::DestinationWrite),
            Err(err) => Err(err),
        };
        self.pools.recycle_work(work);
        written.map(|()| payload.len())
    }

    /// Writes the decompressed contents of the zlib stream `payload` to `dst`.
    ///
    /// The asynchronous counterpart of [`Engine::decompress`]. Decoding happens on the calling
    /// task one chunk at a time, between writes.
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub async fn decompress_async<W>(&self, dst: &mut W, payload: &[u8]) -> Result<usize>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        if payload.is_empty() {
            return Ok(0);
        }

        let mut src = payload;
        let mut decoder = self.pools.decoder();
        let mut total = 0u64;
        loop {
            let step = decoder.step(&mut src)?;
            dst.write_all(decoder.output(step))
                .await
                .map_err(Error::DestinationWrite)?;
            total += step.produced as u64;
            if step.done {
                return usize::try_from(total).map_err(|_| Error::SizeOverflow(total));
            }
        }
    }
}
