use std::{
    fmt,
    io::{BufRead, Write},
    sync::Arc,
};

use once_cell::sync::OnceCell;

use crate::{
    codec::{ZlibDecoder, ZlibEncoder},
    dispatch::{Done, Work, Workers},
    generic::{fill, Decoder, Encoder},
    level::codec,
    pool::{LevelPools, Pool, Pooled},
    BufferError, Error, Result, Sink,
};

/// Buffers that grew past this are not kept for reuse.
const MAX_RETAINED_BUFFER: usize = 1 << 20;

/// Tuning knobs for an [`Engine`].
#[derive(Clone, Debug)]
pub struct Config {
    workers: usize,
    queue_capacity: Option<usize>,
    max_idle: usize,
    chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            queue_capacity: None,
            max_idle: 64,
            chunk_size: 32 * 1024,
        }
    }
}

impl Config {
    /// Number of dispatcher threads compressing for blocking destinations.
    ///
    /// With `0` workers every job runs on the calling thread.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Number of jobs that may wait for a worker before submitters block, defaults to 64 per
    /// worker.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity.max(1));
        self
    }

    /// Idle codec objects kept per pool slot.
    pub fn max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle.max(1);
        self
    }

    /// Size of the output chunk buffer owned by each codec object.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(64);
        self
    }

    fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| self.workers.max(1).saturating_mul(64))
    }
}

/// The state shared between callers and dispatcher workers.
#[derive(Debug)]
pub(crate) struct Pools {
    encoders: LevelPools<Encoder<ZlibEncoder>>,
    decoders: Pool<Decoder<ZlibDecoder>>,
    buffers: Pool<Vec<u8>>,
    chunk_size: usize,
}

impl Pools {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            encoders: LevelPools::new(config.max_idle),
            decoders: Pool::new(config.max_idle),
            buffers: Pool::new(config.max_idle),
            chunk_size: config.chunk_size,
        }
    }

    fn encoder(&self, level: i32) -> Pooled<'_, Encoder<ZlibEncoder>> {
        self.encoders.slot(level).acquire(
            || Encoder::new(ZlibEncoder::new(codec(level)), self.chunk_size),
            Encoder::reset,
        )
    }

    pub(crate) fn decoder(&self) -> Pooled<'_, Decoder<ZlibDecoder>> {
        self.decoders.acquire(
            || Decoder::new(ZlibDecoder::new(), self.chunk_size),
            Decoder::reinit,
        )
    }

    fn buffer(&self) -> Vec<u8> {
        let mut buffer = self.buffers.take().unwrap_or_default();
        buffer.clear();
        buffer
    }

    fn recycle(&self, buffer: Vec<u8>) {
        if buffer.capacity() <= MAX_RETAINED_BUFFER {
            self.buffers.release(buffer);
        }
    }

    /// Run the codec on the current thread, writing straight into `dst`.
    pub(crate) fn compress<W: Write + ?Sized>(
        &self,
        dst: &mut W,
        level: i32,
        payload: &[u8],
    ) -> Result<()> {
        let mut encoder = self.encoder(level);
        let written = encoder.write(dst, payload);
        // Always finish so the pooled state is consistent, but report the first error.
        let finished = encoder.finish(dst);
        written.and(finished)
    }

    pub(crate) fn work(&self, level: i32, payload: &[u8]) -> Work {
        let mut buffer = self.buffer();
        buffer.extend_from_slice(payload);
        Work {
            level,
            payload: buffer,
            output: self.buffer(),
        }
    }

    pub(crate) fn run(&self, mut work: Work) -> Done {
        let result = self.compress(&mut work.output, work.level, &work.payload);
        Done { work, result }
    }

    pub(crate) fn recycle_work(&self, work: Work) {
        self.recycle(work.payload);
        self.recycle(work.output);
    }
}

/// A compression engine: codec pools plus the dispatcher threads.
///
/// Most users want the process-wide [`Engine::global`], which the crate-level functions use.
/// Separate engines are useful to isolate pools or size the dispatcher differently; dropping
/// one stops its workers once their queue is drained.
pub struct Engine {
    pub(crate) pools: Arc<Pools>,
    pub(crate) workers: Workers,
    config: Config,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an engine, spawning its dispatcher threads immediately.
    pub fn with_config(config: Config) -> Self {
        let pools = Arc::new(Pools::new(&config));
        let workers = Workers::spawn(&pools, config.workers, config.effective_queue_capacity());
        Self {
            pools,
            workers,
            config,
        }
    }

    /// The process-wide engine, created on first use and never torn down.
    pub fn global() -> &'static Engine {
        static GLOBAL: OnceCell<Engine> = OnceCell::new();
        GLOBAL.get_or_init(|| {
            log::debug!("initializing global compression engine");
            Engine::new()
        })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of dispatcher threads actually running.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Writes `payload` compressed at `level` to `dst` as one complete zlib stream.
    ///
    /// Returns the number of *uncompressed* bytes consumed, always `payload.len()` on success.
    /// For a [`Sink`] that may block, compression happens on a dispatcher thread and this call
    /// waits for it before writing the result to `dst`.
    pub fn compress<S: Sink + ?Sized>(
        &self,
        dst: &mut S,
        level: i32,
        payload: &[u8],
    ) -> Result<usize> {
        if S::NON_BLOCKING {
            self.pools.compress(dst, level, payload)?;
        } else {
            self.compress_offloaded(dst, level, payload)?;
        }
        Ok(payload.len())
    }

    fn compress_offloaded<W: Write + ?Sized>(
        &self,
        dst: &mut W,
        level: i32,
        payload: &[u8],
    ) -> Result<()> {
        let Done { work, result } = self.workers.run(self.pools.work(level, payload))?;

        let written =
            result.and_then(|()| dst.write_all(&work.output).map_err(Error::DestinationWrite));
        self.pools.recycle_work(work);
        written
    }

    /// Writes the decompressed contents of the zlib stream `payload` to `dst`.
    ///
    /// Returns the number of decompressed bytes written. An empty `payload` is a no-op. Bytes
    /// following the end of the stream are ignored.
    pub fn decompress<W: Write + ?Sized>(&self, dst: &mut W, payload: &[u8]) -> Result<usize> {
        self.decompress_from(dst, payload)
    }

    /// Like [`decompress`](Self::decompress), reading the compressed stream from `src`.
    ///
    /// A source that is empty from the start is a no-op.
    pub fn decompress_from<W, R>(&self, dst: &mut W, mut src: R) -> Result<usize>
    where
        W: Write + ?Sized,
        R: BufRead,
    {
        if fill(&mut src)? {
            return Ok(0);
        }

        let mut decoder = self.pools.decoder();
        let total = decoder.copy(&mut src, dst)?;
        usize::try_from(total).map_err(|_| Error::SizeOverflow(total))
    }

    /// Appends `src` compressed at `level` to `dst` and returns the extended buffer.
    ///
    /// On failure `dst` comes back inside the [`BufferError`].
    pub fn compress_to_buffer(
        &self,
        mut dst: Vec<u8>,
        src: &[u8],
        level: i32,
    ) -> Result<Vec<u8>, BufferError> {
        match self.compress(&mut dst, level, src) {
            Ok(_) => Ok(dst),
            Err(error) => Err(BufferError::new(dst, error)),
        }
    }

    /// Appends the decompressed contents of `src` to `dst` and returns the extended buffer.
    ///
    /// On failure `dst` comes back inside the [`BufferError`], holding its original contents
    /// followed by whatever was decoded before the error.
    pub fn decompress_to_buffer(&self, mut dst: Vec<u8>, src: &[u8]) -> Result<Vec<u8>, BufferError> {
        match self.decompress(&mut dst, src) {
            Ok(_) => Ok(dst),
            Err(error) => Err(BufferError::new(dst, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Engine};
    use crate::{level, Blocking, Error};
    use std::io::{self, Write};

    fn engine() -> Engine {
        Engine::with_config(Config::default().workers(2).max_idle(4))
    }

    fn round_trip(engine: &Engine, compressed: &[u8]) -> Vec<u8> {
        engine.decompress_to_buffer(Vec::new(), compressed).unwrap()
    }

    #[test]
    fn slot_is_reused_and_reset() {
        let engine = engine();
        let fresh = Engine::with_config(Config::default().workers(0));

        let a = engine.compress_to_buffer(Vec::new(), b"A", 5).unwrap();
        assert_eq!(engine.pools.encoders.slot(5).idle(), 1);
        let b = engine.compress_to_buffer(Vec::new(), b"B", 5).unwrap();
        assert_eq!(engine.pools.encoders.slot(5).idle(), 1);

        assert_eq!(round_trip(&engine, &a), b"A");
        assert_eq!(round_trip(&engine, &b), b"B");
        assert_eq!(b, fresh.compress_to_buffer(Vec::new(), b"B", 5).unwrap());
    }

    #[test]
    fn levels_use_their_own_slot() {
        let engine = engine();
        engine.compress_to_buffer(Vec::new(), b"x", level::BEST_SPEED).unwrap();

        assert_eq!(engine.pools.encoders.slot(level::BEST_SPEED).idle(), 1);
        assert_eq!(engine.pools.encoders.slot(level::BEST_COMPRESSION).idle(), 0);
    }

    #[test]
    fn reader_is_reused_after_error() {
        let engine = engine();
        let good = engine.compress_to_buffer(Vec::new(), b"payload", 6).unwrap();

        let err = engine
            .decompress_to_buffer(b"kept".to_vec(), &good[..good.len() - 2])
            .unwrap_err();
        assert!(matches!(err.error(), Error::CodecData(_)), "{err:?}");
        assert!(err.buffer().starts_with(b"kept"));
        assert_eq!(engine.pools.decoders.idle(), 1);

        assert_eq!(round_trip(&engine, &good), b"payload");
    }

    #[test]
    fn offloaded_buffers_return_to_pool() {
        let engine = engine();
        let mut dst = Blocking(Vec::new());
        engine.compress(&mut dst, 3, b"buffered").unwrap();

        assert_eq!(engine.pools.buffers.idle(), 2);
        assert_eq!(round_trip(&engine, &dst.0), b"buffered");
    }

    #[test]
    fn without_workers_offload_runs_inline() {
        let engine = Engine::with_config(Config::default().workers(0));
        assert_eq!(engine.worker_count(), 0);

        let mut dst = Blocking(Vec::new());
        assert_eq!(engine.compress(&mut dst, 9, b"inline").unwrap(), 6);
        assert_eq!(round_trip(&engine, &dst.0), b"inline");
    }

    struct Failing;

    impl Write for Failing {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl crate::Sink for Failing {
        const NON_BLOCKING: bool = true;
    }

    #[test]
    fn write_error_keeps_pool_usable() {
        let engine = engine();

        let result = engine.compress(&mut Failing, 4, b"lost");
        assert!(matches!(result, Err(Error::DestinationWrite(_))), "{result:?}");

        let ok = engine.compress_to_buffer(Vec::new(), b"kept", 4).unwrap();
        assert_eq!(round_trip(&engine, &ok), b"kept");
    }

    #[test]
    fn drop_joins_workers() {
        let engine = engine();
        assert_eq!(engine.worker_count(), 2);
        drop(engine);
    }
}
