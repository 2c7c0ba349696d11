//! Background compression workers for destinations that may block.
//!
//! A job carries its payload and an output buffer, both taken from the engine's buffer pool.
//! The worker runs the codec into the output buffer and hands the job back through the reply
//! channel, so the codec's working set only ever lives on one of a fixed number of threads.
//!
//! Blocking callers queue on a bounded channel and park their thread while it is full. Async
//! callers have a lane of their own whose slots are handed out by a fair semaphore, so a task
//! waiting for room is parked in FIFO order instead of polling the queue.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, SendError, Sender};

use crate::{engine::Pools, Error, Result};

/// A compression job.
#[derive(Debug)]
pub(crate) struct Work {
    pub(crate) level: i32,
    pub(crate) payload: Vec<u8>,
    pub(crate) output: Vec<u8>,
}

/// A finished job, returned to the submitter together with its buffers.
#[derive(Debug)]
pub(crate) struct Done {
    pub(crate) work: Work,
    pub(crate) result: Result<()>,
}

/// How a worker signals completion.
#[derive(Debug)]
enum Reply {
    Blocking(Sender<Done>),
    #[cfg(feature = "tokio")]
    Async(::tokio::sync::oneshot::Sender<Done>),
}

impl Reply {
    fn send(self, done: Done) {
        // The submitter may have gone away (a dropped future), the result is simply discarded.
        match self {
            Reply::Blocking(reply) => {
                let _ = reply.send(done);
            }
            #[cfg(feature = "tokio")]
            Reply::Async(reply) => {
                let _ = reply.send(done);
            }
        }
    }
}

#[derive(Debug)]
struct Job {
    work: Work,
    reply: Reply,
    /// The async lane slot this job occupies, freed as soon as a worker picks the job up.
    #[cfg(feature = "tokio")]
    slot: Option<::tokio::sync::OwnedSemaphorePermit>,
}

impl Job {
    fn new(work: Work, reply: Reply) -> Self {
        Self {
            work,
            reply,
            #[cfg(feature = "tokio")]
            slot: None,
        }
    }
}

/// The receiving ends shared by every worker.
#[derive(Debug)]
struct Queues {
    blocking: Receiver<Job>,
    #[cfg(feature = "tokio")]
    lane: Receiver<Job>,
}

#[cfg(feature = "tokio")]
#[derive(Debug)]
struct Lane {
    jobs: Sender<Job>,
    slots: Arc<::tokio::sync::Semaphore>,
}

/// A fixed set of persistent worker threads fed through bounded queues.
///
/// Without any running worker every job runs on the submitting thread.
#[derive(Debug)]
pub(crate) struct Workers {
    pools: Arc<Pools>,
    jobs: Option<Sender<Job>>,
    #[cfg(feature = "tokio")]
    lane: Option<Lane>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl Workers {
    pub(crate) fn spawn(pools: &Arc<Pools>, count: usize, queue_capacity: usize) -> Self {
        let queue_capacity = queue_capacity.max(1);
        let (mut workers, queues) = Self::detached(pools, queue_capacity);
        let queues = Arc::new(queues);

        for id in 0..count {
            let pools = Arc::clone(pools);
            let queues = Arc::clone(&queues);
            let spawned = thread::Builder::new()
                .name(format!("pooled-flate-{id}"))
                .spawn(move || work_loop(&pools, &queues));
            match spawned {
                Ok(handle) => workers.handles.push(handle),
                Err(err) => {
                    log::warn!("failed to spawn compression worker {}: {}", id, err);
                    break;
                }
            }
        }

        if workers.handles.is_empty() {
            if count > 0 {
                log::warn!("no compression workers running, compressing on calling threads");
            }
            workers.close();
            return workers;
        }

        log::debug!(
            "spawned {} compression workers, queue capacity {}",
            workers.handles.len(),
            queue_capacity
        );
        workers
    }

    /// Open queues without any thread serving them.
    fn detached(pools: &Arc<Pools>, queue_capacity: usize) -> (Self, Queues) {
        let (jobs, blocking) = crossbeam_channel::bounded(queue_capacity);
        #[cfg(feature = "tokio")]
        let (lane, lane_queue) = {
            // The semaphore bounds this lane, the channel itself never fills up.
            let (jobs, queue) = crossbeam_channel::unbounded();
            let slots = Arc::new(::tokio::sync::Semaphore::new(queue_capacity));
            (Lane { jobs, slots }, queue)
        };

        let workers = Self {
            pools: Arc::clone(pools),
            jobs: Some(jobs),
            #[cfg(feature = "tokio")]
            lane: Some(lane),
            handles: Vec::new(),
        };
        let queues = Queues {
            blocking,
            #[cfg(feature = "tokio")]
            lane: lane_queue,
        };
        (workers, queues)
    }

    fn close(&mut self) {
        self.jobs.take();
        #[cfg(feature = "tokio")]
        self.lane.take();
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Compress `work` on a worker, parking the calling thread until it is done.
    pub(crate) fn run(&self, work: Work) -> Result<Done> {
        let Some(jobs) = &self.jobs else {
            return Ok(self.pools.run(work));
        };

        let (reply, done) = crossbeam_channel::bounded(1);
        match jobs.send(Job::new(work, Reply::Blocking(reply))) {
            Ok(()) => done.recv().map_err(|_| Error::WorkerGone),
            Err(SendError(job)) => Ok(self.pools.run(job.work)),
        }
    }

    /// Compress `work` on a worker, waiting for a free lane slot and for the result without
    /// blocking the runtime thread.
    #[cfg(feature = "tokio")]
    pub(crate) async fn run_async(&self, work: Work) -> Result<Done> {
        let Some(lane) = &self.lane else {
            return Ok(self.pools.run(work));
        };

        let slot = match Arc::clone(&lane.slots).acquire_owned().await {
            Ok(slot) => slot,
            Err(_) => return Ok(self.pools.run(work)),
        };

        let (reply, done) = ::tokio::sync::oneshot::channel();
        let mut job = Job::new(work, Reply::Async(reply));
        job.slot = Some(slot);
        match lane.jobs.send(job) {
            Ok(()) => done.await.map_err(|_| Error::WorkerGone),
            Err(SendError(job)) => Ok(self.pools.run(job.work)),
        }
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        // Closing the queues lets every worker drain them and exit.
        self.close();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("compression worker panicked");
            }
        }
    }
}

fn execute(pools: &Pools, job: Job) {
    #[cfg(feature = "tokio")]
    drop(job.slot);
    job.reply.send(pools.run(job.work));
}

#[cfg(not(feature = "tokio"))]
fn work_loop(pools: &Pools, queues: &Queues) {
    for job in queues.blocking.iter() {
        execute(pools, job);
    }
    log::debug!("compression worker exiting");
}

#[cfg(feature = "tokio")]
fn work_loop(pools: &Pools, queues: &Queues) {
    loop {
        let job = crossbeam_channel::select! {
            recv(queues.blocking) -> job => job,
            recv(queues.lane) -> job => job,
        };
        match job {
            Ok(job) => execute(pools, job),
            Err(_) => break,
        }
    }
    // Both queues close together, finish whatever is still buffered in either.
    for job in queues.blocking.try_iter().chain(queues.lane.try_iter()) {
        execute(pools, job);
    }
    log::debug!("compression worker exiting");
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::{execute, Job, Queues, Workers};
    use crate::{engine::Pools, Config};
    use std::sync::Arc;

    async fn next_job(queues: &Queues) -> Job {
        loop {
            if let Ok(job) = queues.lane.try_recv() {
                return job;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn async_submitters_wait_for_a_free_slot() {
        let pools = Arc::new(Pools::new(&Config::default()));
        let (workers, queues) = Workers::detached(&pools, 1);
        let workers = Arc::new(workers);

        let tasks: Vec<_> = [&b"first"[..], b"second", b"third"]
            .into_iter()
            .map(|payload| {
                let workers = Arc::clone(&workers);
                let work = pools.work(1, payload);
                tokio::spawn(async move { workers.run_async(work).await })
            })
            .collect();

        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        // One job holds the only slot, the other submitters are parked on the semaphore.
        assert_eq!(queues.lane.len(), 1);
        assert_eq!(workers.lane.as_ref().unwrap().slots.available_permits(), 0);

        for _ in 0..tasks.len() {
            let job = next_job(&queues).await;
            assert!(queues.lane.is_empty());
            execute(&pools, job);
        }

        for task in tasks {
            let done = task.await.unwrap().unwrap();
            assert!(done.result.is_ok());
        }
    }
}
