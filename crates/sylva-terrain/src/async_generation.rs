//! Background heightfield sampling on a worker pool.
//!
//! Only the pure height function runs off-thread. Every submission gets a
//! sequence number and results are released strictly in that order, so the
//! owning thread can scatter objects exactly as a synchronous run would.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;

use crate::coord::ChunkCoord;
use crate::height_gen::{HeightGen, HeightParams};
use crate::heightfield::Heightfield;

/// A sampled heightfield released in submission order.
#[derive(Debug)]
pub struct GeneratedHeightfield {
    /// Position of the request in submission order.
    pub sequence: u64,
    pub heightfield: Heightfield,
    /// Sampling time in microseconds (for profiling).
    pub generation_time_us: u64,
}

struct SequencedTask {
    sequence: u64,
    coord: ChunkCoord,
    cancelled: Arc<AtomicBool>,
}

/// Workers report cancelled tasks too, so the release order never stalls.
struct WorkerResult {
    sequence: u64,
    coord: ChunkCoord,
    heightfield: Option<Heightfield>,
    generation_time_us: u64,
}

/// Samples chunk heightfields across a thread pool.
pub struct AsyncHeightfieldGenerator {
    params: HeightParams,
    task_sender: Sender<SequencedTask>,
    result_receiver: Receiver<WorkerResult>,
    /// Cancellation flag per pending chunk.
    active_tasks: Arc<DashMap<ChunkCoord, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
    next_sequence: u64,
    next_release: u64,
    reorder: BTreeMap<u64, WorkerResult>,
}

impl AsyncHeightfieldGenerator {
    /// Create a generator for `params` with `thread_count` workers.
    ///
    /// At most `max_queued` submissions wait for a worker; `result_capacity`
    /// bounds finished results not yet drained.
    pub fn new(
        params: HeightParams,
        thread_count: usize,
        max_queued: usize,
        result_capacity: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<SequencedTask>(max_queued.max(1));
        let (result_sender, result_receiver) = bounded::<WorkerResult>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));
        let height_gen = Arc::new(HeightGen::with_params(params.clone()));

        for _ in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let height_gen = Arc::clone(&height_gen);

            std::thread::Builder::new()
                .name("heightfield-worker".into())
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        let start = Instant::now();
                        let heightfield = if task.cancelled.load(Ordering::Relaxed) {
                            None
                        } else {
                            Some(Heightfield::sample(&height_gen, task.coord))
                        };
                        let heightfield =
                            heightfield.filter(|_| !task.cancelled.load(Ordering::Relaxed));

                        let result = WorkerResult {
                            sequence: task.sequence,
                            coord: task.coord,
                            heightfield,
                            generation_time_us: start.elapsed().as_micros() as u64,
                        };
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                        if sender.send(result).is_err() {
                            break;
                        }
                    }
                })?;
        }

        tracing::debug!(
            threads = thread_count.max(1),
            seed = params.seed,
            "started heightfield workers"
        );

        Ok(Self {
            params,
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
            next_sequence: 0,
            next_release: 0,
            reorder: BTreeMap::new(),
        })
    }

    /// Create a generator sized to the machine's CPU count.
    pub fn with_defaults(params: HeightParams) -> std::io::Result<Self> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 1).max(1);
        Self::new(params, threads, 64, 128)
    }

    /// Queue `coord` for sampling.
    ///
    /// Returns the sequence number on success, or `Err(coord)` if the queue
    /// is full.
    pub fn submit(&mut self, coord: ChunkCoord) -> Result<u64, ChunkCoord> {
        let sequence = self.next_sequence;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        let task = SequencedTask {
            sequence,
            coord,
            cancelled: Arc::clone(&cancelled),
        };
        match self.task_sender.try_send(task) {
            Ok(()) => {
                self.active_tasks.insert(coord, cancelled);
                self.next_sequence += 1;
                Ok(sequence)
            }
            Err(_) => {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                Err(coord)
            }
        }
    }

    /// Cancel a pending request. Its sequence slot is skipped on release.
    ///
    /// If sampling already finished this is a no-op.
    pub fn cancel(&self, coord: ChunkCoord) {
        if let Some((_, cancelled)) = self.active_tasks.remove(&coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Collect finished heightfields that are next in sequence order.
    ///
    /// Non-blocking; call once per frame on the owning thread.
    pub fn drain_results(&mut self) -> Vec<GeneratedHeightfield> {
        while let Ok(result) = self.result_receiver.try_recv() {
            self.accept(result);
        }
        self.release_ready()
    }

    /// Block until every submitted request has been released or `timeout`
    /// elapses, returning results in sequence order.
    pub fn finish(&mut self, timeout: Duration) -> Vec<GeneratedHeightfield> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        while self.next_release < self.next_sequence {
            out.extend(self.release_ready());
            if self.next_release >= self.next_sequence {
                break;
            }
            match self.result_receiver.recv_deadline(deadline) {
                Ok(result) => self.accept(result),
                Err(_) => {
                    tracing::warn!(
                        pending = self.next_sequence - self.next_release,
                        "timed out waiting for heightfields"
                    );
                    break;
                }
            }
        }
        out
    }

    fn accept(&mut self, result: WorkerResult) {
        if result.heightfield.is_some() {
            self.active_tasks.remove(&result.coord);
        }
        self.reorder.insert(result.sequence, result);
    }

    fn release_ready(&mut self) -> Vec<GeneratedHeightfield> {
        let mut ready = Vec::new();
        while let Some(result) = self.reorder.remove(&self.next_release) {
            self.next_release += 1;
            if let Some(heightfield) = result.heightfield {
                ready.push(GeneratedHeightfield {
                    sequence: result.sequence,
                    heightfield,
                    generation_time_us: result.generation_time_us,
                });
            }
        }
        ready
    }

    /// Number of requests queued or being sampled.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if `coord` has been submitted and not yet drained or
    /// cancelled.
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.active_tasks.contains_key(&coord)
    }

    pub fn params(&self) -> &HeightParams {
        &self.params
    }
}
