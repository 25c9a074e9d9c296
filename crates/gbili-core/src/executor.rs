//! Fan-out/fan-in execution of a phase function over contiguous partitions.
//!
//! The object range `[0, N)` is cut into chunks of `ceil(N / workers)` ids
//! (the last chunk may be shorter). Each chunk runs on its own named scoped
//! thread; results come back over a `crossbeam-channel` and are returned in
//! partition order, so concatenating them yields id order.
//!
//! Failure handling:
//! - the first worker error or panic aborts the run and is returned
//! - a shared cancellation flag is raised so siblings can stop early
//! - the channel disconnecting before every partition reported is a
//!   [`Error::WorkerFailure`] for the first missing partition
//!
//! No partial results are ever returned.

use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvError};
use std::any::Any;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

/// One contiguous slice of object ids handed to a worker.
#[derive(Debug)]
pub struct Partition<'a> {
    index: usize,
    range: Range<usize>,
    cancelled: &'a AtomicBool,
}

impl<'a> Partition<'a> {
    /// Creates a partition bound to a cancellation flag.
    #[must_use]
    pub fn new(index: usize, range: Range<usize>, cancelled: &'a AtomicBool) -> Self {
        Self {
            index,
            range,
            cancelled,
        }
    }

    /// Position of this partition in the schedule.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Object ids owned by this partition.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Number of objects in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns true if the partition holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Returns true once the run has been aborted.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(Cancelled)` once the run has been aborted.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] if a sibling worker failed.
    #[inline]
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Splits `[0, object_count)` into contiguous chunks of `ceil(N / workers)`.
///
/// Every id is covered exactly once. When `workers` does not divide `N`
/// the last chunk is shorter, and fewer than `workers` chunks may result
/// (e.g. N = 10, workers = 6 gives five chunks of two).
///
/// # Errors
///
/// `InvalidConfiguration` if `workers` is zero or exceeds `object_count`.
pub fn partition_ranges(object_count: usize, workers: usize) -> Result<Vec<Range<usize>>> {
    if workers == 0 {
        return Err(Error::InvalidConfiguration(
            "worker count must be at least 1".into(),
        ));
    }
    if workers > object_count {
        return Err(Error::InvalidConfiguration(format!(
            "worker count {workers} exceeds object count {object_count}"
        )));
    }

    let chunk = object_count.div_ceil(workers);
    Ok((0..object_count)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(object_count))
        .collect())
}

/// Runs a phase function once per partition on isolated worker threads.
#[derive(Debug, Clone, Copy)]
pub struct PartitionExecutor {
    workers: usize,
}

impl PartitionExecutor {
    /// Creates an executor with the configured worker count.
    ///
    /// The count is validated against the object count in [`Self::execute`].
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    /// Configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `phase` on every partition of `[0, object_count)` and returns the
    /// per-partition results in partition order.
    ///
    /// `phase` only gets shared references, so everything it captures must
    /// be immutable for the duration of the run.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` before anything is scheduled if the worker
    ///   count is invalid for `object_count`
    /// - the error returned by the first failing worker
    /// - `WorkerFailure` if a worker panicked, could not be spawned, or the
    ///   result channel closed before every partition reported
    pub fn execute<T, F>(&self, object_count: usize, phase: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&Partition<'_>) -> Result<T> + Sync,
    {
        let ranges = partition_ranges(object_count, self.workers)?;
        let partitions = ranges.len();
        let cancelled = AtomicBool::new(false);
        let started = Instant::now();

        let outcome = thread::scope(|scope| {
            let (tx, rx) = crossbeam_channel::bounded::<(usize, Result<T>)>(partitions);
            let mut spawned = 0usize;
            let mut failure: Option<Error> = None;

            for (index, range) in ranges.iter().cloned().enumerate() {
                let tx = tx.clone();
                let phase = &phase;
                let partition = Partition::new(index, range, &cancelled);

                let handle = thread::Builder::new()
                    .name(format!("gbili-worker-{index}"))
                    .spawn_scoped(scope, move || {
                        let result = catch_unwind(AssertUnwindSafe(|| phase(&partition)))
                            .unwrap_or_else(|payload| {
                                Err(Error::WorkerFailure {
                                    partition: index,
                                    reason: format!("panicked: {}", panic_message(&*payload)),
                                })
                            });
                        // A closed receiver means the run was already aborted.
                        let _ = tx.send((index, result));
                    });

                match handle {
                    Ok(_) => spawned += 1,
                    Err(e) => {
                        failure = Some(Error::WorkerFailure {
                            partition: index,
                            reason: format!("failed to spawn worker thread: {e}"),
                        });
                        break;
                    }
                }
            }
            // Only worker-held senders remain: disconnection means a worker
            // went away without reporting.
            drop(tx);

            let outcome = match failure {
                Some(err) => Err(err),
                None => collect_results(&rx, partitions, spawned),
            };
            if let Err(err) = &outcome {
                // Siblings poll this flag; the scope joins them on exit.
                cancelled.store(true, Ordering::Relaxed);
                tracing::warn!(error = %err, "partition worker failed, aborting run");
            }
            outcome
        });

        if outcome.is_ok() {
            tracing::debug!(
                partitions,
                objects = object_count,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "all partitions completed"
            );
        }
        outcome
    }
}

/// Receives `expected` partition results and orders them by partition.
///
/// Stops at the first worker error. A channel that disconnects early, or a
/// partition that never reported, becomes a `WorkerFailure` naming the first
/// partition without a result.
pub(crate) fn collect_results<T>(
    rx: &Receiver<(usize, Result<T>)>,
    partitions: usize,
    expected: usize,
) -> Result<Vec<T>> {
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(partitions).collect();
    let first_missing =
        |slots: &[Option<T>]| slots.iter().position(Option::is_none).unwrap_or(0);

    for _ in 0..expected {
        match rx.recv() {
            Ok((index, Ok(value))) => {
                tracing::debug!(partition = index, "partition completed");
                match slots.get_mut(index) {
                    Some(slot) => *slot = Some(value),
                    None => {
                        return Err(Error::WorkerFailure {
                            partition: index,
                            reason: format!("result for unknown partition ({partitions} scheduled)"),
                        })
                    }
                }
            }
            Ok((_, Err(err))) => return Err(err),
            Err(RecvError) => {
                return Err(Error::WorkerFailure {
                    partition: first_missing(&slots),
                    reason: "result channel closed without a result".into(),
                })
            }
        }
    }

    if slots.iter().any(Option::is_none) {
        return Err(Error::WorkerFailure {
            partition: first_missing(&slots),
            reason: "no result received".into(),
        });
    }
    Ok(slots.into_iter().flatten().collect())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
