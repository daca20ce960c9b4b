// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use crate::BlurError;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::thread::available_parallelism;

/// Amount of pixels below which adding one more thread does not pay off.
const PIXELS_PER_THREAD: usize = 256 * 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
/// Set threading policy.
pub enum ThreadingPolicy {
    /// Use only one thread, current is preferred.
    Single,
    /// Compute adaptive thread count between 1..available CPUs.
    #[default]
    Adaptive,
    /// Like `Adaptive`, but reserve given amount of threads (i.e. those will not be
    /// used).
    AdaptiveReserve(NonZeroUsize),
    /// Use specified number of threads.
    Fixed(NonZeroUsize),
}

impl ThreadingPolicy {
    /// Returns the number of threads to use for the given image dimensions under the
    /// selected policy variant.
    ///
    /// Never exceeds the shorter image side since a line is the smallest unit of work,
    /// always at least 1.
    pub fn thread_count(&self, width: u32, height: u32) -> usize {
        let pixels = (width as usize).saturating_mul(height as usize);
        let by_size = pixels / PIXELS_PER_THREAD;
        let threads = match self {
            ThreadingPolicy::Single => 1,
            ThreadingPolicy::Adaptive => by_size.clamp(1, Self::available_parallelism(2)),
            ThreadingPolicy::AdaptiveReserve(reserve) => {
                let max_threads = Self::available_parallelism(1);
                let usable = max_threads.saturating_sub(reserve.get()).max(1);
                by_size.clamp(1, usable)
            }
            ThreadingPolicy::Fixed(fixed) => fixed.get(),
        };
        threads.min(width.min(height) as usize).max(1)
    }

    // Make always return at least some minimal amount of threads, if multi-threading were requested
    // At least on single core CPU have 2 threads is beneficial
    fn available_parallelism(min: usize) -> usize {
        available_parallelism()
            .map(|x| x.get())
            .unwrap_or(1)
            .max(min)
    }
}

/// Fork-join executor over ranges of independent lines.
pub(crate) struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    pub(crate) fn new(thread_count: usize) -> Result<WorkerPool, BlurError> {
        if thread_count <= 1 {
            return Ok(WorkerPool { pool: None });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .map_err(|e| {
                log::error!("Can't create thread pool with {thread_count} threads: {e}");
                BlurError::ThreadPoolCreation
            })?;
        Ok(WorkerPool { pool: Some(pool) })
    }

    pub(crate) fn thread_count(&self) -> usize {
        self.pool
            .as_ref()
            .map(|pool| pool.current_num_threads())
            .unwrap_or(1)
    }

    /// Splits `0..lines` into one contiguous range per thread and blocks until all are done.
    ///
    /// Ranges never overlap, `worker` receives each line exactly once.
    pub(crate) fn split_lines<F>(&self, lines: usize, worker: F)
    where
        F: Fn(Range<usize>) + Sync,
    {
        let Some(pool) = &self.pool else {
            worker(0..lines);
            return;
        };
        let thread_count = pool.current_num_threads();
        let worker = &worker;
        pool.scope(|scope| {
            for i in 0..thread_count {
                let start = i * lines / thread_count;
                let end = (i + 1) * lines / thread_count;
                if start < end {
                    scope.spawn(move |_| worker(start..end));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_thread_count_bounds() {
        assert_eq!(ThreadingPolicy::Single.thread_count(4096, 4096), 1);
        let fixed = ThreadingPolicy::Fixed(NonZeroUsize::new(8).unwrap());
        assert_eq!(fixed.thread_count(4096, 4096), 8);
        assert_eq!(fixed.thread_count(3, 4096), 3);
        assert_eq!(ThreadingPolicy::Adaptive.thread_count(1, 1), 1);
        assert!(ThreadingPolicy::Adaptive.thread_count(4096, 4096) >= 1);
    }

    #[test]
    fn test_split_lines_visits_every_line_once() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.thread_count(), 3);
        let visits: Vec<AtomicUsize> = (0..17).map(|_| AtomicUsize::new(0)).collect();
        pool.split_lines(visits.len(), |range| {
            for i in range {
                visits[i].fetch_add(1, Ordering::Relaxed);
            }
        });
        assert!(visits.iter().all(|x| x.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn test_single_thread_pool_runs_inline() {
        let pool = WorkerPool::new(1).unwrap();
        assert_eq!(pool.thread_count(), 1);
        let total = AtomicUsize::new(0);
        pool.split_lines(5, |range| {
            total.fetch_add(range.len(), Ordering::Relaxed);
        });
        assert_eq!(total.load(Ordering::Relaxed), 5);
    }
}
