#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicI64, Ordering};

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
/// The process-wide greeting identifier sequence. It starts at 1 when the
/// process starts and is never reset or persisted.
pub static GREETING_IDS: IdGenerator = IdGenerator::new();

// ***************************************************************************
//                               IdGenerator
// ***************************************************************************
/// A lock-free source of unique, strictly increasing identifiers.
///
/// Every call to [`IdGenerator::next`] performs one atomic fetch-and-add, so
/// the Nth call made anywhere in the process returns exactly N no matter how
/// many threads are calling concurrently.
#[derive(Debug)]
pub struct IdGenerator {
    counter: AtomicI64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self { counter: AtomicI64::new(0) }
    }

    /// Return the next identifier. Never blocks.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> i64 {
        // The single read-modify-write is what makes the value unique;
        // no other memory is published with it.
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn sequential_ids_start_at_one() {
        let ids = IdGenerator::new();
        let got: Vec<i64> = (0..5).map(|_| ids.next()).collect();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn concurrent_threads_never_collide() {
        const CALLERS: usize = 1000;
        let ids = Arc::new(IdGenerator::new());

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || ids.next())
            })
            .collect();

        let mut got: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        got.sort_unstable();
        let expected: Vec<i64> = (1..=CALLERS as i64).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn each_thread_sees_increasing_ids() {
        let ids = IdGenerator::new();
        thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let seen: Vec<i64> = (0..250).map(|_| ids.next()).collect();
                        assert!(seen.windows(2).all(|w| w[0] < w[1]));
                        seen
                    })
                })
                .collect();

            let all: HashSet<i64> = workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect();
            assert_eq!(all.len(), 2000);
            assert_eq!(all.iter().copied().max(), Some(2000));
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tasks_never_collide() {
        static IDS: IdGenerator = IdGenerator::new();

        let tasks: Vec<_> = (0..1000).map(|_| tokio::spawn(async { IDS.next() })).collect();
        let mut got = Vec::with_capacity(tasks.len());
        for t in tasks {
            got.push(t.await.unwrap());
        }
        got.sort_unstable();
        assert_eq!(got, (1..=1000).collect::<Vec<i64>>());
    }
}
