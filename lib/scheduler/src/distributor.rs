//! A hybrid work-dispenser / phase barrier with a finalize hook.
//!
//! `get()` hands out integers `0..total` to any number of participants.
//! Once exhausted, a caller joins an implicit barrier: the last arriver
//! advances the phase, resets the cursor, runs the finalize callback while
//! still holding the lock, then wakes everyone else. This makes the
//! finalize step (e.g. the per-generation `zoom`/`swap`) happen-before any
//! participant observes the next phase.

use std::sync::{Condvar, Mutex};

use crate::error::HarnessError;

struct State {
    limit: usize,
    count: usize,
    phase: u64,
    total: usize,
    next_element: usize,
}

pub struct Distributor<F: FnMut() + Send> {
    state: Mutex<State>,
    cond: Condvar,
    finalize: Mutex<Option<F>>,
}

impl<F: FnMut() + Send> Distributor<F> {
    pub fn new(nb_threads: usize, nb_elements: usize, finalize: F) -> Result<Self, HarnessError> {
        if nb_threads == 0 || nb_elements == 0 {
            return Err(HarnessError::config(
                "distributor requires nb_threads > 0 and nb_elements > 0",
            ));
        }
        Ok(Self {
            state: Mutex::new(State {
                limit: nb_threads,
                count: 0,
                phase: 0,
                total: nb_elements,
                next_element: 0,
            }),
            cond: Condvar::new(),
            finalize: Mutex::new(Some(finalize)),
        })
    }

    /// Returns `Some(item)` while elements remain, or `None` once this
    /// caller has joined the phase barrier and the phase has advanced.
    pub fn get(&self) -> Option<usize> {
        let mut state = self.state.lock().unwrap();

        if state.next_element == state.total {
            state.count += 1;
            if state.count >= state.limit {
                state.phase += 1;
                state.count = 0;
                state.next_element = 0;

                if let Some(f) = self.finalize.lock().unwrap().as_mut() {
                    f();
                }

                self.cond.notify_all();
            } else {
                let phase = state.phase;
                while phase == state.phase {
                    state = self.cond.wait(state).unwrap();
                }
            }
            None
        } else {
            let e = state.next_element;
            state.next_element += 1;
            Some(e)
        }
    }

    /// Reuse this distributor for the next generation with a new element
    /// count, without reallocating. Must only be called outside an active
    /// phase (i.e. after every participant has observed `None`).
    pub fn reset(&self, nb_elements: usize) {
        let mut state = self.state.lock().unwrap();
        state.total = nb_elements;
        state.next_element = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    #[test]
    fn rejects_zero_participants_or_elements() {
        assert!(Distributor::new(0, 10, || {}).is_err());
        assert!(Distributor::new(4, 0, || {}).is_err());
    }

    #[test]
    fn coverage_disjointness_and_single_finalize() {
        let finalize_calls = Arc::new(AtomicUsize::new(0));
        let fc = finalize_calls.clone();
        let dist = Arc::new(Distributor::new(4, 10, move || {
            fc.fetch_add(1, Ordering::SeqCst);
        }).unwrap());

        let seen = Arc::new(StdMutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let dist = dist.clone();
            let seen = seen.clone();
            handles.push(std::thread::spawn(move || {
                while let Some(item) = dist.get() {
                    seen.lock().unwrap().push(item);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert_eq!(finalize_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reusable_across_generations() {
        let gens = Arc::new(AtomicUsize::new(0));
        let g = gens.clone();
        let dist = Distributor::new(2, 5, move || {
            g.fetch_add(1, Ordering::SeqCst);
        }).unwrap();

        for _ in 0..3 {
            let d = &dist;
            std::thread::scope(|s| {
                for _ in 0..2 {
                    s.spawn(|| while d.get().is_some() {});
                }
            });
            dist.reset(5);
        }

        assert_eq!(gens.load(Ordering::SeqCst), 3);
    }
}
