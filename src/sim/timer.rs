//! Wall-clock timer queue
//!
//! Repeating tasks are plain records scheduled against a millisecond clock
//! that the session advances by each frame's delta. This clock is separate
//! from the tick counter: a task fires on elapsed time, however many ticks
//! that took.

use serde::{Deserialize, Serialize};

/// Handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

/// A repeating task waiting to fire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask<P> {
    pub id: TaskId,
    pub fire_at_ms: f64,
    pub interval_ms: f64,
    /// Firings left, including the next one
    pub remaining_repeats: u32,
    pub payload: P,
}

/// One firing returned by [`TimerQueue::advance`]
#[derive(Debug, Clone, PartialEq)]
pub struct Firing<P> {
    pub task: TaskId,
    pub at_ms: f64,
    pub payload: P,
    /// True if this was the task's final firing
    pub last: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerQueue<P> {
    now_ms: f64,
    tasks: Vec<ScheduledTask<P>>,
    next_id: u64,
}

impl<P> Default for TimerQueue<P> {
    fn default() -> Self {
        Self {
            now_ms: 0.0,
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl<P: Clone> TimerQueue<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `firings` firings spaced `interval_ms` apart, the first one
    /// `interval_ms` from now. Zero firings schedules nothing.
    pub fn schedule_repeating(&mut self, interval_ms: f64, firings: u32, payload: P) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        if firings > 0 {
            self.tasks.push(ScheduledTask {
                id,
                fire_at_ms: self.now_ms + interval_ms,
                interval_ms,
                remaining_repeats: firings,
                payload,
            });
        }
        id
    }

    /// Cancel a pending task. Cancelling an unknown or finished task is a no-op.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        before != self.tasks.len()
    }

    /// Cancel every pending task, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        count
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&ScheduledTask<P>> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance the clock and collect every firing that came due, in time order
    /// (ties broken by schedule order). Exhausted tasks are removed.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<Firing<P>> {
        self.now_ms += delta_ms.max(0.0);
        let mut fired = Vec::new();

        loop {
            let next = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.fire_at_ms <= self.now_ms)
                .min_by(|(_, a), (_, b)| {
                    a.fire_at_ms
                        .total_cmp(&b.fire_at_ms)
                        .then(a.id.0.cmp(&b.id.0))
                })
                .map(|(i, _)| i);
            let Some(index) = next else {
                break;
            };

            let task = &mut self.tasks[index];
            task.remaining_repeats -= 1;
            let last = task.remaining_repeats == 0;
            fired.push(Firing {
                task: task.id,
                at_ms: task.fire_at_ms,
                payload: task.payload.clone(),
                last,
            });

            if last {
                self.tasks.remove(index);
            } else {
                task.fire_at_ms += task.interval_ms.max(f64::EPSILON);
            }
        }

        fired
    }
}
