//! Timer Queue Implementation

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use tracing::debug;

/// Handle to a scheduled timer, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// A scheduled event with timing info
#[derive(Debug)]
struct ScheduledTimer<E> {
    /// Time the event becomes due (ms)
    due_ms: u64,
    /// Scheduling order, breaks ties between equal deadlines
    seq: u64,
    handle: TimerHandle,
    /// Repeat interval for periodic timers
    interval_ms: Option<u64>,
    event: E,
}

impl<E> Eq for ScheduledTimer<E> {}

impl<E> PartialEq for ScheduledTimer<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<E> Ord for ScheduledTimer<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (earliest time first),
        // then first scheduled first
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for ScheduledTimer<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Queue of delayed events
pub struct TimerQueue<E> {
    heap: BinaryHeap<ScheduledTimer<E>>,
    /// Handles that are still valid
    live: HashSet<TimerHandle>,
    next_seq: u64,
}

impl<E: Clone> TimerQueue<E> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            next_seq: 0,
        }
    }

    fn push(&mut self, due_ms: u64, interval_ms: Option<u64>, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TimerHandle(seq);

        self.heap.push(ScheduledTimer {
            due_ms,
            seq,
            handle,
            interval_ms,
            event,
        });
        self.live.insert(handle);
        handle
    }

    /// Schedule `event` to fire once, `delay_ms` after `now_ms`
    pub fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, event: E) -> TimerHandle {
        let handle = self.push(now_ms.saturating_add(delay_ms), None, event);
        debug!("Timer {:?} scheduled in {}ms", handle, delay_ms);
        handle
    }

    /// Schedule `event` to fire every `interval_ms`, first at `now_ms + interval_ms`
    pub fn schedule_every(&mut self, now_ms: u64, interval_ms: u64, event: E) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        let handle = self.push(now_ms.saturating_add(interval_ms), Some(interval_ms), event);
        debug!("Timer {:?} scheduled every {}ms", handle, interval_ms);
        handle
    }

    /// Invalidate a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let removed = self.live.remove(&handle);
        if removed {
            debug!("Timer {:?} cancelled", handle);
        }
        removed
    }

    /// Whether a handle is still pending
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Pop the next event due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<E> {
        loop {
            let next = self.heap.peek()?;
            if next.due_ms > now_ms {
                return None;
            }

            let mut timer = self.heap.pop()?;
            if !self.live.contains(&timer.handle) {
                // Cancelled; drop the stale entry
                continue;
            }

            match timer.interval_ms {
                Some(interval) => {
                    let event = timer.event.clone();
                    let mut next_due = timer.due_ms.saturating_add(interval);
                    if next_due <= now_ms {
                        // Fell behind; do not burst to catch up
                        next_due = now_ms.saturating_add(interval);
                    }
                    timer.due_ms = next_due;
                    timer.seq = self.next_seq;
                    self.next_seq += 1;
                    self.heap.push(timer);
                    return Some(event);
                }
                None => {
                    self.live.remove(&timer.handle);
                    return Some(timer.event);
                }
            }
        }
    }

    /// Earliest deadline among pending timers
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap
            .iter()
            .filter(|t| self.live.contains(&t.handle))
            .map(|t| t.due_ms)
            .min()
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl<E: Clone> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
