/// Logical clock timer queue.
///
/// All deferred behavior (fuses, cooldown windows, blast lifetime,
/// invulnerability, spawn delays) is an entry of (deadline, action)
/// advanced by an explicit logical clock — never a wall-clock timer.
/// A caller schedules and returns immediately; the action fires as a
/// later invocation on the same logical thread when the session's clock
/// is advanced past the deadline.
///
/// Due entries pop in deadline order, FIFO on ties. Entries can be
/// cancelled by token; cancelled entries are skipped on pop. The only
/// canceller in the whole simulation is invulnerability re-trigger
/// replacing a stale end-timer.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Cancellation handle for a scheduled entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TimerToken(u64);

/// A due entry handed back by `pop_due`.
#[derive(Debug)]
pub struct Due<A> {
    pub deadline: u64,
    pub token: TimerToken,
    pub action: A,
}

struct Entry<A> {
    deadline: u64,
    seq: u64,
    token: TimerToken,
    action: A,
}

// Min-heap on (deadline, seq): earliest deadline first, insertion order on ties.
impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}
impl<A> Eq for Entry<A> {}
impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<A> Ord for Entry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.seq).cmp(&(self.deadline, self.seq))
    }
}

pub struct TimerQueue<A> {
    heap: BinaryHeap<Entry<A>>,
    cancelled: HashSet<TimerToken>,
    next_seq: u64,
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        TimerQueue { heap: BinaryHeap::new(), cancelled: HashSet::new(), next_seq: 0 }
    }

    /// Schedule `action` to fire at `deadline` (absolute, logical ms).
    pub fn schedule(&mut self, deadline: u64, action: A) -> TimerToken {
        let seq = self.next_seq;
        self.next_seq += 1;
        let token = TimerToken(seq);
        self.heap.push(Entry { deadline, seq, token, action });
        token
    }

    /// Cancel a pending entry. Unknown or already-fired tokens are a no-op.
    pub fn cancel(&mut self, token: TimerToken) {
        self.cancelled.insert(token);
    }

    /// Pop the earliest entry with deadline <= now, skipping cancellations.
    pub fn pop_due(&mut self, now: u64) -> Option<Due<A>> {
        while self.heap.peek().map(|top| top.deadline <= now).unwrap_or(false) {
            if let Some(entry) = self.heap.pop() {
                if self.cancelled.remove(&entry.token) {
                    continue;
                }
                return Some(Due { deadline: entry.deadline, token: entry.token, action: entry.action });
            }
        }
        None
    }

    /// Pending (non-cancelled) entry count. Tokens cancelled after their
    /// entry fired linger in the tombstone set, so count, don't subtract.
    pub fn len(&self) -> usize {
        self.heap
            .iter()
            .filter(|e| !self.cancelled.contains(&e.token))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deadline of the next pending entry, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        // Cancelled entries may sit at the top; this is a hint, not a promise.
        self.heap.peek().map(|e| e.deadline)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
