//! Deferred actions
//!
//! Timed state changes (duck auto-release, extreme-mode extra spawns) are
//! queued here as `(fire_time, action)` entries and run from the frame tick
//! once game time reaches them. Clearing the queue cancels them.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::state::GameState;

/// Something to do at a later game time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledAction {
    /// End the duck that started at `started_at`
    ReleaseDuck { started_at: f64 },
    /// Periodic extreme-mode spawn roll (re-arms itself)
    ExtremeSpawn,
}

#[derive(Debug, Clone)]
struct Entry {
    fire_at: f64,
    /// Insertion order; breaks ties between equal fire times
    seq: u64,
    action: ScheduledAction,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .total_cmp(&other.fire_at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-priority queue of scheduled actions keyed by game time
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn schedule(&mut self, fire_at: f64, action: ScheduledAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            fire_at,
            seq,
            action,
        }));
    }

    /// Pop the earliest action due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, ScheduledAction)> {
        let Reverse(next) = self.queue.peek()?;
        if next.fire_at > now {
            return None;
        }
        self.queue
            .pop()
            .map(|Reverse(entry)| (entry.fire_at, entry.action))
    }

    /// Fire time of the earliest pending action
    pub fn next_fire_time(&self) -> Option<f64> {
        self.queue.peek().map(|Reverse(entry)| entry.fire_at)
    }

    pub fn contains(&self, action: &ScheduledAction) -> bool {
        self.queue.iter().any(|Reverse(entry)| &entry.action == action)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl GameState {
    /// Run every scheduled action that is due at the current game time, in
    /// fire-time order. Actions scheduled by a handler for a time that is
    /// already due run in the same pass.
    pub fn run_scheduled(&mut self) {
        let now = self.run.time_ms;
        while let Some((fire_at, action)) = self.scheduler.pop_due(now) {
            match action {
                ScheduledAction::ReleaseDuck { started_at } => {
                    self.dino.release_duck(started_at, fire_at);
                }
                ScheduledAction::ExtremeSpawn => self.extreme_spawn(fire_at),
            }
        }
    }
}
