use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Scheduled<T> {
    due_ms: u64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed so the heap pops the earliest task first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

// Tasks due at the same millisecond run in scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, due_ms: u64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { due_ms, seq, task });
    }

    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, T)> {
        if self.queue.peek()?.due_ms > now_ms {
            return None;
        }
        self.queue.pop().map(|entry| (entry.due_ms, entry.task))
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.peek().map(|entry| entry.due_ms)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(300, "c");
        scheduler.schedule(100, "a");
        scheduler.schedule(200, "b");
        assert_eq!(scheduler.next_due_ms(), Some(100));
        assert_eq!(scheduler.pop_due(1_000), Some((100, "a")));
        assert_eq!(scheduler.pop_due(1_000), Some((200, "b")));
        assert_eq!(scheduler.pop_due(1_000), Some((300, "c")));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn same_due_time_is_fifo() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2_000, "timed");
        scheduler.schedule(2_000, "enemy_turn");
        scheduler.schedule(2_000, "shake");
        let order: Vec<&str> = std::iter::from_fn(|| scheduler.pop_due(2_000))
            .map(|(_, task)| task)
            .collect();
        assert_eq!(order, vec!["timed", "enemy_turn", "shake"]);
    }

    #[test]
    fn future_tasks_stay_queued() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(500, 1);
        assert_eq!(scheduler.pop_due(499), None);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.pop_due(500), Some((500, 1)));
    }
}
