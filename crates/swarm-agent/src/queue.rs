//! Per-agent prioritized command queue.
//!
//! A binary heap keyed by `(priority_desc, seq)`, where `seq` is a
//! monotonic insertion counter — this gives stable FIFO ordering within a
//! priority level without a lock-free crate: concurrent producers enqueue
//! under the mutex, the tick thread is the single consumer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use parking_lot::Mutex;
use swarm_types::MovementCommand;

struct HeapEntry {
    seq: u64,
    command: MovementCommand,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.command.priority == other.command.priority && self.seq == other.seq
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: higher priority pops first, and within
        // equal priority the lower seq (older command) pops first, so we
        // reverse the seq comparison.
        self.command.priority.cmp(&other.command.priority).then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct CommandQueue {
    heap: Mutex<BinaryHeap<HeapEntry>>,
    next_seq: AtomicU64,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self { heap: Mutex::new(BinaryHeap::new()), next_seq: AtomicU64::new(0) }
    }

    pub fn push(&self, command: MovementCommand) {
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.heap.lock().push(HeapEntry { seq, command });
    }

    pub fn pop(&self) -> Option<MovementCommand> {
        self.heap.lock().pop().map(|entry| entry.command)
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every command whose priority is strictly below `Priority::High`
    /// — used by the recovery controller's `OVERLOAD` response.
    pub fn drop_low_priority(&self) {
        use swarm_types::Priority;
        let mut heap = self.heap.lock();
        let kept: Vec<HeapEntry> = std::mem::take(&mut *heap)
            .into_iter()
            .filter(|e| e.command.priority >= Priority::High)
            .collect();
        *heap = kept.into_iter().collect();
    }

    pub fn clear(&self) {
        self.heap.lock().clear();
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use swarm_types::{AgentId, CommandKind, Priority};

    fn cmd(priority: Priority) -> MovementCommand {
        MovementCommand::new(AgentId::new(1), CommandKind::MoveToTarget, priority, Utc::now())
    }

    #[test]
    fn emergency_is_never_dequeued_after_a_lower_priority_enqueued_earlier() {
        let q = CommandQueue::new();
        q.push(cmd(Priority::Normal));
        q.push(cmd(Priority::Emergency));
        assert_eq!(q.pop().unwrap().priority, Priority::Emergency);
        assert_eq!(q.pop().unwrap().priority, Priority::Normal);
    }

    #[test]
    fn same_priority_is_fifo() {
        let q = CommandQueue::new();
        for i in 0..3 {
            let mut c = cmd(Priority::Normal);
            c.params.insert("order".into(), swarm_types::ParamValue::Number(i as f64));
            q.push(c);
        }
        let first = q.pop().unwrap();
        assert_eq!(first.params.get("order"), Some(&swarm_types::ParamValue::Number(0.0)));
    }

    #[test]
    fn drop_low_priority_keeps_high_and_above() {
        let q = CommandQueue::new();
        q.push(cmd(Priority::Low));
        q.push(cmd(Priority::Normal));
        q.push(cmd(Priority::High));
        q.push(cmd(Priority::Emergency));
        q.drop_low_priority();
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn pop_on_empty_queue_is_none() {
        let q = CommandQueue::new();
        assert!(q.pop().is_none());
    }
}
