//! The deferred message queue.

use std::collections::VecDeque;

use crate::{id::NodeId, message::Message};

/// Collaborators that keep per-widget bookkeeping implement this so that
/// disposal can release it.
pub trait OwnerData {
    /// Drop everything held on behalf of `owner`.
    fn clear_owner(&mut self, owner: NodeId);
}

/// A message waiting for the next flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    /// Posting order.
    seq: u64,
    /// Receiving widget.
    pub target: NodeId,
    /// The message itself.
    pub message: Message,
}

/// FIFO of posted messages, flushed once per host tick.
#[derive(Debug, Default)]
pub struct MessageQueue {
    /// Pending messages in posting order.
    queue: VecDeque<Posted>,
    /// Sequence number for the next posted message.
    next_seq: u64,
}

impl MessageQueue {
    /// Construct an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages still pending for `target`, oldest first.
    pub fn pending_for(&self, target: NodeId) -> Vec<&Message> {
        self.queue
            .iter()
            .filter(|p| p.target == target)
            .map(|p| &p.message)
            .collect()
    }

    /// Append a message.
    pub fn push(&mut self, target: NodeId, message: Message) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push_back(Posted {
            seq,
            target,
            message,
        });
    }

    /// A cutoff separating everything posted so far from anything posted
    /// later. Pass it to [`pop_before`](Self::pop_before).
    pub fn mark(&self) -> u64 {
        self.next_seq
    }

    /// Take the oldest pending message if it was posted before `mark`.
    pub fn pop_before(&mut self, mark: u64) -> Option<Posted> {
        if self.queue.front()?.seq >= mark {
            return None;
        }
        self.queue.pop_front()
    }

    /// Number of pending messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Is the queue empty?
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl OwnerData for MessageQueue {
    fn clear_owner(&mut self, owner: NodeId) {
        self.queue.retain(|p| p.target != owner);
    }
}
