//! Traversal queue for the crawl loop
//!
//! A single double-ended queue serves both traversal orders: depth-first
//! pops the back (most recently discovered locator first), breadth-first
//! pops the front. The capacity, when set, bounds the number of locators
//! ever admitted, not the number currently queued, so draining the queue
//! frees no headroom.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uri::DiscoveredUri;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The configured admission ceiling was hit. Callers that keep crawling
    /// after this must drop the locator they tried to add; the queue itself
    /// is unchanged.
    #[error("queue capacity of {max} locators reached")]
    CapacityReached { max: usize },
}

/// Order in which queued locators are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Visit the most recently discovered locator first.
    #[default]
    DepthFirst,
    /// Visit locators in the order they were discovered.
    BreadthFirst,
}

#[derive(Debug, Default)]
pub struct TraversalQueue {
    entries: VecDeque<DiscoveredUri>,
    order: TraversalOrder,
    /// Locators admitted over the lifetime of the queue.
    enqueued_total: usize,
    /// Admission ceiling; 0 means unbounded.
    capacity: usize,
}

impl TraversalQueue {
    pub fn new(order: TraversalOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    pub fn set_order(&mut self, order: TraversalOrder) {
        self.order = order;
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Admit a locator, or fail without touching the queue when the
    /// lifetime admission count has reached the capacity.
    pub fn enqueue(&mut self, uri: DiscoveredUri) -> Result<(), QueueError> {
        if self.capacity != 0 && self.enqueued_total >= self.capacity {
            return Err(QueueError::CapacityReached { max: self.capacity });
        }
        self.entries.push_back(uri);
        self.enqueued_total += 1;
        Ok(())
    }

    /// Next locator to visit under the configured order.
    pub fn dequeue(&mut self) -> Option<DiscoveredUri> {
        match self.order {
            TraversalOrder::DepthFirst => self.entries.pop_back(),
            TraversalOrder::BreadthFirst => self.entries.pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locators ever admitted, including ones already visited.
    pub fn enqueued_total(&self) -> usize {
        self.enqueued_total
    }
}
