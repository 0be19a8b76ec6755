//! The `MessageBus` trait and the in-memory reference implementation.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::BusResult;
use crate::topic;

/// One delivered message: the concrete topic it was published on plus the
/// raw payload bytes.
#[derive(Clone, Debug)]
pub struct Message {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Object-safe publish/subscribe seam.
///
/// Delivery is at-least-once at best and lossy at worst; producers treat
/// `publish` as fire-and-forget and consumers drain their receiver once per
/// iteration.  Everything on the bus is an idempotent whole-state snapshot
/// or a single-shot command, so a lost message is recovered by the next one.
pub trait MessageBus: Send + Sync {
    /// Publish `payload` on `topic`.  Must not block on slow consumers.
    fn publish(&self, topic: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Subscribe with a topic filter (wildcards per [`topic::matches`]).
    ///
    /// Messages published after this call and matching the filter appear on
    /// the returned receiver until it is dropped.
    fn subscribe(&self, filter: &str) -> BusResult<Receiver<Message>>;
}

// ── MemoryBus ─────────────────────────────────────────────────────────────────

struct Subscription {
    filter: String,
    tx: Sender<Message>,
}

/// In-process bus: wildcard routing over `mpsc` channels.
///
/// Used by the integration tests and by single-process deployments that run
/// engines and control loop in one binary.  Subscribers that dropped their
/// receiver are pruned on the next publish; their missed messages are simply
/// lost, which is within the delivery contract.
#[derive(Clone, Default)]
pub struct MemoryBus {
    subs: Arc<Mutex<Vec<Subscription>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageBus for MemoryBus {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> BusResult<()> {
        let mut subs = self.subs.lock().unwrap_or_else(|e| e.into_inner());
        subs.retain(|sub| {
            if !topic::matches(&sub.filter, topic) {
                return true;
            }
            let msg = Message { topic: topic.to_owned(), payload: payload.clone() };
            // A send error means the receiver is gone — prune the entry.
            sub.tx.send(msg).is_ok()
        });
        trace!(topic, bytes = payload.len(), "published");
        Ok(())
    }

    fn subscribe(&self, filter: &str) -> BusResult<Receiver<Message>> {
        let (tx, rx) = channel();
        let mut subs = self.subs.lock().unwrap_or_else(|e| e.into_inner());
        subs.push(Subscription { filter: filter.to_owned(), tx });
        Ok(rx)
    }
}
