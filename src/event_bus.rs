//! Minimal FIFO event bus: the World's lifecycle operations publish
//! [`Message`]s; registered listeners are invoked once per message, in
//! registration order, during [`EventBus::poll`].

use crate::event::Message;

/// Handle returned by [`EventBus::subscribe`], usable to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    callback: Box<dyn FnMut(&Message)>,
}

/// A single World's event bus. Not shared across worlds or threads.
#[derive(Default)]
pub struct EventBus {
    queue: Vec<Message>,
    listeners: Vec<Listener>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners for the same poll cycle run in
    /// registration order.
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&Message) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a previously registered listener. Returns `true` if it was
    /// still registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Queue a message for the next [`EventBus::poll`]. Submission order
    /// within one poll cycle is preserved (FIFO).
    pub fn publish(&mut self, message: Message) {
        self.queue.push(message);
    }

    /// Dispatch every queued message, in FIFO submission order, to every
    /// listener, in registration order, then clear the queue.
    pub fn poll(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        // Messages are the outer loop, listeners the inner loop, so a
        // single message goes to every listener before the next message is
        // dispatched -- matches "listeners for the same message type
        // invoked in registration order" without needing per-type queues.
        for message in self.queue.drain(..) {
            for listener in &mut self.listeners {
                (listener.callback)(&message);
            }
        }
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}
