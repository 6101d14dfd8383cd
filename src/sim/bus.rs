/// In-process publish/subscribe — an injectable service instance, not a
/// global singleton. Synchronous and single-threaded: handlers run to
/// completion inside `publish`, in subscription insertion order. There is
/// no cross-event ordering guarantee beyond call order at the publisher.

use super::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SubscriberId(usize);

type Handler = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Handler)>,
    next_id: usize,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus { subscribers: Vec::new(), next_id: 0 }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Deliver to every subscriber before returning.
    pub fn publish(&mut self, event: &GameEvent) {
        for (_, handler) in self.subscribers.iter_mut() {
            handler(event);
        }
    }
}
