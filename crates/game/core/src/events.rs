//! Topic-based synchronous event bus.
//!
//! Each character owns an [`EventBus`]. UI, AI and audio consumers subscribe to a
//! [`Topic`] and are invoked synchronously, in registration order, every time an
//! event of that topic is published. Subscribers observe attributes already in
//! their clamped, final state.

use crate::entity::EntityId;
use crate::stats::OverclockLevel;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topic {
    /// Health, stamina, chronos and overclock point changes
    Attribute,
    /// Overclock level changes
    Overclock,
    /// Boss phase changes
    Phase,
    /// Attack telegraphs
    Combat,
    /// Character death
    Lifecycle,
}

/// Events published by the combat components.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    HealthChanged { current: f32, max: f32 },
    StaminaChanged { current: f32, max: f32 },
    ChronosChanged { current: f32, max: f32 },
    OverclockPointChanged { current: f32, max: f32 },
    OverclockLevelChanged { level: OverclockLevel },
    PhaseChanged { phase: usize },
    /// Telegraph for the perfect-dodge window of an incoming attack.
    AttackWarning { duration: f32 },
    CharacterDeath { character: EntityId },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::HealthChanged { .. }
            | Event::StaminaChanged { .. }
            | Event::ChronosChanged { .. }
            | Event::OverclockPointChanged { .. } => Topic::Attribute,
            Event::OverclockLevelChanged { .. } => Topic::Overclock,
            Event::PhaseChanged { .. } => Topic::Phase,
            Event::AttackWarning { .. } => Topic::Combat,
            Event::CharacterDeath { .. } => Topic::Lifecycle,
        }
    }
}

/// Identifies one subscription for later removal.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Event)>;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

/// Ordered observer list keyed by topic.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    published: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every event of `topic`.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            topic,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns false if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        before != self.subscribers.len()
    }

    /// Invokes every subscriber of the event's topic, in registration order.
    pub fn publish(&mut self, event: Event) {
        let topic = event.topic();
        self.published += 1;
        let mut delivered = 0usize;
        for subscriber in self.subscribers.iter_mut().filter(|s| s.topic == topic) {
            (subscriber.handler)(&event);
            delivered += 1;
        }
        if delivered == 0 {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "combat::events", %topic, "event published without subscribers");
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers.iter().filter(|s| s.topic == topic).count()
    }

    /// Total number of events published on this bus.
    pub fn published_count(&self) -> u64 {
        self.published
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("published", &self.published)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribers_run_in_registration_order_per_topic() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(Topic::Phase, move |event| {
                log.borrow_mut().push((name, event.clone()));
            });
        }
        let other = Rc::clone(&log);
        bus.subscribe(Topic::Lifecycle, move |event| {
            other.borrow_mut().push(("death", event.clone()));
        });

        bus.publish(Event::PhaseChanged { phase: 1 });

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, "first");
        assert_eq!(log[1].0, "second");
        assert_eq!(log[1].1, Event::PhaseChanged { phase: 1 });
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = bus.subscribe(Topic::Combat, move |_| *counter.borrow_mut() += 1);

        bus.publish(Event::AttackWarning { duration: 0.5 });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(Event::AttackWarning { duration: 0.5 });

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.published_count(), 2);
    }

    #[test]
    fn event_topics() {
        assert_eq!(Event::HealthChanged { current: 1.0, max: 2.0 }.topic(), Topic::Attribute);
        assert_eq!(
            Event::CharacterDeath { character: EntityId(3) }.topic(),
            Topic::Lifecycle
        );
    }
}
