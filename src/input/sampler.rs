//! Event sampling and scoped subscriptions
//!
//! An [`EventSampler`] filters raw input down to the kinds a tool cares
//! about and stamps every accepted event with a non-decreasing instant.
//! The [`EventBus`] fans raw input out to the samplers of mounted tools;
//! each mounted tool holds exactly one [`Subscription`], and dropping it
//! unregisters the tool so no stale handler survives a teardown.

use super::{InputEvent, InputKind, KeyCode, RawInput};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc;
use std::time::Instant;

/// Keys whose native effect (scrolling, focus changes, history navigation)
/// would interfere with a keyboard measurement
const INTERFERING_KEYS: &[KeyCode] = &[
    KeyCode::SPACE,
    KeyCode::TAB,
    KeyCode::BACKSPACE,
    KeyCode::UP,
    KeyCode::DOWN,
    KeyCode::LEFT,
    KeyCode::RIGHT,
    KeyCode::PAGE_UP,
    KeyCode::PAGE_DOWN,
    KeyCode::HOME,
    KeyCode::END,
];

/// What the host should do with a key's native default action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Let the native action happen
    PassThrough,
    /// Deliver to the tool and suppress the native action
    Suppress,
}

/// Filters and timestamps raw input for one tool
#[derive(Debug, Clone)]
pub struct EventSampler {
    kinds: Vec<InputKind>,
    last_timestamp: Option<Instant>,
    accepted: u64,
}

impl EventSampler {
    pub fn new(kinds: &[InputKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            last_timestamp: None,
            accepted: 0,
        }
    }

    pub fn accepts(&self, kind: InputKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Stamp a raw event, or ignore it if this sampler does not want it.
    ///
    /// The returned timestamp never goes backwards relative to the previous
    /// accepted event.
    pub fn sample(&mut self, input: RawInput, now: Instant) -> Option<InputEvent> {
        if !self.accepts(input.kind()) {
            return None;
        }

        let timestamp = match self.last_timestamp {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        self.accepted += 1;

        Some(InputEvent::new(input, timestamp))
    }

    /// Decide whether a key's native action should be suppressed.
    ///
    /// Keys typed into an editable field always pass through.
    pub fn key_disposition(&self, code: KeyCode, target_editable: bool) -> KeyDisposition {
        if target_editable || !self.accepts(InputKind::KeyDown) {
            return KeyDisposition::PassThrough;
        }
        if INTERFERING_KEYS.contains(&code) {
            KeyDisposition::Suppress
        } else {
            KeyDisposition::PassThrough
        }
    }

    /// Number of events accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
}

/// Outcome of dispatching one raw event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// Number of subscriptions that received the event
    pub delivered: usize,
    /// Whether any receiving subscription asked to suppress the native action
    pub disposition: KeyDisposition,
}

struct Subscriber {
    id: u64,
    sampler: EventSampler,
    tx: mpsc::Sender<InputEvent>,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Fans raw input out to subscribed samplers
#[derive(Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sampler for the given input kinds.
    ///
    /// The registration lives exactly as long as the returned [`Subscription`].
    pub fn subscribe(&self, kinds: &[InputKind]) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            sampler: EventSampler::new(kinds),
            tx,
        });
        log::debug!("subscription {} registered for {:?}", id, kinds);

        Subscription {
            id,
            rx,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver a raw event to every interested subscription
    pub fn dispatch(&self, input: RawInput, now: Instant, target_editable: bool) -> Dispatch {
        let mut delivered = 0;
        let mut disposition = KeyDisposition::PassThrough;
        let mut inner = self.inner.borrow_mut();

        inner.subscribers.retain_mut(|sub| {
            let Some(event) = sub.sampler.sample(input, now) else {
                return true;
            };
            if let RawInput::KeyDown { code, .. } | RawInput::KeyUp { code } = input {
                if sub.sampler.key_disposition(code, target_editable) == KeyDisposition::Suppress {
                    disposition = KeyDisposition::Suppress;
                }
            }
            // A failed send means the receiver is gone; drop the registration.
            match sub.tx.send(event) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });

        Dispatch {
            delivered,
            disposition,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

/// A live registration on an [`EventBus`]
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<InputEvent>,
    bus: Weak<RefCell<BusInner>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Take all events delivered since the last drain, in arrival order
    pub fn drain(&self) -> Vec<InputEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if let Ok(mut inner) = bus.try_borrow_mut() {
                inner.subscribers.retain(|sub| sub.id != self.id);
                log::debug!("subscription {} released", self.id);
            }
        }
    }
}
