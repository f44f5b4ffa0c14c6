//! Transport attach/detach notification.
//!
//! A wireless transport (e.g. a Bluetooth HID host) reports devices coming
//! and going. Instead of static callbacks pointing at a global instance,
//! the transport owner holds a [`LinkBus`] and publishes [`LinkEvent`]s to
//! it; each source gets its own [`LinkSubscription`] once at construction
//! and drains it on every refresh.
//!
//! Several sources may listen on the same bus. Each one filters events by
//! [`DeviceClass`] through a [`DeviceSlot`], so a keyboard attaching does
//! not hijack the gamepad source.
//!
//! # Example
//!
//! ```rust
//! use tank_control::link::{DeviceClass, DeviceHandle, LinkBus, LinkEvent};
//!
//! let mut bus = LinkBus::new();
//! let mut pad = bus.subscribe();
//! let mut keys = bus.subscribe();
//!
//! bus.publish(LinkEvent::Attached {
//!     handle: DeviceHandle(1),
//!     class: DeviceClass::Keyboard,
//! });
//!
//! assert!(pad.poll().is_some());
//! assert!(keys.poll().is_some());
//! assert!(pad.poll().is_none());
//! ```
//!
//! The bus and its subscriptions share state through `Rc<RefCell<_>>`; the
//! whole arrangement is single-threaded, matching the cooperative poll
//! loop.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use heapless::Deque;
use tracing::{info, warn};

/// Events buffered per subscriber between two refreshes.
pub const SUBSCRIPTION_CAPACITY: usize = 8;

/// Opaque transport-assigned device identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceHandle(pub u8);

/// Capability tag attached to a device by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceClass {
    /// Gamepad / joystick.
    Gamepad,
    /// Keyboard.
    Keyboard,
    /// Mouse.
    Mouse,
    /// Anything else.
    Other,
}

/// Device attach or detach notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LinkEvent {
    /// A device connected.
    Attached {
        /// Transport handle.
        handle: DeviceHandle,
        /// What kind of device it is.
        class: DeviceClass,
    },
    /// A device disconnected.
    Detached {
        /// Transport handle.
        handle: DeviceHandle,
    },
}

/// Pending events for one subscriber.
#[derive(Debug, Default)]
struct Inbox {
    events: Deque<LinkEvent, SUBSCRIPTION_CAPACITY>,
    lost_detach: bool,
}

impl Inbox {
    fn push(&mut self, event: LinkEvent) {
        if self.events.is_full() {
            self.make_room();
        }
        let _ = self.events.push_back(event);
    }

    /// Evict the oldest pending attach. Detaches are only dropped when the
    /// queue holds nothing else, and that is remembered in `lost_detach`.
    fn make_room(&mut self) {
        let mut kept = Deque::new();
        let mut dropped = None;
        while let Some(event) = self.events.pop_front() {
            if dropped.is_none() && matches!(event, LinkEvent::Attached { .. }) {
                dropped = Some(event);
            } else {
                let _ = kept.push_back(event);
            }
        }
        self.events = kept;
        if dropped.is_none() {
            dropped = self.events.pop_front();
            self.lost_detach = true;
        }
        warn!(?dropped, "link subscription full, dropping event");
    }
}

type Queue = RefCell<Inbox>;

/// Fan-out publisher for link events.
#[derive(Debug, Default)]
pub struct LinkBus {
    subscribers: Vec<Weak<Queue>>,
}

impl LinkBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    ///
    /// The subscription receives only events published after this call.
    pub fn subscribe(&mut self) -> LinkSubscription {
        let queue = Rc::new(RefCell::new(Inbox::default()));
        self.subscribers.push(Rc::downgrade(&queue));
        LinkSubscription { queue }
    }

    /// Deliver `event` to every live subscriber.
    ///
    /// Subscribers that have been dropped are pruned. A full subscriber
    /// loses its oldest pending attach; detaches are kept while any attach
    /// can be evicted instead.
    pub fn publish(&mut self, event: LinkEvent) {
        self.subscribers.retain(|weak| {
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            shared.borrow_mut().push(event);
            true
        });
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// Receiving end of a [`LinkBus`] registration.
///
/// Dropping it releases the registration.
#[derive(Debug)]
pub struct LinkSubscription {
    queue: Rc<Queue>,
}

impl LinkSubscription {
    /// A subscription attached to no bus; never yields events.
    pub fn detached() -> Self {
        Self {
            queue: Rc::new(RefCell::new(Inbox::default())),
        }
    }

    /// Pop the oldest pending event.
    pub fn poll(&mut self) -> Option<LinkEvent> {
        self.queue.borrow_mut().events.pop_front()
    }

    /// Number of pending events.
    pub fn pending(&self) -> usize {
        self.queue.borrow().events.len()
    }

    /// Whether a detach was dropped on overflow since the last call.
    ///
    /// Clears the flag. The lost event may have been for any device, so a
    /// holder should treat its own device as gone.
    pub fn take_lost_detach(&mut self) -> bool {
        core::mem::take(&mut self.queue.borrow_mut().lost_detach)
    }
}

/// What a [`DeviceSlot`] did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotChange {
    /// The slot adopted this device.
    Attached(DeviceHandle),
    /// The held device went away.
    Detached(DeviceHandle),
}

/// Holds at most one device of a given class.
///
/// The first matching attach is adopted; further attaches are ignored
/// until the held device detaches.
#[derive(Clone, Debug)]
pub struct DeviceSlot {
    class: DeviceClass,
    held: Option<DeviceHandle>,
}

impl DeviceSlot {
    /// Create an empty slot filtering on `class`.
    pub const fn new(class: DeviceClass) -> Self {
        Self { class, held: None }
    }

    /// The class this slot accepts.
    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Currently held device.
    pub fn held(&self) -> Option<DeviceHandle> {
        self.held
    }

    /// Forget the held device, as if it had detached.
    pub fn release(&mut self) -> Option<SlotChange> {
        let handle = self.held.take()?;
        warn!(class = ?self.class, handle = handle.0, "device released");
        Some(SlotChange::Detached(handle))
    }

    /// Feed one event through the filter.
    pub fn accept(&mut self, event: LinkEvent) -> Option<SlotChange> {
        match event {
            LinkEvent::Attached { handle, class } => {
                if class != self.class || self.held.is_some() {
                    return None;
                }
                info!(?class, handle = handle.0, "device attached");
                self.held = Some(handle);
                Some(SlotChange::Attached(handle))
            }
            LinkEvent::Detached { handle } => {
                if self.held != Some(handle) {
                    return None;
                }
                info!(class = ?self.class, handle = handle.0, "device detached");
                self.held = None;
                Some(SlotChange::Detached(handle))
            }
        }
    }
}
