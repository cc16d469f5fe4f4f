// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::bus::MessageBus;
use super::message::MessageKind;
use super::subscriber::Subscriber;
use std::fmt;
use std::rc::{Rc, Weak};

/// A scope guard holding a subscriber's registrations.
///
/// Construction subscribes the subscriber to every listed kind; dropping the
/// guard unsubscribes it from every one of them. A routine keeps the guard
/// inside its task, so the registrations live exactly as long as the task
/// and are released even when the scheduler discards the task mid-run.
///
/// ```rust
/// use spindle_core::{AutoSubscribe, MessageBus, MessageKind, Subscriber};
/// use std::rc::Rc;
///
/// struct Hud;
/// impl Subscriber for Hud {}
///
/// let bus = MessageBus::new();
/// let hud = Rc::new(Hud);
/// {
///     let _guard = AutoSubscribe::new(&bus, &hud, [MessageKind::Quit, MessageKind::StateChange]);
///     assert!(bus.is_subscribed(MessageKind::Quit, &hud));
/// }
/// assert!(!bus.is_subscribed(MessageKind::Quit, &hud));
/// ```
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct AutoSubscribe {
    bus: MessageBus,
    subscriber: Weak<dyn Subscriber>,
    kinds: Vec<MessageKind>,
}

impl AutoSubscribe {
    /// Subscribes `subscriber` to every kind in `kinds`, in order.
    ///
    /// Repeated kinds are only subscribed once.
    ///
    /// # Panics
    ///
    /// Panics if `subscriber` is already registered for one of the kinds.
    pub fn new<S: Subscriber + 'static>(
        bus: &MessageBus,
        subscriber: &Rc<S>,
        kinds: impl IntoIterator<Item = MessageKind>,
    ) -> Self {
        let weak: Weak<S> = Rc::downgrade(subscriber);
        let weak: Weak<dyn Subscriber> = weak;
        let mut subscribed = Vec::new();
        for kind in kinds {
            if subscribed.contains(&kind) {
                continue;
            }
            bus.subscribe_weak(kind, weak.clone());
            subscribed.push(kind);
        }
        Self {
            bus: bus.clone(),
            subscriber: weak,
            kinds: subscribed,
        }
    }

    /// Returns the kinds this guard holds registrations for.
    pub fn kinds(&self) -> &[MessageKind] {
        &self.kinds
    }
}

impl Drop for AutoSubscribe {
    fn drop(&mut self) {
        for kind in &self.kinds {
            if !self.bus.unsubscribe_weak(*kind, &self.subscriber) {
                log::warn!("AutoSubscribe: registration for {kind} was already removed.");
            }
        }
    }
}

impl fmt::Debug for AutoSubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSubscribe")
            .field("kinds", &self.kinds)
            .finish()
    }
}
