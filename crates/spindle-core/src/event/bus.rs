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

use super::message::{ButtonState, EntityId, KeyCode, Message, MessageKind};
use super::subscriber::Subscriber;
use crate::state::GameState;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

type SubscriberList = Vec<Weak<dyn Subscriber>>;

/// Routes messages to subscribers, synchronously.
///
/// The bus is a cheap handle: clones share the same subscriber table. It
/// never owns its subscribers; it keeps a weak reference per
/// `(kind, subscriber)` pair and skips subscribers that were dropped without
/// unsubscribing, logging a warning.
///
/// Posting is re-entrant: a handler may post further messages, which are
/// dispatched in full before the outer dispatch moves on to its next
/// subscriber.
#[derive(Clone)]
pub struct MessageBus {
    table: Rc<RefCell<HashMap<MessageKind, SubscriberList>>>,
}

impl MessageBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        log::debug!("MessageBus initialized.");
        Self {
            table: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Registers `subscriber` for messages of `kind`, after the existing ones.
    ///
    /// Prefer [`AutoSubscribe`](super::AutoSubscribe), which unregisters
    /// automatically.
    ///
    /// # Panics
    ///
    /// Panics if `subscriber` is already registered for `kind`.
    pub fn subscribe<S: Subscriber + 'static>(&self, kind: MessageKind, subscriber: &Rc<S>) {
        let weak: Weak<S> = Rc::downgrade(subscriber);
        self.subscribe_weak(kind, weak);
    }

    /// Unregisters `subscriber` from messages of `kind`.
    ///
    /// Returns `false` if it was not registered.
    pub fn unsubscribe<S: Subscriber + 'static>(
        &self,
        kind: MessageKind,
        subscriber: &Rc<S>,
    ) -> bool {
        let weak: Weak<S> = Rc::downgrade(subscriber);
        let weak: Weak<dyn Subscriber> = weak;
        self.unsubscribe_weak(kind, &weak)
    }

    /// Returns `true` if `subscriber` is registered for messages of `kind`.
    pub fn is_subscribed<S: Subscriber + 'static>(
        &self,
        kind: MessageKind,
        subscriber: &Rc<S>,
    ) -> bool {
        let weak: Weak<S> = Rc::downgrade(subscriber);
        let weak: Weak<dyn Subscriber> = weak;
        self.contains(kind, &weak)
    }

    /// Returns the number of registrations for messages of `kind`.
    pub fn subscriber_count(&self, kind: MessageKind) -> usize {
        self.table.borrow().get(&kind).map_or(0, Vec::len)
    }

    /// Delivers `message` to every subscriber of its kind, in subscription order.
    ///
    /// A subscriber unregistered by an earlier handler of the same dispatch is
    /// not called; one registered during the dispatch is first called by the
    /// next post.
    pub fn post(&self, message: Message) {
        let kind = message.kind();
        let snapshot: SubscriberList = self
            .table
            .borrow()
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        log::trace!(
            "MessageBus: posting {kind} to {} subscriber(s).",
            snapshot.len()
        );

        let mut found_dead = false;
        for weak in &snapshot {
            let Some(subscriber) = weak.upgrade() else {
                found_dead = true;
                continue;
            };
            if !self.contains(kind, weak) {
                continue;
            }
            message.deliver(subscriber.as_ref());
        }

        if found_dead {
            self.prune(kind);
        }
    }

    /// Posts a [`Message::KeyPress`].
    pub fn post_key_press(&self, key: KeyCode, state: ButtonState) {
        self.post(Message::KeyPress { key, state });
    }

    /// Posts a [`Message::MouseMove`].
    pub fn post_mouse_move(&self, dx: f64, dy: f64) {
        self.post(Message::MouseMove { dx, dy });
    }

    /// Posts a [`Message::MouseButton`].
    pub fn post_mouse_button(&self, x: f64, y: f64, state: ButtonState) {
        self.post(Message::MouseButton { x, y, state });
    }

    /// Posts a [`Message::MouseScroll`].
    pub fn post_mouse_scroll(&self, dx: f64, dy: f64) {
        self.post(Message::MouseScroll { dx, dy });
    }

    /// Posts a [`Message::LevelComplete`].
    pub fn post_level_complete(&self, level: impl Into<String>) {
        self.post(Message::LevelComplete {
            level: level.into(),
        });
    }

    /// Posts a [`Message::EntityIntersect`].
    pub fn post_entity_intersect(&self, first: EntityId, second: EntityId) {
        self.post(Message::EntityIntersect { first, second });
    }

    /// Posts a [`Message::RestartLevel`].
    pub fn post_restart_level(&self) {
        self.post(Message::RestartLevel);
    }

    /// Posts a [`Message::Quit`].
    pub fn post_quit(&self) {
        self.post(Message::Quit);
    }

    /// Posts a [`Message::StateChange`].
    pub fn post_state_change(&self, state: GameState) {
        self.post(Message::StateChange(state));
    }

    pub(crate) fn subscribe_weak(&self, kind: MessageKind, subscriber: Weak<dyn Subscriber>) {
        let name = subscriber_name(&subscriber);
        let mut table = self.table.borrow_mut();
        let list = table.entry(kind).or_default();
        if list.iter().any(|existing| existing.ptr_eq(&subscriber)) {
            panic!("subscriber '{name}' is already subscribed to {kind}");
        }
        list.push(subscriber);
        log::debug!(
            "MessageBus: '{name}' subscribed to {kind} ({} subscriber(s)).",
            list.len()
        );
    }

    pub(crate) fn unsubscribe_weak(&self, kind: MessageKind, subscriber: &Weak<dyn Subscriber>) -> bool {
        let mut table = self.table.borrow_mut();
        let Some(list) = table.get_mut(&kind) else {
            return false;
        };
        let Some(position) = list.iter().position(|existing| existing.ptr_eq(subscriber)) else {
            return false;
        };
        list.remove(position);
        log::debug!("MessageBus: subscriber removed from {kind}.");
        true
    }

    fn contains(&self, kind: MessageKind, subscriber: &Weak<dyn Subscriber>) -> bool {
        self.table
            .borrow()
            .get(&kind)
            .is_some_and(|list| list.iter().any(|existing| existing.ptr_eq(subscriber)))
    }

    fn prune(&self, kind: MessageKind) {
        let mut table = self.table.borrow_mut();
        if let Some(list) = table.get_mut(&kind) {
            let before = list.len();
            list.retain(|weak| weak.strong_count() > 0);
            let dropped = before - list.len();
            if dropped > 0 {
                log::warn!(
                    "MessageBus: pruned {dropped} subscriber(s) of {kind} dropped without unsubscribing."
                );
            }
        }
    }
}

fn subscriber_name(subscriber: &Weak<dyn Subscriber>) -> String {
    subscriber
        .upgrade()
        .map_or_else(|| "<dropped>".to_string(), |s| s.name().to_string())
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        let mut counts: Vec<(MessageKind, usize)> =
            table.iter().map(|(kind, list)| (*kind, list.len())).collect();
        counts.sort_unstable();
        f.debug_struct("MessageBus").field("subscribers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    type Journal = Rc<RefCell<Vec<String>>>;

    /// Records every message it handles into a shared journal.
    struct Recorder {
        name: &'static str,
        journal: Journal,
    }

    impl Recorder {
        fn new(name: &'static str, journal: &Journal) -> Rc<Self> {
            Rc::new(Self {
                name,
                journal: journal.clone(),
            })
        }
    }

    impl Subscriber for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn handle_key_press(&self, key: KeyCode, state: ButtonState) {
            self.journal
                .borrow_mut()
                .push(format!("{}:key {} {:?}", self.name, key.0, state));
        }

        fn handle_quit(&self) {
            self.journal.borrow_mut().push(format!("{}:quit", self.name));
        }

        fn handle_state_change(&self, state: GameState) {
            self.journal
                .borrow_mut()
                .push(format!("{}:state {state}", self.name));
        }
    }

    #[test]
    fn single_subscriber_receives_equal_payload_once() {
        #[derive(Default)]
        struct KeyRecorder {
            received: RefCell<Vec<(KeyCode, ButtonState)>>,
        }
        impl Subscriber for KeyRecorder {
            fn handle_key_press(&self, key: KeyCode, state: ButtonState) {
                self.received.borrow_mut().push((key, state));
            }
        }

        let bus = MessageBus::new();
        let recorder = Rc::new(KeyRecorder::default());
        bus.subscribe(MessageKind::KeyPress, &recorder);

        bus.post_key_press(KeyCode(65), ButtonState::Pressed);

        assert_eq!(
            *recorder.received.borrow(),
            vec![(KeyCode(65), ButtonState::Pressed)]
        );
    }

    #[test]
    #[should_panic(expected = "already subscribed to KEY_PRESS")]
    fn duplicate_subscription_panics() {
        let journal = Journal::default();
        let bus = MessageBus::new();
        let recorder = Recorder::new("input", &journal);

        bus.subscribe(MessageKind::KeyPress, &recorder);
        bus.subscribe(MessageKind::KeyPress, &recorder);
    }

    #[test]
    fn same_subscriber_may_register_for_several_kinds() {
        let journal = Journal::default();
        let bus = MessageBus::new();
        let recorder = Recorder::new("menu", &journal);

        bus.subscribe(MessageKind::KeyPress, &recorder);
        bus.subscribe(MessageKind::Quit, &recorder);
        bus.post_quit();
        bus.post_key_press(KeyCode::ESCAPE, ButtonState::Released);

        assert_eq!(*journal.borrow(), ["menu:quit", "menu:key 256 Released"]);
    }

    #[test]
    fn dispatch_follows_subscription_order() {
        let journal = Journal::default();
        let bus = MessageBus::new();
        let first = Recorder::new("first", &journal);
        let second = Recorder::new("second", &journal);
        let third = Recorder::new("third", &journal);

        bus.subscribe(MessageKind::Quit, &second);
        bus.subscribe(MessageKind::Quit, &first);
        bus.subscribe(MessageKind::Quit, &third);
        bus.post_quit();

        assert_eq!(
            *journal.borrow(),
            ["second:quit", "first:quit", "third:quit"]
        );
    }

    #[test]
    fn posts_only_reach_their_own_kind() {
        let journal = Journal::default();
        let bus = MessageBus::new();
        let recorder = Recorder::new("sound", &journal);

        bus.subscribe(MessageKind::StateChange, &recorder);
        bus.post_quit();
        bus.post_key_press(KeyCode::SPACE, ButtonState::Pressed);
        bus.post_state_change(GameState::Running);

        assert_eq!(*journal.borrow(), ["sound:state RUNNING"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let journal = Journal::default();
        let bus = MessageBus::new();
        let recorder = Recorder::new("level", &journal);

        bus.subscribe(MessageKind::Quit, &recorder);
        assert!(bus.unsubscribe(MessageKind::Quit, &recorder));
        assert!(!bus.unsubscribe(MessageKind::Quit, &recorder));
        bus.post_quit();

        assert!(journal.borrow().is_empty());
        assert_eq!(bus.subscriber_count(MessageKind::Quit), 0);
    }

    #[test]
    fn reentrant_post_is_dispatched_depth_first() {
        /// Turns QUIT into a STATE_CHANGE(EXITING), like a game director would.
        struct Director {
            bus: MessageBus,
            journal: Journal,
        }
        impl Subscriber for Director {
            fn handle_quit(&self) {
                self.journal.borrow_mut().push("director:quit".to_string());
                self.bus.post_state_change(GameState::Exiting);
                self.journal.borrow_mut().push("director:done".to_string());
            }
        }

        let journal = Journal::default();
        let bus = MessageBus::new();
        let director = Rc::new(Director {
            bus: bus.clone(),
            journal: journal.clone(),
        });
        let watcher = Recorder::new("watcher", &journal);

        bus.subscribe(MessageKind::Quit, &director);
        bus.subscribe(MessageKind::Quit, &watcher);
        bus.subscribe(MessageKind::StateChange, &watcher);
        bus.post_quit();

        assert_eq!(
            *journal.borrow(),
            [
                "director:quit",
                "watcher:state EXITING",
                "director:done",
                "watcher:quit"
            ]
        );
    }

    #[test]
    fn subscriber_removed_mid_dispatch_is_skipped() {
        /// Unregisters a peer when it sees QUIT.
        struct Remover {
            bus: MessageBus,
            victim: Rc<Recorder>,
            fired: Cell<bool>,
        }
        impl Subscriber for Remover {
            fn handle_quit(&self) {
                self.fired.set(true);
                self.bus.unsubscribe(MessageKind::Quit, &self.victim);
            }
        }

        let journal = Journal::default();
        let bus = MessageBus::new();
        let victim = Recorder::new("victim", &journal);
        let remover = Rc::new(Remover {
            bus: bus.clone(),
            victim: victim.clone(),
            fired: Cell::new(false),
        });

        bus.subscribe(MessageKind::Quit, &remover);
        bus.subscribe(MessageKind::Quit, &victim);
        bus.post_quit();

        assert!(remover.fired.get());
        assert!(journal.borrow().is_empty());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let journal = Journal::default();
        let bus = MessageBus::new();
        let survivor = Recorder::new("survivor", &journal);
        {
            let transient = Recorder::new("transient", &journal);
            bus.subscribe(MessageKind::Quit, &transient);
        }
        bus.subscribe(MessageKind::Quit, &survivor);
        assert_eq!(bus.subscriber_count(MessageKind::Quit), 2);

        bus.post_quit();

        assert_eq!(*journal.borrow(), ["survivor:quit"]);
        assert_eq!(bus.subscriber_count(MessageKind::Quit), 1);
    }

    #[test]
    fn clones_share_the_subscriber_table() {
        let journal = Journal::default();
        let bus = MessageBus::new();
        let handle = bus.clone();
        let recorder = Recorder::new("render", &journal);

        handle.subscribe(MessageKind::StateChange, &recorder);
        bus.post(Message::StateChange(GameState::Paused));

        assert!(bus.is_subscribed(MessageKind::StateChange, &recorder));
        assert_eq!(*journal.borrow(), ["render:state PAUSED"]);
    }
}
