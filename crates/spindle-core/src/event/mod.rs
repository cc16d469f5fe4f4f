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

//! Synchronous publish/subscribe messaging between routines.
//!
//! Routines never hold references to one another. Instead they post
//! [`Message`]s on a shared [`MessageBus`], which immediately calls the
//! matching [`Subscriber`] method of every registered subscriber, in
//! subscription order, on the poster's stack.
//!
//! The bus only keeps weak references to its subscribers. Registration is
//! normally scoped with an [`AutoSubscribe`] guard so that a subscriber is
//! unregistered when the routine owning it goes away.

mod auto_subscribe;
mod bus;
mod message;
mod subscriber;

pub use self::auto_subscribe::AutoSubscribe;
pub use self::bus::MessageBus;
pub use self::message::{ButtonState, EntityId, KeyCode, Message, MessageKind};
pub use self::subscriber::Subscriber;
