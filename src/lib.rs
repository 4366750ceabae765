//-
// Copyright (c) 2025, 2026, the Airsync authors
//
// This file is part of Airsync.
//
// Airsync is free software: you can redistribute it and/or modify it under
// the terms of  the GNU General Public  License as published by  the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Airsync is distributed  in the hope that  it will be useful,  but WITHOUT
// ANY WARRANTY; without even  the implied warranty of  MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Airsync. If not, see <http://www.gnu.org/licenses/>.

//! Airsync implements the server side of a mobile mailbox synchronisation
//! protocol: the command handlers that turn request documents into response
//! documents while consulting and mutating shared synchronisation state.
//!
//! The crate is an engine, not a server. Everything sensitive to the actual
//! wire format --- command name dispatch, binary⇄tree encoding of the
//! protocol envelope, HTTP status mapping, credential checks --- lives in
//! whatever front end embeds this crate. The engine consumes an opaque
//! request [`protocol::document::Document`], a resolved
//! [`protocol::options::CommandOptions`] bag, and a
//! [`store::RecordStore`] implementation, and produces a response document
//! plus a per-command integer status.
//!
//! The interesting parts are under `sync`:
//!
//! - `sync::key_store` --- the versioned checkpoint ("sync key") state
//!   machine shared by all hierarchy-mutating commands.
//! - `sync::hierarchy` --- folder-hierarchy delta enumeration.
//! - `sync::monitor` --- the change-notification long poll ("Ping").
//! - `sync::cursor` --- stateful, paginated search.
//!
//! `command` composes those into one handler per protocol command.

#[cfg(test)]
macro_rules! assert_matches {
    ($expected:pat, $actual:expr) => {
        match $actual {
            $expected => (),
            unexpected => panic!(
                "Expected {} matches {}, got {:?}",
                stringify!($expected),
                stringify!($actual),
                unexpected
            ),
        }
    };
}

pub mod command;
pub mod model;
pub mod protocol;
pub mod store;
pub mod support;
pub mod sync;
