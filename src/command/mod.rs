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

//! One handler per protocol command.
//!
//! This module is split into several submodules for manageability but is
//! best thought of as one single module: every submodule implements a few
//! methods on the one `CommandProcessor`.

/// Maps a storage `Error` onto a command's status vocabulary, producing a
/// complete status-only response document.
///
/// Listed error kinds map to their specific status; anything else is
/// logged and becomes the command's generic server-error status.
macro_rules! map_error {
    ($this:expr, $command:expr, $fallback:expr $(,)*) => {{
        let log_prefix = &$this.log_prefix;
        move |e| {
            log::error!("{} {} failed: {}", log_prefix, $command, e);
            crate::command::defs::status_only($command, $fallback)
        }
    }};

    ($this:expr, $command:expr, $fallback:expr,
     $($($kind:ident)|+ => $status:expr,)+) => {{
        let log_prefix = &$this.log_prefix;
        move |e| match e {
            $($(crate::support::error::Error::$kind)|+ =>
                crate::command::defs::status_only($command, $status),)+
            e => {
                log::error!("{} {} failed: {}", log_prefix, $command, e);
                crate::command::defs::status_only($command, $fallback)
            },
        }
    }};
}

mod defs;
mod estimate;
mod find;
mod folder_sync;
mod folders;
mod move_items;
mod ping;
mod recipients;
mod search;
mod send_mail;

pub use self::defs::CommandProcessor;
pub use self::send_mail::{Outgoing, Submitter};
