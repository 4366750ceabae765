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

use serde::{Deserialize, Serialize};

use crate::support::error::Error;

/// The system-wide configuration for the sync engine.
///
/// The embedding front end typically loads this from a TOML file shared with
/// its own transport settings and hands it to the `CommandProcessor`.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct SystemConfig {
    /// Bounds applied to the Ping long poll.
    #[serde(default)]
    pub ping: PingConfig,

    /// Budgets applied to search and recipient resolution.
    #[serde(default)]
    pub search: SearchConfig,

    /// Which data classes are served at all.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl SystemConfig {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PingConfig {
    /// The smallest heartbeat interval (seconds) a client may request.
    ///
    /// Requests below this are rejected with the "out of range" status and
    /// this value as the server's suggestion, without entering the wait
    /// loop.
    pub min_heartbeat: u32,

    /// The largest heartbeat interval (seconds) a client may request.
    ///
    /// This bounds how long a single Ping request can occupy a connection.
    /// Mobile clients conventionally negotiate something close to the
    /// carrier's NAT timeout.
    pub max_heartbeat: u32,
}

impl Default for PingConfig {
    fn default() -> Self {
        PingConfig {
            min_heartbeat: 60,
            max_heartbeat: 3540,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result window size used when a request does not specify a range.
    pub default_window: u32,

    /// Hard cap on entries served with full payload in one page. Entries
    /// past the cap are still listed, degraded to the "limit reached"
    /// status.
    pub max_items: usize,

    /// Total bytes of contact photo data attached to one response.
    pub max_picture_bytes: usize,

    /// Total number of contact photos attached to one response.
    pub max_pictures: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_window: 100,
            max_items: 100,
            max_picture_bytes: 100 * 1024,
            max_pictures: 20,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Data classes (by canonical name, e.g. `"Notes"`) that are disabled.
    ///
    /// Monitored-folder ids resolving to a disabled class are dropped from
    /// Ping requests with a warning rather than failing the call.
    pub disabled_classes: Vec<String>,
}
