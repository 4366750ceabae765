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

//! The change-notification long poll behind the Ping command.
//!
//! The monitor blocks the calling thread until a monitored folder reports
//! pending changes, the heartbeat deadline passes, or the supervising
//! session cancels the request. It never commits to a long sleep: each
//! pass re-checks storage and then waits at most one second on the cancel
//! channel, so an external cancellation or deadline crossing is observed
//! with at most one second of latency.

use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::warn;

use crate::model::{DataClass, GroupId};
use crate::store::RecordStore;
use crate::support::log_prefix::LogPrefix;

/// How one wait ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// At least one monitored folder has records pending sync.
    Changed(Vec<GroupId>),
    /// The heartbeat elapsed with nothing to report.
    Expired,
    /// The supervising session ended the request, or storage became
    /// unusable mid-wait. Either way the handler exits quietly; no further
    /// response is written.
    Canceled,
}

/// Bound-check a requested heartbeat against the configured window.
///
/// An out-of-range request is rejected with the nearest acceptable bound,
/// which the handler reports back as the server's suggestion.
pub fn check_heartbeat(
    min_heartbeat: u32,
    max_heartbeat: u32,
    requested: u32,
) -> Result<Duration, u32> {
    if requested < min_heartbeat {
        Err(min_heartbeat)
    } else if requested > max_heartbeat {
        Err(max_heartbeat)
    } else {
        Ok(Duration::from_secs(u64::from(requested)))
    }
}

pub struct ChangeMonitor<'a> {
    store: &'a dyn RecordStore,
    log_prefix: &'a LogPrefix,
}

impl<'a> ChangeMonitor<'a> {
    pub fn new(store: &'a dyn RecordStore, log_prefix: &'a LogPrefix) -> Self {
        ChangeMonitor { store, log_prefix }
    }

    /// Wait until a monitored folder changes, `heartbeat` elapses, or
    /// `cancel` delivers.
    ///
    /// A message on `cancel` --- or its sender being gone, which means the
    /// supervising session is --- yields `Canceled`. A storage failure
    /// while refreshing or querying is a hard stop of the wait, also
    /// surfaced as `Canceled`; it is logged but not retried within this
    /// call.
    ///
    /// An empty `monitored` set is legal: nothing can trigger `Changed`,
    /// so the wait runs out the heartbeat and reports `Expired`.
    pub fn wait(
        &self,
        monitored: &[(GroupId, DataClass)],
        heartbeat: Duration,
        cancel: &Receiver<()>,
    ) -> Outcome {
        let deadline = Instant::now() + heartbeat;

        let mut classes: Vec<DataClass> =
            monitored.iter().map(|&(_, class)| class).collect();
        classes.sort_unstable();
        classes.dedup();

        loop {
            for &class in &classes {
                if let Err(e) = self.store.refresh(class) {
                    warn!(
                        "{} Ping: refreshing {} failed, ending wait: {}",
                        self.log_prefix, class, e
                    );
                    return Outcome::Canceled;
                }
            }

            let mut changed = Vec::new();
            for (group, class) in monitored {
                match self.store.list_records_needing_sync(*class, group) {
                    Ok(pending) if !pending.is_empty() => {
                        changed.push(group.clone());
                    }
                    Ok(_) => (),
                    Err(e) => {
                        warn!(
                            "{} Ping: querying {} failed, ending wait: {}",
                            self.log_prefix, group, e
                        );
                        return Outcome::Canceled;
                    }
                }
            }

            if !changed.is_empty() {
                return Outcome::Changed(changed);
            }

            let now = Instant::now();
            if now >= deadline {
                return Outcome::Expired;
            }

            // Sleep in one-second slices at most, on the cancel channel
            // itself, so cancellation wakes us immediately.
            let slice = (deadline - now).min(Duration::from_secs(1));
            match cancel.recv_timeout(slice) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    return Outcome::Canceled;
                }
                Err(RecvTimeoutError::Timeout) => (),
            }
        }
    }
}
