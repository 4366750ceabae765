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

use crossbeam::channel::Receiver;
use log::warn;

use super::defs::*;
use crate::model::GroupId;
use crate::protocol::document::{Document, Node};
use crate::protocol::status::PingStatus;
use crate::store::data_class_for_id;
use crate::sync::monitor::{check_heartbeat, ChangeMonitor, Outcome};

impl CommandProcessor {
    /// The change-notification long poll.
    ///
    /// Blocks the calling thread for up to the (bounded) heartbeat. `None`
    /// means the wait was cancelled through `cancel` and no response is to
    /// be written; the front end closes out the pending request itself.
    ///
    /// A request may omit the heartbeat, the folder list, or both; the
    /// omitted parameters are taken from the previous successful call, and
    /// only if there is none does the command fail with the
    /// missing-parameters status.
    pub fn cmd_ping(
        &mut self,
        req: &Document,
        cancel: &Receiver<()>,
    ) -> Option<Document> {
        const CMD: &str = "Ping";

        let heartbeat = match req.get("HeartbeatInterval") {
            None => None,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(value) => Some(value),
                Err(_) => {
                    return Some(status_only(
                        CMD,
                        PingStatus::SyntaxError.code(),
                    ));
                }
            },
        };

        // Unresolvable folder ids are dropped, never fatal; a set that
        // resolves to nothing still waits out the full heartbeat, since
        // nothing can trigger a change for it.
        let monitored = match req.child("Folders") {
            None => None,
            Some(folders) => {
                let mut resolved = Vec::new();
                for folder in folders.children_named("Folder") {
                    let id = folder.value().unwrap_or("");
                    match self.resolve_monitored(id) {
                        Some(entry) => resolved.push(entry),
                        None => warn!(
                            "{} Ping: dropping unmonitorable folder {:?}",
                            self.log_prefix, id
                        ),
                    }
                }
                Some(resolved)
            }
        };

        let params = match (heartbeat, monitored, self.last_ping.clone()) {
            (Some(heartbeat), Some(monitored), _) => PingParams {
                heartbeat,
                monitored,
            },
            (heartbeat, monitored, Some(cached)) => PingParams {
                heartbeat: heartbeat.unwrap_or(cached.heartbeat),
                monitored: monitored.unwrap_or(cached.monitored),
            },
            (_, _, None) => {
                return Some(status_only(
                    CMD,
                    PingStatus::MissingParameters.code(),
                ));
            }
        };

        let duration = match check_heartbeat(
            self.config.ping.min_heartbeat,
            self.config.ping.max_heartbeat,
            params.heartbeat,
        ) {
            Ok(duration) => duration,
            Err(bound) => {
                let mut response =
                    status_only(CMD, PingStatus::HeartbeatOutOfRange.code());
                response.set("HeartbeatInterval", bound);
                return Some(response);
            }
        };

        self.last_ping = Some(params.clone());

        let monitor = ChangeMonitor::new(&*self.store, &self.log_prefix);
        match monitor.wait(&params.monitored, duration, cancel) {
            Outcome::Changed(changed) => {
                let mut response =
                    status_only(CMD, PingStatus::Changed.code());
                let mut folders = Node::new("Folders");
                for group in changed {
                    folders.push(Node::text("Folder", group));
                }
                response.push(folders);
                Some(response)
            }
            Outcome::Expired => {
                Some(status_only(CMD, PingStatus::Expired.code()))
            }
            Outcome::Canceled => None,
        }
    }

    /// Resolve one requested folder id into a monitorable entry, or nothing
    /// if its class is unknown or disabled or the folder does not exist.
    fn resolve_monitored(
        &self,
        id: &str,
    ) -> Option<(GroupId, crate::model::DataClass)> {
        let class =
            data_class_for_id(id).filter(|&c| self.class_enabled(c))?;
        let group = GroupId(id.to_owned());
        self.store.group_by_id(class, &group).ok()?;
        Some((group, class))
    }
}
