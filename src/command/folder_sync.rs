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

use super::defs::*;
use crate::model::DataClass;
use crate::protocol::document::{Document, Node};
use crate::protocol::status::FolderSyncStatus;
use crate::sync::hierarchy::{ChangeKind, DeltaEnumerator, FolderChange};
use crate::sync::key_store::{KeyValidation, SyncScope};

const CMD: &str = "FolderSync";

impl CommandProcessor {
    pub fn cmd_folder_sync(&mut self, req: &Document) -> Document {
        finish(self.folder_sync(req))
    }

    fn folder_sync(&mut self, req: &Document) -> CmdResult {
        let reset = match self
            .keys
            .validate(&SyncScope::Hierarchy, req.get("SyncKey"))
        {
            KeyValidation::Malformed => {
                return Err(status_only(
                    CMD,
                    FolderSyncStatus::MalformedRequest.code(),
                ));
            }
            KeyValidation::Mismatch => {
                return Err(status_only(
                    CMD,
                    FolderSyncStatus::KeyMismatch.code(),
                ));
            }
            KeyValidation::Ok { reset } => reset,
        };

        let mut changes: Vec<FolderChange> = Vec::new();
        for &class in DataClass::ALL {
            if !self.class_enabled(class) {
                continue;
            }

            let delta = DeltaEnumerator::new(&*self.store, class, reset)
                .map_err(map_error!(
                    self,
                    CMD,
                    FolderSyncStatus::ServerError.code()
                ))?;
            for change in delta {
                changes.push(change.map_err(map_error!(
                    self,
                    CMD,
                    FolderSyncStatus::ServerError.code()
                ))?);
            }
        }

        // Only a pass that actually reported something moves the
        // checkpoint; a no-change pass hands the same key back. A reset
        // always issues a new key so the client leaves key 0.
        let key = if reset || !changes.is_empty() {
            self.keys.advance(&SyncScope::Hierarchy)
        } else {
            self.keys.current(&SyncScope::Hierarchy)
        };

        let mut response = Document::new(CMD);
        response.set("Status", FolderSyncStatus::Success.code());
        response.set("SyncKey", key);

        let mut changes_node = Node::new("Changes");
        changes_node.set("Count", changes.len());
        for change in &changes {
            let node = match change.kind {
                ChangeKind::Added | ChangeKind::Updated => {
                    let mut node = Node::new(
                        if ChangeKind::Added == change.kind {
                            "Add"
                        } else {
                            "Update"
                        },
                    );
                    node.set("ServerId", &change.group);
                    node.set("ParentId", &change.parent);
                    node.set("DisplayName", &change.display_name);
                    node.set("Type", change.folder_type.wire_code());
                    node
                }
                ChangeKind::Deleted => {
                    let mut node = Node::new("Delete");
                    node.set("ServerId", &change.group);
                    node
                }
                // The enumerator never yields unchanged folders.
                ChangeKind::Unchanged => continue,
            };
            changes_node.push(node);
        }
        response.push(changes_node);

        Ok(response)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::super::defs::test_prelude::*;
    use crate::model::*;
    use crate::store::{MemoryStore, RecordStore};

    fn three_folder_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.provision(
            DataClass::Email,
            "Inbox",
            FolderAttrs::DEFAULT | FolderAttrs::INBOX,
        );
        store.provision(
            DataClass::Email,
            "Sent Items",
            FolderAttrs::DEFAULT | FolderAttrs::SENT,
        );
        store.provision(DataClass::Contacts, "Contacts", FolderAttrs::DEFAULT);
        store
    }

    #[test]
    fn initial_sync_sends_everything_and_issues_key_one() {
        let mut setup = set_up_with_store(three_folder_store());

        let mut req = request("FolderSync");
        req.set("SyncKey", 0);
        let response = setup.processor.cmd_folder_sync(&req);

        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("1"), response.get("SyncKey"));

        let changes = response.child("Changes").unwrap();
        assert_eq!(Some("3"), changes.get("Count"));
        assert_eq!(3, changes.children_named("Add").count());
        assert_eq!(0, changes.children_named("Update").count());
        assert_eq!(0, changes.children_named("Delete").count());
    }

    #[test]
    fn no_change_pass_returns_count_zero_and_same_key() {
        let mut setup = set_up_with_store(three_folder_store());

        let mut req = request("FolderSync");
        req.set("SyncKey", 0);
        setup.processor.cmd_folder_sync(&req);

        req.set("SyncKey", 1);
        let response = setup.processor.cmd_folder_sync(&req);

        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("1"), response.get("SyncKey"));
        assert_eq!(
            Some("0"),
            response.child("Changes").unwrap().get("Count")
        );
    }

    #[test]
    fn deltas_advance_the_key_and_report_kinds() {
        let mut setup = set_up_with_store(three_folder_store());

        let mut req = request("FolderSync");
        req.set("SyncKey", 0);
        setup.processor.cmd_folder_sync(&req);

        let created = setup
            .store
            .create_group(DataClass::Email, &GroupId::root(), "Projects")
            .unwrap();
        setup
            .store
            .update_group(
                DataClass::Contacts,
                &GroupId("C1".to_owned()),
                &GroupId::root(),
                "People",
            )
            .unwrap();

        req.set("SyncKey", 1);
        let response = setup.processor.cmd_folder_sync(&req);

        assert_eq!(Some("2"), response.get("SyncKey"));
        let changes = response.child("Changes").unwrap();
        assert_eq!(Some("2"), changes.get("Count"));
        assert_eq!(
            Some(created.id.as_str()),
            changes.child("Add").unwrap().get("ServerId"),
        );
        assert_eq!(
            Some("C1"),
            changes.child("Update").unwrap().get("ServerId"),
        );
    }

    #[test]
    fn deletions_report_server_id_only_and_then_vanish() {
        let mut setup = set_up_with_store(three_folder_store());

        let mut req = request("FolderSync");
        req.set("SyncKey", 0);
        setup.processor.cmd_folder_sync(&req);

        setup
            .store
            .delete_group(DataClass::Contacts, &GroupId("C1".to_owned()))
            .unwrap();

        req.set("SyncKey", 1);
        let response = setup.processor.cmd_folder_sync(&req);
        let changes = response.child("Changes").unwrap();
        let delete = changes.child("Delete").unwrap();
        assert_eq!(Some("C1"), delete.get("ServerId"));
        assert!(!delete.has_child("DisplayName"));

        req.set("SyncKey", 2);
        let response = setup.processor.cmd_folder_sync(&req);
        assert_eq!(
            Some("0"),
            response.child("Changes").unwrap().get("Count")
        );
        assert_eq!(Some("2"), response.get("SyncKey"));
    }

    #[test]
    fn stale_key_is_rejected_without_advancing() {
        let mut setup = set_up_with_store(three_folder_store());

        let mut req = request("FolderSync");
        req.set("SyncKey", 0);
        setup.processor.cmd_folder_sync(&req);

        req.set("SyncKey", 7);
        let response = setup.processor.cmd_folder_sync(&req);
        assert_eq!(Some("9"), response.get("Status"));
        assert!(!response.has_child("SyncKey"));
        assert!(!response.has_child("Changes"));

        // The rejected call must not have advanced anything.
        req.set("SyncKey", 1);
        let response = setup.processor.cmd_folder_sync(&req);
        assert_eq!(Some("1"), response.get("Status"));
    }

    #[test]
    fn missing_key_element_is_malformed_not_mismatched() {
        let mut setup = set_up_with_store(three_folder_store());
        let response = setup.processor.cmd_folder_sync(&request("FolderSync"));
        assert_eq!(Some("10"), response.get("Status"));
        assert!(!response.has_child("SyncKey"));
    }

    #[test]
    fn disabled_classes_are_not_reported() {
        let store = three_folder_store();
        let mut config =
            crate::support::system_config::SystemConfig::default();
        config.sync.disabled_classes.push("Contacts".to_owned());
        let mut setup = set_up_full(store, config);

        let mut req = request("FolderSync");
        req.set("SyncKey", 0);
        let response = setup.processor.cmd_folder_sync(&req);
        assert_eq!(
            Some("2"),
            response.child("Changes").unwrap().get("Count")
        );
    }
}
