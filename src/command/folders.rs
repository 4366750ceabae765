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

//! The hierarchy-mutating commands: FolderCreate, FolderUpdate,
//! FolderDelete.
//!
//! All three follow the same commit discipline: the sync key is validated
//! before anything else and advanced only after the store mutation has
//! succeeded, so a non-success response never carries a new key. The
//! mutation itself flags the record; the next FolderSync pass is what
//! reports it to other passes of the same client.

use super::defs::*;
use crate::model::GroupId;
use crate::protocol::document::Document;
use crate::protocol::status::{
    FolderCreateStatus, FolderDeleteStatus, FolderUpdateStatus,
};
use crate::store::data_class_for_id;
use crate::sync::hierarchy::FolderType;
use crate::sync::key_store::{KeyValidation, SyncScope};

impl CommandProcessor {
    pub fn cmd_folder_create(&mut self, req: &Document) -> Document {
        finish(self.folder_create(req))
    }

    pub fn cmd_folder_update(&mut self, req: &Document) -> Document {
        finish(self.folder_update(req))
    }

    pub fn cmd_folder_delete(&mut self, req: &Document) -> Document {
        finish(self.folder_delete(req))
    }

    /// Validate the hierarchy key for a mutating command.
    ///
    /// Unlike FolderSync, a mutation cannot proceed from key zero: "start
    /// over" says the client does not know the current hierarchy, so it has
    /// no business changing it until it has resynchronised.
    fn check_mutation_key(
        &self,
        command: &str,
        req: &Document,
        mismatch: u16,
        malformed: u16,
    ) -> PartialResult<()> {
        match self.keys.validate(&SyncScope::Hierarchy, req.get("SyncKey")) {
            KeyValidation::Ok { reset: false } => Ok(()),
            KeyValidation::Ok { reset: true } | KeyValidation::Mismatch => {
                Err(status_only(command, mismatch))
            }
            KeyValidation::Malformed => Err(status_only(command, malformed)),
        }
    }

    fn folder_create(&mut self, req: &Document) -> CmdResult {
        const CMD: &str = "FolderCreate";

        self.check_mutation_key(
            CMD,
            req,
            FolderCreateStatus::KeyMismatch.code(),
            FolderCreateStatus::MalformedRequest.code(),
        )?;

        let display_name =
            req.get("DisplayName").filter(|v| !v.is_empty()).ok_or_else(
                || status_only(CMD, FolderCreateStatus::MalformedRequest.code()),
            )?;
        let parent = req.get("ParentId").filter(|v| !v.is_empty()).ok_or_else(
            || status_only(CMD, FolderCreateStatus::MalformedRequest.code()),
        )?;
        let type_code: u32 = req
            .get("Type")
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| {
                status_only(CMD, FolderCreateStatus::MalformedRequest.code())
            })?;

        let class = FolderType::creatable_class(type_code).ok_or_else(|| {
            status_only(CMD, FolderCreateStatus::SpecialFolder.code())
        })?;
        if !self.class_enabled(class) {
            return Err(status_only(
                CMD,
                FolderCreateStatus::SpecialFolder.code(),
            ));
        }

        let created = self
            .store
            .create_group(class, &GroupId(parent.to_owned()), display_name)
            .map_err(map_error!(
                self,
                CMD,
                FolderCreateStatus::ServerError.code(),
                NxParent => FolderCreateStatus::ParentNotFound.code(),
                FolderExists => FolderCreateStatus::AlreadyExists.code(),
            ))?;

        let key = self.keys.advance(&SyncScope::Hierarchy);

        let mut response = Document::new(CMD);
        response.set("Status", FolderCreateStatus::Success.code());
        response.set("SyncKey", key);
        response.set("ServerId", created.id);
        Ok(response)
    }

    fn folder_update(&mut self, req: &Document) -> CmdResult {
        const CMD: &str = "FolderUpdate";

        self.check_mutation_key(
            CMD,
            req,
            FolderUpdateStatus::KeyMismatch.code(),
            FolderUpdateStatus::MalformedRequest.code(),
        )?;

        let server_id =
            req.get("ServerId").filter(|v| !v.is_empty()).ok_or_else(
                || status_only(CMD, FolderUpdateStatus::MalformedRequest.code()),
            )?;
        let display_name =
            req.get("DisplayName").filter(|v| !v.is_empty()).ok_or_else(
                || status_only(CMD, FolderUpdateStatus::MalformedRequest.code()),
            )?;
        let parent = req.get("ParentId").filter(|v| !v.is_empty()).ok_or_else(
            || status_only(CMD, FolderUpdateStatus::MalformedRequest.code()),
        )?;

        let class = data_class_for_id(server_id).ok_or_else(|| {
            status_only(CMD, FolderUpdateStatus::NotFound.code())
        })?;
        let id = GroupId(server_id.to_owned());

        let folder = self.store.group_by_id(class, &id).map_err(map_error!(
            self,
            CMD,
            FolderUpdateStatus::ServerError.code(),
            NxFolder => FolderUpdateStatus::NotFound.code(),
        ))?;
        if folder.is_default() {
            return Err(status_only(
                CMD,
                FolderUpdateStatus::SpecialFolder.code(),
            ));
        }

        self.store
            .update_group(
                class,
                &id,
                &GroupId(parent.to_owned()),
                display_name,
            )
            .map_err(map_error!(
                self,
                CMD,
                FolderUpdateStatus::ServerError.code(),
                NxFolder => FolderUpdateStatus::NotFound.code(),
                NxParent => FolderUpdateStatus::ParentNotFound.code(),
                FolderExists => FolderUpdateStatus::AlreadyExists.code(),
            ))?;

        let key = self.keys.advance(&SyncScope::Hierarchy);

        let mut response = Document::new(CMD);
        response.set("Status", FolderUpdateStatus::Success.code());
        response.set("SyncKey", key);
        Ok(response)
    }

    fn folder_delete(&mut self, req: &Document) -> CmdResult {
        const CMD: &str = "FolderDelete";

        self.check_mutation_key(
            CMD,
            req,
            FolderDeleteStatus::KeyMismatch.code(),
            FolderDeleteStatus::MalformedRequest.code(),
        )?;

        let server_id =
            req.get("ServerId").filter(|v| !v.is_empty()).ok_or_else(
                || status_only(CMD, FolderDeleteStatus::MalformedRequest.code()),
            )?;

        let class = data_class_for_id(server_id).ok_or_else(|| {
            status_only(CMD, FolderDeleteStatus::NotFound.code())
        })?;
        let id = GroupId(server_id.to_owned());

        let folder = self.store.group_by_id(class, &id).map_err(map_error!(
            self,
            CMD,
            FolderDeleteStatus::ServerError.code(),
            NxFolder => FolderDeleteStatus::NotFound.code(),
        ))?;
        if folder.is_default() {
            return Err(status_only(
                CMD,
                FolderDeleteStatus::SpecialFolder.code(),
            ));
        }

        self.store.delete_group(class, &id).map_err(map_error!(
            self,
            CMD,
            FolderDeleteStatus::ServerError.code(),
            NxFolder => FolderDeleteStatus::NotFound.code(),
        ))?;

        let key = self.keys.advance(&SyncScope::Hierarchy);

        let mut response = Document::new(CMD);
        response.set("Status", FolderDeleteStatus::Success.code());
        response.set("SyncKey", key);
        Ok(response)
    }
}

#[cfg(test)]
mod test {
    use super::super::defs::test_prelude::*;
    use crate::model::*;
    use crate::store::RecordStore;
    use crate::sync::key_store::SyncScope;

    fn primed() -> Setup {
        let mut setup = set_up();
        // Complete an initial hierarchy sync so the key is 1.
        let mut req = request("FolderSync");
        req.set("SyncKey", 0);
        setup.processor.cmd_folder_sync(&req);
        setup
    }

    fn create_request(name: &str) -> crate::protocol::document::Document {
        let mut req = request("FolderCreate");
        req.set("SyncKey", 1);
        req.set("ParentId", "0");
        req.set("DisplayName", name);
        req.set("Type", 12); // user mail folder
        req
    }

    #[test]
    fn create_assigns_id_and_advances_key() {
        let mut setup = primed();
        let response =
            setup.processor.cmd_folder_create(&create_request("Projects"));

        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("2"), response.get("SyncKey"));
        // E1..E5 are the provisioned mail folders.
        assert_eq!(Some("E6"), response.get("ServerId"));

        let created = setup
            .store
            .group_by_id(DataClass::Email, &GroupId("E6".to_owned()))
            .unwrap();
        assert_eq!("Projects", created.display_name);
    }

    #[test]
    fn create_with_stale_key_returns_mismatch_and_nothing_else() {
        let mut setup = primed();
        let mut req = create_request("Projects");
        req.set("SyncKey", 7);

        let response = setup.processor.cmd_folder_create(&req);
        assert_eq!(Some("9"), response.get("Status"));
        assert!(!response.has_child("ServerId"));
        assert!(!response.has_child("SyncKey"));

        // Nothing was created and the key did not move.
        assert!(setup
            .store
            .group_by_id(DataClass::Email, &GroupId("E6".to_owned()))
            .is_err());
        assert_eq!(
            crate::sync::key_store::SyncKey(1),
            setup.processor.keys.current(&SyncScope::Hierarchy),
        );
    }

    #[test]
    fn create_from_reset_key_is_also_a_mismatch() {
        let mut setup = primed();
        let mut req = create_request("Projects");
        req.set("SyncKey", 0);
        let response = setup.processor.cmd_folder_create(&req);
        assert_eq!(Some("9"), response.get("Status"));
    }

    #[test]
    fn create_validates_its_inputs() {
        let mut setup = primed();

        let mut req = create_request("Projects");
        req.set("SyncKey", "banana");
        assert_eq!(
            Some("10"),
            setup.processor.cmd_folder_create(&req).get("Status"),
        );

        let mut req = create_request("");
        req.set("DisplayName", "");
        assert_eq!(
            Some("10"),
            setup.processor.cmd_folder_create(&req).get("Status"),
        );

        let mut req = create_request("Projects");
        req.set("Type", 2); // Inbox is not a creatable kind
        assert_eq!(
            Some("3"),
            setup.processor.cmd_folder_create(&req).get("Status"),
        );

        let mut req = create_request("Projects");
        req.set("ParentId", "E99");
        assert_eq!(
            Some("5"),
            setup.processor.cmd_folder_create(&req).get("Status"),
        );

        let req = create_request("Inbox"); // duplicate under the root
        assert_eq!(
            Some("2"),
            setup.processor.cmd_folder_create(&req).get("Status"),
        );
    }

    #[test]
    fn update_renames_and_reparents() {
        let mut setup = primed();
        setup.processor.cmd_folder_create(&create_request("Projects"));

        let mut req = request("FolderUpdate");
        req.set("SyncKey", 2);
        req.set("ServerId", "E6");
        req.set("ParentId", "E1");
        req.set("DisplayName", "Projects 2026");

        let response = setup.processor.cmd_folder_update(&req);
        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("3"), response.get("SyncKey"));

        let updated = setup
            .store
            .group_by_id(DataClass::Email, &GroupId("E6".to_owned()))
            .unwrap();
        assert_eq!("Projects 2026", updated.display_name);
        assert_eq!(GroupId("E1".to_owned()), updated.parent);
    }

    #[test]
    fn update_refuses_default_folders_and_bad_targets() {
        let mut setup = primed();

        let mut req = request("FolderUpdate");
        req.set("SyncKey", 1);
        req.set("ServerId", "E1"); // Inbox
        req.set("ParentId", "0");
        req.set("DisplayName", "In-Box");
        assert_eq!(
            Some("3"),
            setup.processor.cmd_folder_update(&req).get("Status"),
        );

        req.set("ServerId", "E99");
        assert_eq!(
            Some("4"),
            setup.processor.cmd_folder_update(&req).get("Status"),
        );

        req.set("ServerId", "Z9");
        assert_eq!(
            Some("4"),
            setup.processor.cmd_folder_update(&req).get("Status"),
        );
    }

    #[test]
    fn update_to_duplicate_name_is_rejected() {
        let mut setup = primed();
        setup.processor.cmd_folder_create(&create_request("Projects"));

        let mut req = request("FolderUpdate");
        req.set("SyncKey", 2);
        req.set("ServerId", "E6");
        req.set("ParentId", "0");
        req.set("DisplayName", "Inbox");
        assert_eq!(
            Some("2"),
            setup.processor.cmd_folder_update(&req).get("Status"),
        );
        // Rejection did not advance the key.
        assert_eq!(
            crate::sync::key_store::SyncKey(2),
            setup.processor.keys.current(&SyncScope::Hierarchy),
        );
    }

    #[test]
    fn delete_flags_the_folder_for_the_next_sync_pass() {
        let mut setup = primed();
        setup.processor.cmd_folder_create(&create_request("Projects"));

        let mut req = request("FolderDelete");
        req.set("SyncKey", 2);
        req.set("ServerId", "E6");
        let response = setup.processor.cmd_folder_delete(&req);
        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("3"), response.get("SyncKey"));

        assert_eq!(
            SyncStatus::Deleted,
            setup
                .store
                .group_by_id(DataClass::Email, &GroupId("E6".to_owned()))
                .unwrap()
                .sync_status,
        );
    }

    #[test]
    fn delete_refuses_default_folders_and_bad_targets() {
        let mut setup = primed();

        let mut req = request("FolderDelete");
        req.set("SyncKey", 1);
        req.set("ServerId", "E1");
        assert_eq!(
            Some("3"),
            setup.processor.cmd_folder_delete(&req).get("Status"),
        );

        req.set("ServerId", "E99");
        assert_eq!(
            Some("4"),
            setup.processor.cmd_folder_delete(&req).get("Status"),
        );

        let req = request("FolderDelete"); // no key at all
        assert_eq!(
            Some("10"),
            setup.processor.cmd_folder_delete(&req).get("Status"),
        );
    }
}
