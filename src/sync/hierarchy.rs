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

//! Folder-hierarchy delta enumeration.
//!
//! `DeltaEnumerator` walks one data class's groups and yields each pending
//! change exactly once per pass. Reading a change resets the record's sync
//! status to `Ok` as a side effect; a reported deletion purges the record
//! instead. The reset happens when the change is read, not when the
//! response reaches the client --- a response lost in transit is therefore
//! unrecoverable by replay, and the client's remedy is a full
//! resynchronisation with key "0".

use crate::model::*;
use crate::store::RecordStore;
use crate::support::error::Error;

/// How one folder changed since the last hierarchy sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Deleted,
    Unchanged,
}

/// The one place a sync status becomes a change kind. Deletion wins over
/// any other pending flag.
pub fn classify_status(status: SyncStatus) -> ChangeKind {
    match status {
        SyncStatus::Deleted => ChangeKind::Deleted,
        SyncStatus::Added => ChangeKind::Added,
        SyncStatus::Replaced => ChangeKind::Updated,
        SyncStatus::Ok => ChangeKind::Unchanged,
    }
}

/// The protocol's folder-type tags.
///
/// Distinguishes the well-known default folder of each data class from
/// user-created folders, with the mail defaults sub-classified by the
/// folder attribute bitmask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FolderType {
    UserGeneric,
    Inbox,
    Drafts,
    Trash,
    Sent,
    Outbox,
    DefaultTasks,
    DefaultCalendar,
    DefaultContacts,
    DefaultNotes,
    UserMail,
    UserCalendar,
    UserContacts,
    UserTasks,
    UserNotes,
}

impl FolderType {
    pub fn wire_code(self) -> u32 {
        match self {
            FolderType::UserGeneric => 1,
            FolderType::Inbox => 2,
            FolderType::Drafts => 3,
            FolderType::Trash => 4,
            FolderType::Sent => 5,
            FolderType::Outbox => 6,
            FolderType::DefaultTasks => 7,
            FolderType::DefaultCalendar => 8,
            FolderType::DefaultContacts => 9,
            FolderType::DefaultNotes => 10,
            FolderType::UserMail => 12,
            FolderType::UserCalendar => 13,
            FolderType::UserContacts => 14,
            FolderType::UserTasks => 15,
            FolderType::UserNotes => 17,
        }
    }

    /// The data class a user-created folder of this wire code belongs to.
    /// Default/system codes are not creatable and resolve to `None`.
    pub fn creatable_class(wire_code: u32) -> Option<DataClass> {
        match wire_code {
            1 | 12 => Some(DataClass::Email),
            13 => Some(DataClass::Calendar),
            14 => Some(DataClass::Contacts),
            15 => Some(DataClass::Tasks),
            17 => Some(DataClass::Notes),
            _ => None,
        }
    }
}

/// Classify a folder record into its protocol type tag.
pub fn classify_folder(class: DataClass, folder: &FolderRecord) -> FolderType {
    if folder.is_default() {
        match class {
            DataClass::Email => {
                // The mail sub-classification is driven by the attribute
                // bitmask; a default mail folder with no sub-bit is served
                // as generic.
                if folder.attrs.contains(FolderAttrs::INBOX) {
                    FolderType::Inbox
                } else if folder.attrs.contains(FolderAttrs::DRAFTS) {
                    FolderType::Drafts
                } else if folder.attrs.contains(FolderAttrs::TRASH) {
                    FolderType::Trash
                } else if folder.attrs.contains(FolderAttrs::SENT) {
                    FolderType::Sent
                } else if folder.attrs.contains(FolderAttrs::OUTBOX) {
                    FolderType::Outbox
                } else {
                    FolderType::UserGeneric
                }
            }
            DataClass::Tasks => FolderType::DefaultTasks,
            DataClass::Calendar => FolderType::DefaultCalendar,
            DataClass::Contacts => FolderType::DefaultContacts,
            DataClass::Notes => FolderType::DefaultNotes,
        }
    } else {
        match class {
            DataClass::Email => FolderType::UserMail,
            DataClass::Calendar => FolderType::UserCalendar,
            DataClass::Contacts => FolderType::UserContacts,
            DataClass::Tasks => FolderType::UserTasks,
            DataClass::Notes => FolderType::UserNotes,
        }
    }
}

/// One reported hierarchy change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderChange {
    pub group: GroupId,
    pub kind: ChangeKind,
    pub parent: GroupId,
    pub display_name: String,
    pub folder_type: FolderType,
}

/// Lazy enumerator over one data class's pending hierarchy changes.
///
/// In reset mode (client key "0") every live folder is reported as `Added`
/// regardless of its flags, and pending flags are still consumed so the
/// next pass starts clean.
pub struct DeltaEnumerator<'a> {
    store: &'a dyn RecordStore,
    class: DataClass,
    reset: bool,
    pending: std::collections::VecDeque<FolderRecord>,
}

impl<'a> DeltaEnumerator<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        class: DataClass,
        reset: bool,
    ) -> Result<Self, Error> {
        let pending = store
            .list_groups(class)?
            .into_iter()
            .filter(|g| reset || g.sync_status != SyncStatus::Ok)
            .collect();

        Ok(DeltaEnumerator {
            store,
            class,
            reset,
            pending,
        })
    }

    fn consume(&mut self, folder: &FolderRecord) -> Result<(), Error> {
        match folder.sync_status {
            SyncStatus::Ok => Ok(()),
            SyncStatus::Deleted => {
                self.store.purge_group(self.class, &folder.id)
            }
            SyncStatus::Added | SyncStatus::Replaced => self
                .store
                .mark_group_status(self.class, &folder.id, SyncStatus::Ok),
        }
    }
}

impl<'a> Iterator for DeltaEnumerator<'a> {
    type Item = Result<FolderChange, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let folder = self.pending.pop_front()?;

            if let Err(e) = self.consume(&folder) {
                return Some(Err(e));
            }

            let kind = if self.reset {
                if SyncStatus::Deleted == folder.sync_status {
                    // A full resend does not mention folders that no longer
                    // exist; the purge above is all that was left to do.
                    continue;
                }
                ChangeKind::Added
            } else {
                match classify_status(folder.sync_status) {
                    // Cannot happen: unchanged folders were filtered out at
                    // construction. Skip rather than misreport.
                    ChangeKind::Unchanged => continue,
                    kind => kind,
                }
            };

            return Some(Ok(FolderChange {
                folder_type: classify_folder(self.class, &folder),
                group: folder.id,
                kind,
                parent: folder.parent,
                display_name: folder.display_name,
            }));
        }
    }
}
