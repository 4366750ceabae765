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

//! Model types shared across the engine: identifiers, record shapes, and
//! the sync-status vocabulary assigned by the record store and consumed by
//! the hierarchy delta enumerator.

use std::fmt;

use bitflags::bitflags;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};

/// One category of synchronisable content.
///
/// The engine routes and filters by data class but defines no semantics for
/// the items within one; field mapping for specific classes is an external
/// concern.
#[derive(
    Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum DataClass {
    Email,
    Contacts,
    Calendar,
    Tasks,
    Notes,
}

impl DataClass {
    pub const ALL: &'static [DataClass] = &[
        DataClass::Email,
        DataClass::Contacts,
        DataClass::Calendar,
        DataClass::Tasks,
        DataClass::Notes,
    ];

    /// The canonical name used in request/response documents and in
    /// configuration.
    pub fn name(self) -> &'static str {
        match self {
            DataClass::Email => "Email",
            DataClass::Contacts => "Contacts",
            DataClass::Calendar => "Calendar",
            DataClass::Tasks => "Tasks",
            DataClass::Notes => "Notes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        DataClass::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// The id prefix assigned to groups and records of this class.
    ///
    /// Every server-assigned id starts with its class's prefix; the inverse
    /// mapping lives in `store::data_class_for_id`.
    pub fn prefix(self) -> char {
        match self {
            DataClass::Email => 'E',
            DataClass::Contacts => 'C',
            DataClass::Calendar => 'A',
            DataClass::Tasks => 'T',
            DataClass::Notes => 'N',
        }
    }
}

impl fmt::Display for DataClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identifies a group (folder) record.
#[derive(
    Deserialize, Serialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    /// The pseudo-id of the hierarchy root, used as the parent of top-level
    /// folders. It is never the id of a real group.
    pub fn root() -> Self {
        GroupId("0".to_owned())
    }

    pub fn is_root(&self) -> bool {
        "0" == self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a data record within its class.
#[derive(
    Deserialize, Serialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-record synchronisation status.
///
/// Assigned by the record store when a record is mutated and consumed
/// exactly once per enumeration pass by the hierarchy delta enumerator,
/// which resets it to `Ok` after reporting. `Deleted` records are instead
/// physically purged once reported.
#[derive(
    Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash,
)]
pub enum SyncStatus {
    /// In sync; nothing to report.
    Ok,
    /// Created since the last report.
    Added,
    /// Mutated (renamed, moved, content changed) since the last report.
    Replaced,
    /// Deleted, pending one final report before physical removal.
    Deleted,
}

bitflags! {
    /// Attribute bitmask carried by folder records.
    ///
    /// `DEFAULT` marks the well-known system folders a class is provisioned
    /// with; the mail-specific bits drive the inbox/drafts/trash/sent/outbox
    /// sub-classification.
    #[derive(Deserialize, Serialize)]
    pub struct FolderAttrs: u32 {
        const DEFAULT = 1 << 0;
        const INBOX   = 1 << 1;
        const DRAFTS  = 1 << 2;
        const TRASH   = 1 << 3;
        const SENT    = 1 << 4;
        const OUTBOX  = 1 << 5;
    }
}

impl Default for FolderAttrs {
    fn default() -> Self {
        FolderAttrs::empty()
    }
}

/// A group (folder) record as seen through the record-store boundary.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FolderRecord {
    pub id: GroupId,
    /// Parent group, or `GroupId::root()` for top-level folders.
    pub parent: GroupId,
    pub display_name: String,
    pub attrs: FolderAttrs,
    pub sync_status: SyncStatus,
}

impl FolderRecord {
    pub fn is_default(&self) -> bool {
        self.attrs.contains(FolderAttrs::DEFAULT)
    }
}

/// A data record as seen through the record-store boundary.
///
/// Only the fields the engine needs to route, match, and budget are
/// modelled; everything else about an item lives behind the external
/// field-mapping layer.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub group: GroupId,
    /// Display name for contacts, subject for everything else.
    pub subject: String,
    pub body: String,
    /// Primary address, for contact records.
    pub email: Option<String>,
    /// Thread identity, for conversation-id search criteria.
    pub conversation_id: Option<String>,
    /// Opaque reference to a linked resource (e.g. an attachment or a
    /// document library entry), matched by the linked-resource criterion.
    pub linked_ref: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Contact photo bytes, subject to the picture budgets when attached to
    /// a response.
    #[serde(default)]
    pub picture: Option<Vec<u8>>,
    pub sync_status: SyncStatus,
}

impl ItemRecord {
    /// A blank record seed, suitable for filling in and handing to
    /// `RecordStore::create_record` (which assigns the real id).
    pub fn seed(subject: &str, body: &str) -> Self {
        ItemRecord {
            id: ItemId(String::new()),
            group: GroupId::root(),
            subject: subject.to_owned(),
            body: body.to_owned(),
            email: None,
            conversation_id: None,
            linked_ref: None,
            timestamp: Utc::now(),
            picture: None,
            sync_status: SyncStatus::Ok,
        }
    }
}
