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

//! The record-store boundary.
//!
//! The storage backend is an external collaborator; this module defines the
//! narrow interface the engine needs from it, plus the id-prefix lookup
//! table used to route an id to its data class. `memory` provides the
//! implementation used by the tests and by simple embeddings.

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::model::*;
use crate::support::error::Error;

mod memory;

pub use self::memory::MemoryStore;

lazy_static! {
    /// Maps the first character of a server-assigned id to the data class
    /// that owns the id. Built once at startup; the exhaustiveness of this
    /// table against `DataClass::ALL` is enforced by tests.
    static ref PREFIX_TABLE: BTreeMap<char, DataClass> = DataClass::ALL
        .iter()
        .map(|&class| (class.prefix(), class))
        .collect();
}

/// Resolve a group or item id to the data class that owns it, by its
/// assigned prefix character.
pub fn data_class_for_id(id: &str) -> Option<DataClass> {
    id.chars().next().and_then(|c| PREFIX_TABLE.get(&c).copied())
}

/// The interface the engine needs from the record storage backend.
///
/// All mutating group operations assign the record's sync status as a side
/// effect (`Added` on create, `Replaced` on update/move, `Deleted` on
/// delete); the hierarchy delta enumerator is the only consumer that resets
/// those flags, via `mark_group_status` and `purge_group`.
pub trait RecordStore: Send + Sync {
    /// List every group of a data class, including `Deleted`-flagged groups
    /// that have not yet been reported and purged.
    fn list_groups(&self, class: DataClass) -> Result<Vec<FolderRecord>, Error>;

    fn group_by_id(
        &self,
        class: DataClass,
        id: &GroupId,
    ) -> Result<FolderRecord, Error>;

    /// Create a group under `parent`, assigning its id and flagging it
    /// `Added`.
    fn create_group(
        &self,
        class: DataClass,
        parent: &GroupId,
        display_name: &str,
    ) -> Result<FolderRecord, Error>;

    /// Rename and/or reparent a group, flagging it `Replaced`.
    fn update_group(
        &self,
        class: DataClass,
        id: &GroupId,
        parent: &GroupId,
        display_name: &str,
    ) -> Result<(), Error>;

    /// Flag a group `Deleted`. The record remains enumerable until it has
    /// been reported and purged.
    fn delete_group(&self, class: DataClass, id: &GroupId)
        -> Result<(), Error>;

    /// Physically remove a `Deleted` group after its deletion has been
    /// reported.
    fn purge_group(&self, class: DataClass, id: &GroupId) -> Result<(), Error>;

    fn mark_group_status(
        &self,
        class: DataClass,
        id: &GroupId,
        status: SyncStatus,
    ) -> Result<(), Error>;

    fn list_records(
        &self,
        class: DataClass,
        group: &GroupId,
    ) -> Result<Vec<ItemRecord>, Error>;

    /// Records in the group whose sync status is anything but `Ok`.
    fn list_records_needing_sync(
        &self,
        class: DataClass,
        group: &GroupId,
    ) -> Result<Vec<ItemRecord>, Error>;

    /// Look a record up by its globally-assigned id, regardless of group.
    fn record_by_id(
        &self,
        class: DataClass,
        id: &ItemId,
    ) -> Result<ItemRecord, Error>;

    /// Create a record in `group` from a seed, assigning its id and
    /// flagging it `Added`.
    fn create_record(
        &self,
        class: DataClass,
        group: &GroupId,
        seed: ItemRecord,
    ) -> Result<ItemRecord, Error>;

    /// Relocate a record into `dst`. The record receives a fresh id in its
    /// new home, which is returned; the old id stops resolving.
    fn move_record(
        &self,
        class: DataClass,
        id: &ItemId,
        dst: &GroupId,
    ) -> Result<ItemId, Error>;

    /// Reconcile the class's records with their upstream source. Called by
    /// the change monitor once per polling pass.
    fn refresh(&self, class: DataClass) -> Result<(), Error>;
}
