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

//! An in-memory `RecordStore`.
//!
//! Backs the test suite and is usable as-is by embeddings that keep their
//! records elsewhere and only need the engine's view of them. Ids are
//! assigned as `<class prefix><counter>`, with one counter per data class
//! shared between groups and records so ids stay unique within a class.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::RecordStore;
use crate::model::*;
use crate::support::error::Error;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    #[cfg(test)]
    fail_refresh: std::sync::atomic::AtomicBool,
}

#[derive(Default)]
struct Inner {
    groups: BTreeMap<(DataClass, String), FolderRecord>,
    records: BTreeMap<(DataClass, String), ItemRecord>,
    next_id: BTreeMap<DataClass, u32>,
}

impl Inner {
    fn assign_id(&mut self, class: DataClass) -> String {
        let counter = self.next_id.entry(class).or_insert(0);
        *counter += 1;
        format!("{}{}", class.prefix(), counter)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store provisioned with the default folder of every data class and
    /// the five well-known mail folders, all in `Ok` status as if already
    /// reported.
    pub fn with_default_folders() -> Self {
        let store = MemoryStore::new();
        let mail = [
            ("Inbox", FolderAttrs::INBOX),
            ("Drafts", FolderAttrs::DRAFTS),
            ("Deleted Items", FolderAttrs::TRASH),
            ("Sent Items", FolderAttrs::SENT),
            ("Outbox", FolderAttrs::OUTBOX),
        ];
        for &(name, special) in &mail {
            store.provision(
                DataClass::Email,
                name,
                FolderAttrs::DEFAULT | special,
            );
        }
        store.provision(DataClass::Contacts, "Contacts", FolderAttrs::DEFAULT);
        store.provision(DataClass::Calendar, "Calendar", FolderAttrs::DEFAULT);
        store.provision(DataClass::Tasks, "Tasks", FolderAttrs::DEFAULT);
        store.provision(DataClass::Notes, "Notes", FolderAttrs::DEFAULT);
        store
    }

    /// Insert a folder directly, bypassing sync-status assignment. Used for
    /// provisioning; the folder starts out `Ok`.
    pub fn provision(
        &self,
        class: DataClass,
        display_name: &str,
        attrs: FolderAttrs,
    ) -> GroupId {
        let mut inner = self.inner.lock().unwrap();
        let id = GroupId(inner.assign_id(class));
        inner.groups.insert(
            (class, id.0.clone()),
            FolderRecord {
                id: id.clone(),
                parent: GroupId::root(),
                display_name: display_name.to_owned(),
                attrs,
                sync_status: SyncStatus::Ok,
            },
        );
        id
    }

    /// Insert a record directly with the given sync status. Used by tests
    /// and by embeddings reconciling from upstream.
    pub fn insert_record(
        &self,
        class: DataClass,
        group: &GroupId,
        mut seed: ItemRecord,
        status: SyncStatus,
    ) -> ItemId {
        let mut inner = self.inner.lock().unwrap();
        let id = ItemId(inner.assign_id(class));
        seed.id = id.clone();
        seed.group = group.clone();
        seed.sync_status = status;
        inner.records.insert((class, id.0.clone()), seed);
        id
    }

    #[cfg(test)]
    pub fn set_fail_refresh(&self, fail: bool) {
        self.fail_refresh
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

impl RecordStore for MemoryStore {
    fn list_groups(&self, class: DataClass) -> Result<Vec<FolderRecord>, Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .groups
            .iter()
            .filter(|((c, _), _)| *c == class)
            .map(|(_, g)| g.clone())
            .collect())
    }

    fn group_by_id(
        &self,
        class: DataClass,
        id: &GroupId,
    ) -> Result<FolderRecord, Error> {
        let inner = self.inner.lock().unwrap();
        inner
            .groups
            .get(&(class, id.0.clone()))
            .cloned()
            .ok_or(Error::NxFolder)
    }

    fn create_group(
        &self,
        class: DataClass,
        parent: &GroupId,
        display_name: &str,
    ) -> Result<FolderRecord, Error> {
        let mut inner = self.inner.lock().unwrap();
        if !parent.is_root()
            && !inner.groups.contains_key(&(class, parent.0.clone()))
        {
            return Err(Error::NxParent);
        }
        let duplicate = inner.groups.iter().any(|((c, _), g)| {
            *c == class
                && g.parent == *parent
                && g.display_name == display_name
                && g.sync_status != SyncStatus::Deleted
        });
        if duplicate {
            return Err(Error::FolderExists);
        }

        let id = GroupId(inner.assign_id(class));
        let record = FolderRecord {
            id: id.clone(),
            parent: parent.clone(),
            display_name: display_name.to_owned(),
            attrs: FolderAttrs::empty(),
            sync_status: SyncStatus::Added,
        };
        inner.groups.insert((class, id.0), record.clone());
        Ok(record)
    }

    fn update_group(
        &self,
        class: DataClass,
        id: &GroupId,
        parent: &GroupId,
        display_name: &str,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        if !parent.is_root()
            && !inner.groups.contains_key(&(class, parent.0.clone()))
        {
            return Err(Error::NxParent);
        }
        let duplicate = inner.groups.iter().any(|((c, _), g)| {
            *c == class
                && g.id != *id
                && g.parent == *parent
                && g.display_name == display_name
                && g.sync_status != SyncStatus::Deleted
        });
        if duplicate {
            return Err(Error::FolderExists);
        }

        let group = inner
            .groups
            .get_mut(&(class, id.0.clone()))
            .ok_or(Error::NxFolder)?;
        group.parent = parent.clone();
        group.display_name = display_name.to_owned();
        group.sync_status = SyncStatus::Replaced;
        Ok(())
    }

    fn delete_group(
        &self,
        class: DataClass,
        id: &GroupId,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let group = inner
            .groups
            .get_mut(&(class, id.0.clone()))
            .ok_or(Error::NxFolder)?;
        group.sync_status = SyncStatus::Deleted;
        Ok(())
    }

    fn purge_group(&self, class: DataClass, id: &GroupId) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .groups
            .remove(&(class, id.0.clone()))
            .ok_or(Error::NxFolder)?;
        // Records of a purged group go with it.
        inner
            .records
            .retain(|(c, _), r| *c != class || r.group != *id);
        Ok(())
    }

    fn mark_group_status(
        &self,
        class: DataClass,
        id: &GroupId,
        status: SyncStatus,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let group = inner
            .groups
            .get_mut(&(class, id.0.clone()))
            .ok_or(Error::NxFolder)?;
        group.sync_status = status;
        Ok(())
    }

    fn list_records(
        &self,
        class: DataClass,
        group: &GroupId,
    ) -> Result<Vec<ItemRecord>, Error> {
        let inner = self.inner.lock().unwrap();
        if !inner.groups.contains_key(&(class, group.0.clone())) {
            return Err(Error::NxFolder);
        }
        Ok(inner
            .records
            .iter()
            .filter(|((c, _), r)| *c == class && r.group == *group)
            .map(|(_, r)| r.clone())
            .collect())
    }

    fn list_records_needing_sync(
        &self,
        class: DataClass,
        group: &GroupId,
    ) -> Result<Vec<ItemRecord>, Error> {
        Ok(self
            .list_records(class, group)?
            .into_iter()
            .filter(|r| r.sync_status != SyncStatus::Ok)
            .collect())
    }

    fn record_by_id(
        &self,
        class: DataClass,
        id: &ItemId,
    ) -> Result<ItemRecord, Error> {
        let inner = self.inner.lock().unwrap();
        inner
            .records
            .get(&(class, id.0.clone()))
            .cloned()
            .ok_or(Error::NxItem)
    }

    fn create_record(
        &self,
        class: DataClass,
        group: &GroupId,
        mut seed: ItemRecord,
    ) -> Result<ItemRecord, Error> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.groups.contains_key(&(class, group.0.clone())) {
            return Err(Error::NxFolder);
        }
        let id = ItemId(inner.assign_id(class));
        seed.id = id.clone();
        seed.group = group.clone();
        seed.sync_status = SyncStatus::Added;
        inner.records.insert((class, id.0), seed.clone());
        Ok(seed)
    }

    fn move_record(
        &self,
        class: DataClass,
        id: &ItemId,
        dst: &GroupId,
    ) -> Result<ItemId, Error> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.groups.contains_key(&(class, dst.0.clone())) {
            return Err(Error::NxFolder);
        }
        let mut record = inner
            .records
            .remove(&(class, id.0.clone()))
            .ok_or(Error::NxItem)?;
        if record.group == *dst {
            // Put it back; the caller gets to decide what "moved nowhere"
            // means for its status vocabulary.
            inner.records.insert((class, id.0.clone()), record);
            return Err(Error::MoveToSelf);
        }

        let new_id = ItemId(inner.assign_id(class));
        record.id = new_id.clone();
        record.group = dst.clone();
        record.sync_status = SyncStatus::Added;
        inner.records.insert((class, new_id.0.clone()), record);
        Ok(new_id)
    }

    fn refresh(&self, _class: DataClass) -> Result<(), Error> {
        #[cfg(test)]
        {
            if self.fail_refresh.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(Error::StoreUnavailable(
                    "refresh failure injected".to_owned(),
                ));
            }
        }
        // Nothing upstream of an in-memory store.
        Ok(())
    }
}
