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

//! The sync-key state machine.
//!
//! A sync key is a versioned checkpoint: the client echoes back the key it
//! was last issued, the server validates it against the stored version for
//! the scope, and issues the next key only once the command's mutation has
//! otherwise succeeded. Key `"0"` is a client fact, not a claim to
//! validate: it means "start over" and always passes validation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::model::GroupId;

/// One issued sync key version.
#[derive(
    Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct SyncKey(pub u32);

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a sync key checkpoints: the whole folder hierarchy, or one
/// collection's contents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyncScope {
    Hierarchy,
    Collection(GroupId),
}

/// Outcome of validating a client-submitted key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyValidation {
    /// The key is acceptable. `reset` is set when the client submitted key
    /// zero, requesting a full resynchronisation.
    Ok { reset: bool },
    /// A well-formed key that is not the scope's current version.
    Mismatch,
    /// The key element was structurally absent, or present but not a
    /// number. Distinct from `Mismatch`: the client should fix its request,
    /// not resynchronise.
    Malformed,
}

/// Owns the current key version per scope for one session.
///
/// No other component may mutate this state; handlers call `validate`
/// before touching anything else and `advance` only after every other
/// precondition of the command has succeeded, so a non-success response
/// never carries a new key.
#[derive(Default)]
pub struct SyncKeyStore {
    versions: Mutex<HashMap<SyncScope, u32>>,
}

impl SyncKeyStore {
    pub fn new() -> Self {
        SyncKeyStore::default()
    }

    /// Validate a client-submitted key against the scope's current version.
    ///
    /// `client_key` is `None` when the key element was absent from the
    /// request, which is a format error; an empty or zero key is the
    /// "start over" fact and always validates.
    pub fn validate(
        &self,
        scope: &SyncScope,
        client_key: Option<&str>,
    ) -> KeyValidation {
        let raw = match client_key {
            None => return KeyValidation::Malformed,
            Some(raw) => raw.trim(),
        };

        if raw.is_empty() || "0" == raw {
            return KeyValidation::Ok { reset: true };
        }

        let submitted: u32 = match raw.parse() {
            Ok(v) => v,
            Err(_) => return KeyValidation::Malformed,
        };

        if submitted == self.current(scope).0 {
            KeyValidation::Ok { reset: false }
        } else {
            KeyValidation::Mismatch
        }
    }

    /// The scope's current version (0 if never advanced).
    pub fn current(&self, scope: &SyncScope) -> SyncKey {
        SyncKey(
            self.versions
                .lock()
                .unwrap()
                .get(scope)
                .copied()
                .unwrap_or(0),
        )
    }

    /// Increment the scope's version exactly once and return the new key.
    ///
    /// The new version persists, so the next `validate` call observes it.
    pub fn advance(&self, scope: &SyncScope) -> SyncKey {
        let mut versions = self.versions.lock().unwrap();
        let version = versions.entry(scope.clone()).or_insert(0);
        *version += 1;
        SyncKey(*version)
    }
}
