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

//! The resolved per-request context the front end hands to the engine.
//!
//! Parsing the raw option elements out of the wire envelope is the front
//! end's job; the engine only ever sees this already-resolved form.

/// Who is talking to us, on what device, speaking which protocol revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    pub principal: String,
    pub device_id: String,
    pub protocol_version: String,
}

impl SessionContext {
    /// The key under which per-principal state (such as persisted search
    /// remainders) is filed. Distinct devices of one principal get distinct
    /// state.
    pub fn state_key(&self) -> String {
        format!("{}/{}", self.principal, self.device_id)
    }
}

/// Options resolved from one command's option elements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Requested result window `[start, end)`.
    pub range: Option<(u32, u32)>,
    /// Cap on fully-populated result entries in one page; entries past the
    /// cap degrade to the "limit reached" status.
    pub max_items: Option<usize>,
    /// Discard any persisted search remainder and re-evaluate.
    pub rebuild: bool,
    /// Traverse the whole subtree below the requested folder scope rather
    /// than only its direct records.
    pub deep_traversal: bool,
    /// Byte budget for contact photos attached to one response.
    pub max_picture_bytes: Option<usize>,
    /// Count budget for contact photos attached to one response.
    pub max_pictures: Option<usize>,
    /// How many candidates to list for an ambiguous recipient.
    pub max_ambiguous_recipients: Option<usize>,
}
