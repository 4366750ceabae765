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

use log::error;

use super::defs::*;
use crate::model::GroupId;
use crate::protocol::document::{Document, Node};
use crate::protocol::status::EstimateStatus;
use crate::store::data_class_for_id;
use crate::sync::key_store::{KeyValidation, SyncScope};

impl CommandProcessor {
    /// Count the records a collection would deliver on its next sync.
    ///
    /// Purely a read: no sync key advances and no pending flag is consumed,
    /// so the estimate is repeatable until the collection actually syncs.
    /// Each requested collection succeeds or fails on its own.
    pub fn cmd_get_item_estimate(&mut self, req: &Document) -> Document {
        let mut response = Document::new("GetItemEstimate");
        if let Some(collections) = req.child("Collections") {
            for collection in collections.children_named("Collection") {
                response.push(self.estimate_collection(collection));
            }
        }
        response
    }

    fn estimate_collection(&self, collection: &Node) -> Node {
        let mut response = Node::new("Response");

        let id = match collection.get("CollectionId").filter(|v| !v.is_empty())
        {
            Some(id) => id.to_owned(),
            None => {
                response
                    .set("Status", EstimateStatus::UnknownCollection.code());
                return response;
            }
        };

        let mut body = Node::new("Collection");
        body.set("CollectionId", &id);

        let class = match data_class_for_id(&id) {
            Some(class) => class,
            None => {
                response
                    .set("Status", EstimateStatus::UnknownCollection.code());
                response.push(body);
                return response;
            }
        };
        let group = GroupId(id);
        if self.store.group_by_id(class, &group).is_err() {
            response.set("Status", EstimateStatus::UnknownCollection.code());
            response.push(body);
            return response;
        }

        let scope = SyncScope::Collection(group.clone());
        match self.keys.validate(&scope, collection.get("SyncKey")) {
            KeyValidation::Mismatch | KeyValidation::Malformed => {
                response.set("Status", EstimateStatus::KeyMismatch.code());
            }
            KeyValidation::Ok { reset: true } => {
                // Key zero: the collection has never completed a sync, so
                // there is no delta to estimate against.
                response
                    .set("Status", EstimateStatus::SyncStateNotPrimed.code());
            }
            KeyValidation::Ok { reset: false } => {
                match self.store.list_records_needing_sync(class, &group) {
                    Ok(pending) => {
                        response.set("Status", EstimateStatus::Success.code());
                        body.set("Estimate", pending.len());
                    }
                    Err(e) => {
                        error!(
                            "{} GetItemEstimate: counting {} failed: {}",
                            self.log_prefix, group, e
                        );
                        response.set(
                            "Status",
                            EstimateStatus::UnknownCollection.code(),
                        );
                    }
                }
            }
        }

        response.push(body);
        response
    }
}
