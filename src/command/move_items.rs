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
use crate::model::{GroupId, ItemId};
use crate::protocol::document::{Document, Node};
use crate::protocol::status::MoveStatus;
use crate::store::data_class_for_id;
use crate::support::error::Error;

impl CommandProcessor {
    /// Relocate items between folders of the same data class.
    ///
    /// Each requested move succeeds or fails on its own; the moved item
    /// gets a fresh id in its destination and the old id stops resolving,
    /// which the response reports as `DstMsgId`.
    pub fn cmd_move_items(&mut self, req: &Document) -> Document {
        let mut response = Document::new("MoveItems");
        for mv in req.children_named("Move") {
            response.push(self.move_one(mv));
        }
        response
    }

    fn move_one(&self, mv: &Node) -> Node {
        let mut response = Node::new("Response");
        response.set("SrcMsgId", mv.get("SrcMsgId").unwrap_or(""));

        match self.do_move(mv) {
            Ok(new_id) => {
                response.set("Status", MoveStatus::Success.code());
                response.set("DstMsgId", new_id);
            }
            Err(status) => response.set("Status", status.code()),
        }
        response
    }

    fn do_move(&self, mv: &Node) -> Result<ItemId, MoveStatus> {
        let src = mv
            .get("SrcMsgId")
            .filter(|v| !v.is_empty())
            .ok_or(MoveStatus::InvalidSource)?;
        let src_folder = mv
            .get("SrcFldId")
            .filter(|v| !v.is_empty())
            .ok_or(MoveStatus::InvalidSource)?;
        let dst_folder = mv
            .get("DstFldId")
            .filter(|v| !v.is_empty())
            .ok_or(MoveStatus::InvalidDestination)?;

        let class =
            data_class_for_id(src).ok_or(MoveStatus::InvalidSource)?;
        // Moves never cross data classes.
        if Some(class) != data_class_for_id(dst_folder) {
            return Err(MoveStatus::InvalidDestination);
        }

        let record = self
            .store
            .record_by_id(class, &ItemId(src.to_owned()))
            .map_err(|e| match e {
                Error::NxItem => MoveStatus::InvalidSource,
                e => {
                    error!(
                        "{} MoveItems: reading {} failed: {}",
                        self.log_prefix, src, e
                    );
                    MoveStatus::ServerError
                }
            })?;
        if record.group.as_str() != src_folder {
            return Err(MoveStatus::InvalidSource);
        }

        self.store
            .move_record(class, &record.id, &GroupId(dst_folder.to_owned()))
            .map_err(|e| match e {
                Error::NxItem => MoveStatus::InvalidSource,
                Error::NxFolder => MoveStatus::InvalidDestination,
                Error::MoveToSelf => MoveStatus::SameFolder,
                e => {
                    error!(
                        "{} MoveItems: moving {} failed: {}",
                        self.log_prefix, src, e
                    );
                    MoveStatus::ServerError
                }
            })
    }
}
