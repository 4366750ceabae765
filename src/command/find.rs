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
use super::recipients::picture_node;
use super::search::{folder_scope, parse_predicate};
use crate::model::DataClass;
use crate::protocol::document::{Document, Node};
use crate::protocol::options::CommandOptions;
use crate::protocol::status::FindStatus;
use crate::sync::cursor::PictureBudget;

impl CommandProcessor {
    /// Stateless search: every call re-evaluates the query and serves an
    /// arbitrary window of the fresh results, with no remainder persisted.
    /// Contact results carry their photo, subject to the picture budgets.
    pub fn cmd_find(
        &mut self,
        req: &Document,
        opts: &CommandOptions,
    ) -> Document {
        finish(self.find(req, opts))
    }

    fn find(&mut self, req: &Document, opts: &CommandOptions) -> CmdResult {
        const CMD: &str = "Find";
        let protocol_error =
            || status_only(CMD, FindStatus::ProtocolError.code());

        let query = req.child("Query").ok_or_else(protocol_error)?;
        let predicate =
            parse_predicate(query).map_err(|()| protocol_error())?;
        if predicate.is_vacuous() {
            return Err(protocol_error());
        }

        let classes =
            self.requested_classes(req).map_err(|()| protocol_error())?;
        let scope = folder_scope(req);

        let (start, end) = match opts.range {
            Some((start, end)) => (start as usize, end as usize),
            None => (0, self.config.search.default_window as usize),
        };
        if end < start {
            return Err(status_only(CMD, FindStatus::RangeError.code()));
        }

        let results = self
            .cursor
            .evaluate(
                &*self.store,
                &classes,
                scope.as_deref(),
                opts.deep_traversal,
                &predicate,
            )
            .map_err(map_error!(self, CMD, FindStatus::ServerError.code()))?;

        let total = results.len();
        let window = &results[start.min(total)..end.min(total)];

        let mut budget = PictureBudget::new(
            opts.max_picture_bytes
                .unwrap_or(self.config.search.max_picture_bytes),
            opts.max_pictures.unwrap_or(self.config.search.max_pictures),
        );

        let mut response = Document::new(CMD);
        response.set("Status", FindStatus::Success.code());
        response.set("Total", total);
        response.set("Range", format!("{}-{}", start, start + window.len()));

        let mut results_node = Node::new("Results");
        for entry in window {
            let record = self
                .store
                .record_by_id(entry.class, &entry.item)
                .map_err(map_error!(
                    self,
                    CMD,
                    FindStatus::ServerError.code()
                ))?;

            let mut result = Node::new("Result");
            result.set("Class", entry.class);
            result.set("CollectionId", &entry.group);
            result.set("LongId", &entry.item);
            result.set("DisplayName", &record.subject);
            if DataClass::Contacts == entry.class {
                result.push(picture_node(&record.picture, &mut budget));
            }
            results_node.push(result);
        }
        response.push(results_node);

        Ok(response)
    }
}
