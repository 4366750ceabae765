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

use chrono::prelude::*;

use super::defs::*;
use crate::model::{DataClass, GroupId};
use crate::protocol::document::{Document, Node};
use crate::protocol::options::CommandOptions;
use crate::protocol::status::SearchStatus;
use crate::sync::cursor::SearchPredicate;

/// Build a predicate from a request's `Query` element.
///
/// Criteria: `FreeText`, `LinkedId`, `ConversationId`, `ReceivedBefore`,
/// `ReceivedSince`, and a nested `Or` clause carrying the same grammar.
/// `Err` means a criterion was present but unreadable (a bad timestamp).
pub(super) fn parse_predicate(query: &Node) -> Result<SearchPredicate, ()> {
    let mut predicate = SearchPredicate::default();
    predicate.free_text = owned_criterion(query, "FreeText");
    predicate.linked_ref = owned_criterion(query, "LinkedId");
    predicate.conversation_id = owned_criterion(query, "ConversationId");

    if let Some(raw) = query.get("ReceivedBefore") {
        predicate.received_before = Some(parse_time(raw)?);
    }
    if let Some(raw) = query.get("ReceivedSince") {
        predicate.received_since = Some(parse_time(raw)?);
    }
    if let Some(or) = query.child("Or") {
        predicate.alternative = Some(Box::new(parse_predicate(or)?));
    }
    Ok(predicate)
}

fn owned_criterion(query: &Node, name: &str) -> Option<String> {
    query.get(name).filter(|v| !v.is_empty()).map(str::to_owned)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, ()> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ())
}

/// The folder ids a request's `Folders` element scopes the search to, if
/// any.
pub(super) fn folder_scope(req: &Document) -> Option<Vec<GroupId>> {
    let folders: Vec<GroupId> = req
        .child("Folders")?
        .children_named("Folder")
        .filter_map(|n| n.value())
        .filter(|v| !v.is_empty())
        .map(|v| GroupId(v.to_owned()))
        .collect();
    if folders.is_empty() {
        None
    } else {
        Some(folders)
    }
}

impl CommandProcessor {
    /// The data classes a request asks to cover: the named `Class`
    /// elements, or every enabled class if none are named. `Err` on a name
    /// that is not a data class at all.
    ///
    /// A named class that is disabled contributes nothing — naming only
    /// disabled classes therefore matches nothing, rather than widening the
    /// search to classes the client never asked for.
    pub(super) fn requested_classes(
        &self,
        req: &Document,
    ) -> Result<Vec<DataClass>, ()> {
        let mut named = Vec::new();
        let mut any_named = false;
        for node in req.children_named("Class") {
            let class = node
                .value()
                .and_then(DataClass::from_name)
                .ok_or(())?;
            any_named = true;
            if self.class_enabled(class) {
                named.push(class);
            }
        }
        if !any_named {
            named = DataClass::ALL
                .iter()
                .copied()
                .filter(|&c| self.class_enabled(c))
                .collect();
        }
        Ok(named)
    }

    /// Stateful, windowed search.
    ///
    /// The first call (or any call with the rebuild option) evaluates the
    /// query and persists the result sequence under the session's state
    /// key; later calls page through the persisted remainder. Windows must
    /// continue exactly where the previous one ended.
    pub fn cmd_search(
        &mut self,
        req: &Document,
        opts: &CommandOptions,
    ) -> Document {
        finish(self.search(req, opts))
    }

    fn search(&mut self, req: &Document, opts: &CommandOptions) -> CmdResult {
        const CMD: &str = "Search";
        let protocol_error =
            || status_only(CMD, SearchStatus::ProtocolError.code());

        let query = req.child("Query").ok_or_else(protocol_error)?;
        let predicate =
            parse_predicate(query).map_err(|()| protocol_error())?;
        if predicate.is_vacuous() {
            return Err(protocol_error());
        }

        let classes =
            self.requested_classes(req).map_err(|()| protocol_error())?;
        let scope = folder_scope(req);

        let key = self.session.state_key();
        let resumed = if opts.rebuild {
            None
        } else {
            self.cursor.resume(&key)
        };
        let state = match resumed {
            Some(state) => state,
            None => {
                let results = self
                    .cursor
                    .evaluate(
                        &*self.store,
                        &classes,
                        scope.as_deref(),
                        opts.deep_traversal,
                        &predicate,
                    )
                    .map_err(map_error!(
                        self,
                        CMD,
                        SearchStatus::ServerError.code()
                    ))?;
                self.cursor.begin(&key, results)
            }
        };
        let mut state = state.lock().unwrap();

        let (start, end) = match opts.range {
            Some((start, end)) => (start as usize, end as usize),
            None => {
                let start = state.offset();
                (start, start + self.config.search.default_window as usize)
            }
        };
        let max_items =
            opts.max_items.unwrap_or(self.config.search.max_items);

        let total = state.total();
        let page = state.serve(start, end, Some(max_items)).ok_or_else(
            || status_only(CMD, SearchStatus::RangeError.code()),
        )?;

        let mut response = Document::new(CMD);
        response.set("Status", SearchStatus::Success.code());
        response.set("Total", total);
        response.set("Range", format!("{}-{}", start, start + page.len()));

        let mut results = Node::new("Results");
        for served in &page {
            let mut result = Node::new("Result");
            if served.truncated {
                result.set("Status", SearchStatus::LimitReached.code());
                result.set("LongId", &served.entry.item);
            } else {
                result.set("Status", SearchStatus::Success.code());
                result.set("Class", served.entry.class);
                result.set("CollectionId", &served.entry.group);
                result.set("LongId", &served.entry.item);
            }
            results.push(result);
        }
        response.push(results);

        Ok(response)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::super::defs::test_prelude::*;
    use crate::model::*;
    use crate::protocol::document::{Document, Node};
    use crate::protocol::options::CommandOptions;
    use crate::store::MemoryStore;

    fn search_request(free_text: &str) -> Document {
        let mut req = request("Search");
        let mut query = Node::new("Query");
        query.set("FreeText", free_text);
        req.push(query);
        req
    }

    fn window(start: u32, end: u32) -> CommandOptions {
        CommandOptions {
            range: Some((start, end)),
            ..CommandOptions::default()
        }
    }

    fn seeded_store(matching: usize) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::with_default_folders());
        let inbox = GroupId("E1".to_owned());
        for n in 0..matching {
            store.insert_record(
                DataClass::Email,
                &inbox,
                ItemRecord::seed(&format!("budget item {}", n), ""),
                SyncStatus::Ok,
            );
        }
        store
    }

    #[test]
    fn finds_matches_across_folders() {
        let store = seeded_store(1);
        store.insert_record(
            DataClass::Email,
            &GroupId("E2".to_owned()),
            ItemRecord::seed("budget draft", ""),
            SyncStatus::Ok,
        );
        let mut setup = set_up_with_store(store);

        let response = setup.processor.cmd_search(
            &search_request("budget"),
            &CommandOptions::default(),
        );
        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("2"), response.get("Total"));
        assert_eq!(Some("0-2"), response.get("Range"));
        assert_eq!(
            2,
            response
                .child("Results")
                .unwrap()
                .children_named("Result")
                .count(),
        );
    }

    #[test]
    fn pages_partition_the_result_sequence() {
        let mut setup = set_up_with_store(seeded_store(12));
        let req = search_request("budget");

        let mut seen = Vec::new();
        for &(start, end, expect) in
            &[(0, 5, 5), (5, 10, 5), (10, 15, 2)]
        {
            let response =
                setup.processor.cmd_search(&req, &window(start, end));
            assert_eq!(Some("1"), response.get("Status"));
            assert_eq!(Some("12"), response.get("Total"));

            let page: Vec<String> = response
                .child("Results")
                .unwrap()
                .children_named("Result")
                .filter_map(|r| r.get("LongId"))
                .map(str::to_owned)
                .collect();
            assert_eq!(expect, page.len());
            seen.extend(page);
        }

        seen.sort();
        seen.dedup();
        assert_eq!(12, seen.len());
    }

    #[test]
    fn non_contiguous_window_is_a_range_error() {
        let mut setup = set_up_with_store(seeded_store(12));
        let req = search_request("budget");

        setup.processor.cmd_search(&req, &window(0, 5));
        let response = setup.processor.cmd_search(&req, &window(7, 10));
        assert_eq!(Some("4"), response.get("Status"));
        assert!(!response.has_child("Results"));

        // The failed call consumed nothing.
        let response = setup.processor.cmd_search(&req, &window(5, 10));
        assert_eq!(Some("1"), response.get("Status"));
    }

    #[test]
    fn rebuild_starts_the_sequence_over() {
        let mut setup = set_up_with_store(seeded_store(12));
        let req = search_request("budget");

        setup.processor.cmd_search(&req, &window(0, 5));
        let opts = CommandOptions {
            rebuild: true,
            ..window(0, 5)
        };
        let response = setup.processor.cmd_search(&req, &opts);
        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("0-5"), response.get("Range"));
    }

    #[test]
    fn item_budget_degrades_trailing_entries() {
        let mut setup = set_up_with_store(seeded_store(8));
        let opts = CommandOptions {
            max_items: Some(5),
            ..window(0, 8)
        };

        let response = setup
            .processor
            .cmd_search(&search_request("budget"), &opts);
        let statuses: Vec<_> = response
            .child("Results")
            .unwrap()
            .children_named("Result")
            .filter_map(|r| r.get("Status"))
            .collect();
        assert_eq!(vec!["1", "1", "1", "1", "1", "5", "5", "5"], statuses);
    }

    #[test]
    fn vacuous_or_missing_queries_are_protocol_errors() {
        let mut setup = set_up();

        let response = setup
            .processor
            .cmd_search(&request("Search"), &CommandOptions::default());
        assert_eq!(Some("2"), response.get("Status"));

        let response = setup
            .processor
            .cmd_search(&search_request(""), &CommandOptions::default());
        assert_eq!(Some("2"), response.get("Status"));

        let mut req = request("Search");
        let mut query = Node::new("Query");
        query.set("ReceivedSince", "not a timestamp");
        req.push(query);
        let response = setup
            .processor
            .cmd_search(&req, &CommandOptions::default());
        assert_eq!(Some("2"), response.get("Status"));
    }

    #[test]
    fn class_and_folder_scoping() {
        let store = seeded_store(2);
        store.insert_record(
            DataClass::Contacts,
            &GroupId("C1".to_owned()),
            ItemRecord::seed("Budget Office", ""),
            SyncStatus::Ok,
        );
        let mut setup = set_up_with_store(store);

        let mut req = search_request("budget");
        req.push(Node::text("Class", "Contacts"));
        let response = setup
            .processor
            .cmd_search(&req, &CommandOptions::default());
        assert_eq!(Some("1"), response.get("Total"));

        let mut req = search_request("budget");
        req.push(Node::text("Class", "Paperclips"));
        let response = setup.processor.cmd_search(
            &req,
            &CommandOptions {
                rebuild: true,
                ..CommandOptions::default()
            },
        );
        assert_eq!(Some("2"), response.get("Status"));

        let mut req = search_request("budget");
        let mut folders = Node::new("Folders");
        folders.push(Node::text("Folder", "E2"));
        req.push(folders);
        let response = setup.processor.cmd_search(
            &req,
            &CommandOptions {
                rebuild: true,
                ..CommandOptions::default()
            },
        );
        assert_eq!(Some("0"), response.get("Total"));
    }

    #[test]
    fn naming_only_disabled_classes_matches_nothing() {
        let store = seeded_store(1);
        store.insert_record(
            DataClass::Contacts,
            &GroupId("C1".to_owned()),
            ItemRecord::seed("Budget Office", ""),
            SyncStatus::Ok,
        );
        let mut config =
            crate::support::system_config::SystemConfig::default();
        config.sync.disabled_classes.push("Contacts".to_owned());
        let mut setup = set_up_full(store, config);

        // Explicitly scoped to a disabled class: the scope is honored as
        // empty, not silently widened to the enabled classes.
        let mut req = search_request("budget");
        req.push(Node::text("Class", "Contacts"));
        let response = setup
            .processor
            .cmd_search(&req, &CommandOptions::default());
        assert_eq!(Some("1"), response.get("Status"));
        assert_eq!(Some("0"), response.get("Total"));

        // Naming no class at all still covers every enabled class.
        let response = setup.processor.cmd_search(
            &search_request("budget"),
            &CommandOptions {
                rebuild: true,
                ..CommandOptions::default()
            },
        );
        assert_eq!(Some("1"), response.get("Total"));
    }

    #[test]
    fn or_clause_widens_the_match() {
        let store = seeded_store(1);
        store.insert_record(
            DataClass::Email,
            &GroupId("E1".to_owned()),
            ItemRecord::seed("forecast update", ""),
            SyncStatus::Ok,
        );
        let mut setup = set_up_with_store(store);

        let mut query = Node::new("Query");
        query.set("FreeText", "budget");
        let mut or = Node::new("Or");
        or.set("FreeText", "forecast");
        query.push(or);
        let mut req = request("Search");
        req.push(query);

        let response = setup
            .processor
            .cmd_search(&req, &CommandOptions::default());
        assert_eq!(Some("2"), response.get("Total"));
    }
}
