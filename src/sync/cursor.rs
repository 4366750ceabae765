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

//! Stateful, paginated search.
//!
//! One evaluation produces an ordered result sequence; the unconsumed tail
//! is persisted per requester so later windowed requests resume without
//! recomputation. Pages are served strictly in order --- the sequence is
//! never reordered, only shifted --- and budget exhaustion degrades
//! individual entries instead of failing the page.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::prelude::*;
use log::debug;

use crate::model::*;
use crate::store::RecordStore;
use crate::support::error::Error;

/// The search criteria of one request.
///
/// Each present criterion is an independent alternative: a record matches
/// the predicate if *any* criterion accepts it, first match wins, with the
/// `alternative` clause unioned in the same way. This deliberately
/// preserves the protocol's permissive union-of-criteria behaviour rather
/// than a conjunctive reading of the request grammar.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPredicate {
    /// Case-insensitive free-text match over subject, body, and address.
    pub free_text: Option<String>,
    /// Exact match on the record's linked-resource reference.
    pub linked_ref: Option<String>,
    /// Exact match on the record's conversation id.
    pub conversation_id: Option<String>,
    /// Matches records strictly older than the bound.
    pub received_before: Option<DateTime<Utc>>,
    /// Matches records at or after the bound.
    pub received_since: Option<DateTime<Utc>>,
    /// A further independent alternative.
    pub alternative: Option<Box<SearchPredicate>>,
}

impl SearchPredicate {
    /// Whether no criterion at all was specified. A vacuous predicate
    /// matches nothing; handlers reject it as a protocol error before
    /// evaluation.
    pub fn is_vacuous(&self) -> bool {
        self.free_text.is_none()
            && self.linked_ref.is_none()
            && self.conversation_id.is_none()
            && self.received_before.is_none()
            && self.received_since.is_none()
            && self
                .alternative
                .as_ref()
                .map_or(true, |alt| alt.is_vacuous())
    }

    pub fn matches(&self, record: &ItemRecord) -> bool {
        if let Some(ref text) = self.free_text {
            let needle = text.to_lowercase();
            let hit = record.subject.to_lowercase().contains(&needle)
                || record.body.to_lowercase().contains(&needle)
                || record
                    .email
                    .as_deref()
                    .map_or(false, |e| e.to_lowercase().contains(&needle));
            if hit {
                return true;
            }
        }

        if let Some(ref linked) = self.linked_ref {
            if Some(linked.as_str()) == record.linked_ref.as_deref() {
                return true;
            }
        }

        if let Some(ref conversation) = self.conversation_id {
            if Some(conversation.as_str())
                == record.conversation_id.as_deref()
            {
                return true;
            }
        }

        if let Some(before) = self.received_before {
            if record.timestamp < before {
                return true;
            }
        }

        if let Some(since) = self.received_since {
            if record.timestamp >= since {
                return true;
            }
        }

        if let Some(ref alternative) = self.alternative {
            if alternative.matches(record) {
                return true;
            }
        }

        false
    }
}

/// One search hit: enough to locate the record without holding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultEntry {
    pub class: DataClass,
    pub group: GroupId,
    pub item: ItemId,
}

/// One entry of a served page. `truncated` entries fell past the item
/// budget and are reported with the "limit reached" status instead of a
/// payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagedEntry {
    pub entry: ResultEntry,
    pub truncated: bool,
}

/// The persisted portion of one requester's search: the unconsumed tail of
/// the result sequence plus how far it has been consumed.
pub struct CursorState {
    tail: VecDeque<ResultEntry>,
    offset: usize,
    total: usize,
}

impl CursorState {
    pub fn new(results: Vec<ResultEntry>) -> Self {
        CursorState {
            total: results.len(),
            offset: 0,
            tail: results.into(),
        }
    }

    /// Total hits of the original evaluation, independent of consumption.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Absolute index of the first unconsumed entry.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Serve the window `[start, end)`.
    ///
    /// Windows must continue the sequence exactly where it left off
    /// (`start == offset()`); anything else is a range error, reported as
    /// `None`. A window reaching past the end of the sequence is served
    /// short rather than failing. Entries past `max_items` are served
    /// truncated; they still consume their position so the next window
    /// continues after them.
    pub fn serve(
        &mut self,
        start: usize,
        end: usize,
        max_items: Option<usize>,
    ) -> Option<Vec<PagedEntry>> {
        if start != self.offset || end < start {
            return None;
        }

        let count = (end - start).min(self.tail.len());
        let mut page = Vec::with_capacity(count);
        for ix in 0..count {
            let entry = self.tail.pop_front().expect("tail shorter than count");
            page.push(PagedEntry {
                entry,
                truncated: max_items.map_or(false, |max| ix >= max),
            });
        }
        self.offset += count;
        Some(page)
    }
}

/// Owns the per-requester persisted cursors.
///
/// The map itself is guarded by one lock, each state by its own, so two
/// overlapping requests for the same key contend only with each other.
/// Overlap is not expected from well-behaved clients; this is defensive.
#[derive(Default)]
pub struct SearchCursor {
    cache: Mutex<HashMap<String, Arc<Mutex<CursorState>>>>,
}

impl SearchCursor {
    pub fn new() -> Self {
        SearchCursor::default()
    }

    /// Evaluate `predicate` over the requested classes and folder scope,
    /// in stable order.
    ///
    /// `folder_scope`, when present, restricts the scan to those folders
    /// (assumed to belong to the requested classes); `deep` additionally
    /// takes in every folder below a scoped one. Without a scope, all
    /// folders of each class are scanned. Group records themselves are
    /// touched once for traceability but never become candidates.
    pub fn evaluate(
        &self,
        store: &dyn RecordStore,
        classes: &[DataClass],
        folder_scope: Option<&[GroupId]>,
        deep: bool,
        predicate: &SearchPredicate,
    ) -> Result<Vec<ResultEntry>, Error> {
        let mut results = Vec::new();

        for &class in classes {
            let groups = store.list_groups(class)?;
            for group in &groups {
                let in_scope = match folder_scope {
                    None => true,
                    Some(scope) => {
                        scope.contains(&group.id)
                            || (deep
                                && in_subtree_of(&groups, group, scope))
                    }
                };
                if !in_scope {
                    continue;
                }

                debug!(
                    "search: scanning {} group {} ({})",
                    class, group.id, group.display_name
                );

                for record in store.list_records(class, &group.id)? {
                    if predicate.matches(&record) {
                        results.push(ResultEntry {
                            class,
                            group: group.id.clone(),
                            item: record.id,
                        });
                    }
                }
            }
        }

        Ok(results)
    }

    /// Replace any persisted state for `key` with a fresh evaluation's
    /// results.
    pub fn begin(
        &self,
        key: &str,
        results: Vec<ResultEntry>,
    ) -> Arc<Mutex<CursorState>> {
        let state = Arc::new(Mutex::new(CursorState::new(results)));
        self.cache
            .lock()
            .unwrap()
            .insert(key.to_owned(), Arc::clone(&state));
        state
    }

    /// The persisted state for `key`, if an evaluation is in progress.
    pub fn resume(&self, key: &str) -> Option<Arc<Mutex<CursorState>>> {
        self.cache.lock().unwrap().get(key).cloned()
    }

    pub fn discard(&self, key: &str) {
        self.cache.lock().unwrap().remove(key);
    }
}

/// Whether `group` sits anywhere below a folder in `scope`.
fn in_subtree_of(
    groups: &[FolderRecord],
    group: &FolderRecord,
    scope: &[GroupId],
) -> bool {
    let mut parent = &group.parent;
    // Walk up at most the hierarchy's depth; a parent cycle (which the
    // store should never produce) terminates at the bound instead of
    // looping forever.
    for _ in 0..groups.len() {
        if parent.is_root() {
            return false;
        }
        if scope.contains(parent) {
            return true;
        }
        match groups.iter().find(|g| g.id == *parent) {
            Some(p) => parent = &p.parent,
            None => return false,
        }
    }
    false
}

/// Byte and count budget for photos attached to one response.
pub struct PictureBudget {
    bytes_left: usize,
    pictures_left: usize,
}

/// How a photo fared against the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PictureFit {
    Attached,
    TooLarge,
    CountExhausted,
}

impl PictureBudget {
    pub fn new(max_bytes: usize, max_pictures: usize) -> Self {
        PictureBudget {
            bytes_left: max_bytes,
            pictures_left: max_pictures,
        }
    }

    /// Try to fit a photo of `size` bytes, consuming budget on success.
    pub fn admit(&mut self, size: usize) -> PictureFit {
        if 0 == self.pictures_left {
            PictureFit::CountExhausted
        } else if size > self.bytes_left {
            PictureFit::TooLarge
        } else {
            self.bytes_left -= size;
            self.pictures_left -= 1;
            PictureFit::Attached
        }
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::store::MemoryStore;

    fn entry(n: usize) -> ResultEntry {
        ResultEntry {
            class: DataClass::Email,
            group: GroupId("E1".to_owned()),
            item: ItemId(format!("E{}", 100 + n)),
        }
    }

    fn mail(subject: &str, body: &str) -> ItemRecord {
        ItemRecord::seed(subject, body)
    }

    #[test]
    fn vacuous_predicate_matches_nothing() {
        let predicate = SearchPredicate::default();
        assert!(predicate.is_vacuous());
        assert!(!predicate.matches(&mail("anything", "at all")));
    }

    #[test]
    fn free_text_is_case_insensitive_and_spans_fields() {
        let predicate = SearchPredicate {
            free_text: Some("Quarterly".to_owned()),
            ..SearchPredicate::default()
        };
        assert!(predicate.matches(&mail("QUARTERLY report", "")));
        assert!(predicate.matches(&mail("", "see the quarterly numbers")));
        assert!(!predicate.matches(&mail("annual report", "")));

        let mut contact = mail("Quincy", "");
        contact.email = Some("quarterly-updates@example.org".to_owned());
        assert!(predicate.matches(&contact));
    }

    #[test]
    fn criteria_union_rather_than_intersect() {
        // Matches the free text but not the conversation, and vice versa:
        // either alone is enough.
        let predicate = SearchPredicate {
            free_text: Some("budget".to_owned()),
            conversation_id: Some("conv-7".to_owned()),
            ..SearchPredicate::default()
        };

        let by_text = mail("budget draft", "");
        assert!(predicate.matches(&by_text));

        let mut by_conversation = mail("unrelated", "");
        by_conversation.conversation_id = Some("conv-7".to_owned());
        assert!(predicate.matches(&by_conversation));

        let neither = mail("unrelated", "");
        assert!(!predicate.matches(&neither));
    }

    #[test]
    fn or_clause_is_an_independent_alternative() {
        let predicate = SearchPredicate {
            free_text: Some("budget".to_owned()),
            alternative: Some(Box::new(SearchPredicate {
                free_text: Some("forecast".to_owned()),
                ..SearchPredicate::default()
            })),
            ..SearchPredicate::default()
        };

        assert!(predicate.matches(&mail("budget", "")));
        assert!(predicate.matches(&mail("forecast", "")));
        assert!(!predicate.matches(&mail("retrospective", "")));
    }

    #[test]
    fn date_criteria_are_one_sided() {
        let bound = Utc.ymd(2026, 3, 1).and_hms(0, 0, 0);
        let before = SearchPredicate {
            received_before: Some(bound),
            ..SearchPredicate::default()
        };
        let since = SearchPredicate {
            received_since: Some(bound),
            ..SearchPredicate::default()
        };

        let mut old = mail("old", "");
        old.timestamp = Utc.ymd(2026, 2, 1).and_hms(0, 0, 0);
        let mut at_bound = mail("at bound", "");
        at_bound.timestamp = bound;

        assert!(before.matches(&old));
        assert!(!before.matches(&at_bound));
        // "since" is inclusive.
        assert!(since.matches(&at_bound));
        assert!(!since.matches(&old));
    }

    #[test]
    fn evaluation_respects_folder_scope() {
        let store = MemoryStore::with_default_folders();
        let inbox = GroupId("E1".to_owned());
        let drafts = GroupId("E2".to_owned());
        store.insert_record(
            DataClass::Email,
            &inbox,
            mail("budget in inbox", ""),
            SyncStatus::Ok,
        );
        store.insert_record(
            DataClass::Email,
            &drafts,
            mail("budget in drafts", ""),
            SyncStatus::Ok,
        );

        let cursor = SearchCursor::new();
        let predicate = SearchPredicate {
            free_text: Some("budget".to_owned()),
            ..SearchPredicate::default()
        };

        let scoped = cursor
            .evaluate(
                &store,
                &[DataClass::Email],
                Some(&[inbox.clone()]),
                false,
                &predicate,
            )
            .unwrap();
        assert_eq!(1, scoped.len());
        assert_eq!(inbox, scoped[0].group);

        let unscoped = cursor
            .evaluate(&store, &[DataClass::Email], None, false, &predicate)
            .unwrap();
        assert_eq!(2, unscoped.len());
    }

    #[test]
    fn deep_traversal_takes_in_subfolders() {
        let store = MemoryStore::with_default_folders();
        let inbox = GroupId("E1".to_owned());
        let sub = store
            .create_group(DataClass::Email, &inbox, "Receipts")
            .unwrap();
        store.insert_record(
            DataClass::Email,
            &sub.id,
            mail("budget receipt", ""),
            SyncStatus::Ok,
        );

        let cursor = SearchCursor::new();
        let predicate = SearchPredicate {
            free_text: Some("budget".to_owned()),
            ..SearchPredicate::default()
        };

        let shallow = cursor
            .evaluate(
                &store,
                &[DataClass::Email],
                Some(&[inbox.clone()]),
                false,
                &predicate,
            )
            .unwrap();
        assert!(shallow.is_empty());

        let deep = cursor
            .evaluate(
                &store,
                &[DataClass::Email],
                Some(&[inbox]),
                true,
                &predicate,
            )
            .unwrap();
        assert_eq!(1, deep.len());
        assert_eq!(sub.id, deep[0].group);
    }

    #[test]
    fn windows_partition_without_gaps_or_overlap() {
        let results: Vec<_> = (0..12).map(entry).collect();
        let mut state = CursorState::new(results.clone());
        assert_eq!(12, state.total());

        let first = state.serve(0, 5, None).unwrap();
        let second = state.serve(5, 10, None).unwrap();
        let third = state.serve(10, 15, None).unwrap();

        let mut reassembled = Vec::new();
        for page in [&first, &second, &third].iter() {
            assert!(page.iter().all(|e| !e.truncated));
            reassembled.extend(page.iter().map(|e| e.entry.clone()));
        }
        assert_eq!(results, reassembled);
        // Past the end: a correctly-continuing empty window, not an error.
        assert_eq!(Some(0), state.serve(12, 17, None).map(|p| p.len()));
    }

    #[test]
    fn non_contiguous_window_is_a_range_error() {
        let mut state = CursorState::new((0..12).map(entry).collect());
        assert!(state.serve(5, 10, None).is_none());

        state.serve(0, 5, None).unwrap();
        assert!(state.serve(0, 5, None).is_none());
        assert!(state.serve(6, 10, None).is_none());
        assert!(state.serve(5, 4, None).is_none());
    }

    #[test]
    fn item_budget_degrades_entries_without_dropping_them() {
        let mut state = CursorState::new((0..8).map(entry).collect());
        let page = state.serve(0, 8, Some(5)).unwrap();
        assert_eq!(8, page.len());
        assert!(page[..5].iter().all(|e| !e.truncated));
        assert!(page[5..].iter().all(|e| e.truncated));
        // Truncated entries still consumed their positions.
        assert_eq!(8, state.offset());
    }

    #[test]
    fn rebuild_replaces_persisted_state_wholesale() {
        let cursor = SearchCursor::new();
        let state = cursor.begin("u/d", (0..12).map(entry).collect());
        state.lock().unwrap().serve(0, 5, None).unwrap();

        // Same key, fresh evaluation: the old remainder is gone.
        let rebuilt = cursor.begin("u/d", (0..3).map(entry).collect());
        assert_eq!(0, rebuilt.lock().unwrap().offset());
        assert_eq!(3, rebuilt.lock().unwrap().total());

        cursor.discard("u/d");
        assert!(cursor.resume("u/d").is_none());
    }

    #[test]
    fn cursors_are_keyed_per_requester() {
        let cursor = SearchCursor::new();
        cursor.begin("alice/dev1", (0..5).map(entry).collect());
        cursor.begin("bob/dev1", (0..2).map(entry).collect());

        assert_eq!(
            5,
            cursor.resume("alice/dev1").unwrap().lock().unwrap().total()
        );
        assert_eq!(
            2,
            cursor.resume("bob/dev1").unwrap().lock().unwrap().total()
        );
        assert!(cursor.resume("alice/dev2").is_none());
    }

    #[test]
    fn picture_budget_degrades_in_order() {
        let mut budget = PictureBudget::new(100, 2);
        assert_eq!(PictureFit::Attached, budget.admit(60));
        assert_eq!(PictureFit::TooLarge, budget.admit(50));
        assert_eq!(PictureFit::Attached, budget.admit(40));
        assert_eq!(PictureFit::CountExhausted, budget.admit(1));
    }

    proptest! {
        #[test]
        fn any_contiguous_partition_reassembles_the_sequence(
            len in 0usize..40,
            cuts in proptest::collection::vec(0usize..40, 0..6),
        ) {
            let results: Vec<_> = (0..len).map(entry).collect();
            let mut state = CursorState::new(results.clone());

            let mut bounds: Vec<usize> =
                cuts.into_iter().filter(|&c| c <= len).collect();
            bounds.push(0);
            bounds.push(len);
            bounds.sort_unstable();
            bounds.dedup();

            let mut reassembled = Vec::new();
            for window in bounds.windows(2) {
                let page = state
                    .serve(window[0], window[1], None)
                    .expect("contiguous window rejected");
                reassembled.extend(page.into_iter().map(|e| e.entry));
            }

            prop_assert_eq!(results, reassembled);
        }
    }
}
