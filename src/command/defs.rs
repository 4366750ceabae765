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

use std::sync::Arc;

use crate::model::{DataClass, GroupId};
use crate::protocol::document::Document;
use crate::protocol::options::SessionContext;
use crate::store::RecordStore;
use crate::support::log_prefix::LogPrefix;
use crate::support::system_config::SystemConfig;
use crate::sync::cursor::SearchCursor;
use crate::sync::key_store::SyncKeyStore;

use super::send_mail::Submitter;

/// Receives command request documents and emits response documents.
///
/// One processor serves one session (one principal on one device); the
/// front end creates it after authentication and drives it with one
/// request at a time. The processor owns the session's sync-key state and
/// persisted search remainders, so it is also where those survive between
/// requests. Different sessions hold disjoint state and run fully in
/// parallel; nothing here is shared across processors except the record
/// store itself.
pub struct CommandProcessor {
    pub(super) log_prefix: LogPrefix,
    pub(super) config: Arc<SystemConfig>,
    pub(super) store: Arc<dyn RecordStore>,
    pub(super) submitter: Arc<dyn Submitter>,
    pub(super) keys: SyncKeyStore,
    pub(super) cursor: SearchCursor,
    pub(super) session: SessionContext,

    /// Parameters of the last successful Ping, reused when a client omits
    /// them on a later call.
    pub(super) last_ping: Option<PingParams>,
}

#[derive(Clone)]
pub(super) struct PingParams {
    pub(super) heartbeat: u32,
    pub(super) monitored: Vec<(GroupId, DataClass)>,
}

/// Used just for the convenient `?` operator. We mostly don't distinguish
/// `Ok` from `Err` --- the contained document is the response either way
/// --- but `Err` short-circuits the rest of the handler.
pub(super) type CmdResult = Result<Document, Document>;

/// Return value from an operation that can either succeed with a value or
/// fail with a complete error response.
pub(super) type PartialResult<T> = Result<T, Document>;

/// A syntactically complete response carrying nothing but a status code.
///
/// Every error path goes through here (directly or via `map_error!`), so
/// even a refused command closes out its response envelope.
pub(super) fn status_only(command: &str, code: u16) -> Document {
    let mut response = Document::new(command);
    response.set("Status", code);
    response
}

pub(super) fn finish(result: CmdResult) -> Document {
    match result {
        Ok(response) | Err(response) => response,
    }
}

impl CommandProcessor {
    pub fn new(
        log_prefix: LogPrefix,
        config: Arc<SystemConfig>,
        store: Arc<dyn RecordStore>,
        submitter: Arc<dyn Submitter>,
        session: SessionContext,
    ) -> Self {
        log_prefix.set_principal(session.principal.clone());
        log_prefix.set_device_id(session.device_id.clone());

        CommandProcessor {
            log_prefix,
            config,
            store,
            submitter,
            keys: SyncKeyStore::new(),
            cursor: SearchCursor::new(),
            session,
            last_ping: None,
        }
    }

    pub fn log_prefix(&self) -> &LogPrefix {
        &self.log_prefix
    }

    pub(super) fn class_enabled(&self, class: DataClass) -> bool {
        !self
            .config
            .sync
            .disabled_classes
            .iter()
            .any(|name| name == class.name())
    }
}

#[cfg(test)]
pub(super) mod test_prelude {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::store::MemoryStore;
    use crate::support::error::Error;
    use crate::support::system_config::SystemConfig;

    /// A `Submitter` that records what was submitted.
    #[derive(Default)]
    pub(in crate::command) struct RecordingSubmitter {
        pub(in crate::command) submitted: Mutex<Vec<String>>,
        pub(in crate::command) fail: Mutex<bool>,
    }

    impl Submitter for RecordingSubmitter {
        fn submit(
            &self,
            outgoing: &crate::command::Outgoing<'_>,
        ) -> Result<(), Error> {
            if *self.fail.lock().unwrap() {
                return Err(Error::StoreUnavailable(
                    "submission failure injected".to_owned(),
                ));
            }
            self.submitted
                .lock()
                .unwrap()
                .push(outgoing.mime.to_owned());
            Ok(())
        }
    }

    pub(in crate::command) struct Setup {
        pub(in crate::command) store: Arc<MemoryStore>,
        pub(in crate::command) submitter: Arc<RecordingSubmitter>,
        pub(in crate::command) processor: CommandProcessor,
    }

    pub(in crate::command) fn set_up() -> Setup {
        set_up_with_config(SystemConfig::default())
    }

    pub(in crate::command) fn set_up_with_config(
        config: SystemConfig,
    ) -> Setup {
        set_up_full(Arc::new(MemoryStore::with_default_folders()), config)
    }

    pub(in crate::command) fn set_up_with_store(
        store: Arc<MemoryStore>,
    ) -> Setup {
        set_up_full(store, SystemConfig::default())
    }

    pub(in crate::command) fn set_up_full(
        store: Arc<MemoryStore>,
        config: SystemConfig,
    ) -> Setup {
        let submitter = Arc::new(RecordingSubmitter::default());
        let processor = CommandProcessor::new(
            LogPrefix::new("test".to_owned()),
            Arc::new(config),
            Arc::clone(&store) as Arc<dyn crate::store::RecordStore>,
            Arc::clone(&submitter) as Arc<dyn Submitter>,
            SessionContext {
                principal: "azure".to_owned(),
                device_id: "droid42".to_owned(),
                protocol_version: "14.1".to_owned(),
            },
        );

        Setup {
            store,
            submitter,
            processor,
        }
    }

    /// Shorthand for building a request document.
    pub(in crate::command) fn request(command: &str) -> Document {
        Document::new(command)
    }
}
