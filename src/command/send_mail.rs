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

use log::warn;

use super::defs::*;
use crate::model::{DataClass, FolderAttrs, ItemId, ItemRecord};
use crate::protocol::document::Document;
use crate::protocol::status::SendMailStatus;
use crate::store::data_class_for_id;
use crate::support::error::Error;

/// One message on its way out, as handed to the `Submitter`.
pub struct Outgoing<'a> {
    /// The complete MIME message.
    pub mime: &'a str,
    /// Client-assigned id, for submitters that suppress duplicate
    /// submissions on client retry.
    pub client_id: Option<&'a str>,
    /// The original item a reply or forward refers to, for submitters that
    /// thread or annotate it.
    pub original: Option<&'a ItemRecord>,
}

/// The outbound-mail boundary.
///
/// Actually getting a message onto the wire (SMTP, a local queue, whatever)
/// is the embedding's business; the engine only hands it a finished
/// `Outgoing`.
pub trait Submitter: Send + Sync {
    fn submit(&self, outgoing: &Outgoing<'_>) -> Result<(), Error>;
}

impl CommandProcessor {
    pub fn cmd_send_mail(&mut self, req: &Document) -> Document {
        finish(self.send_mail("SendMail", req, None))
    }

    pub fn cmd_smart_forward(&mut self, req: &Document) -> Document {
        finish(self.smart_forward(req))
    }

    fn smart_forward(&mut self, req: &Document) -> CmdResult {
        const CMD: &str = "SmartForward";

        let folder = req.get("FolderId").filter(|v| !v.is_empty()).ok_or_else(
            || status_only(CMD, SendMailStatus::MalformedRequest.code()),
        )?;
        let item = req.get("ItemId").filter(|v| !v.is_empty()).ok_or_else(
            || status_only(CMD, SendMailStatus::MalformedRequest.code()),
        )?;

        let class = data_class_for_id(item).ok_or_else(|| {
            status_only(CMD, SendMailStatus::NotFound.code())
        })?;
        let original = self
            .store
            .record_by_id(class, &ItemId(item.to_owned()))
            .map_err(map_error!(
                self,
                CMD,
                SendMailStatus::ServerError.code(),
                NxItem => SendMailStatus::NotFound.code(),
            ))?;
        if original.group.as_str() != folder {
            return Err(status_only(CMD, SendMailStatus::NotFound.code()));
        }

        self.send_mail(CMD, req, Some(&original))
    }

    fn send_mail(
        &mut self,
        command: &str,
        req: &Document,
        original: Option<&ItemRecord>,
    ) -> CmdResult {
        let mime = req.get("Mime").filter(|m| !m.is_empty()).ok_or_else(
            || status_only(command, SendMailStatus::MalformedRequest.code()),
        )?;

        let outgoing = Outgoing {
            mime,
            client_id: req.get("ClientId"),
            original,
        };
        self.submitter.submit(&outgoing).map_err(map_error!(
            self,
            command,
            SendMailStatus::ServerError.code()
        ))?;

        if req.get("SaveInSentItems").map_or(false, |v| "0" != v) {
            // The message is already on the wire; failing to file a copy
            // must not fail the command.
            self.save_in_sent(command, mime);
        }

        Ok(status_only(command, SendMailStatus::Success.code()))
    }

    fn save_in_sent(&self, command: &str, mime: &str) {
        let sent = match self.store.list_groups(DataClass::Email) {
            Ok(groups) => groups
                .into_iter()
                .find(|g| g.attrs.contains(FolderAttrs::SENT)),
            Err(e) => {
                warn!(
                    "{} {}: cannot find sent folder: {}",
                    self.log_prefix, command, e
                );
                return;
            }
        };

        let sent = match sent {
            Some(sent) => sent,
            None => {
                warn!(
                    "{} {}: no sent folder provisioned, copy dropped",
                    self.log_prefix, command
                );
                return;
            }
        };

        let seed = ItemRecord::seed(mime_subject(mime), mime);
        if let Err(e) =
            self.store.create_record(DataClass::Email, &sent.id, seed)
        {
            warn!(
                "{} {}: filing copy into {} failed: {}",
                self.log_prefix, command, sent.id, e
            );
        }
    }
}

/// The Subject header of a MIME message, or the empty string.
fn mime_subject(mime: &str) -> &str {
    mime.lines()
        .take_while(|line| !line.is_empty())
        .find_map(|line| match line.get(..8) {
            Some(name) if name.eq_ignore_ascii_case("subject:") => {
                Some(line[8..].trim())
            }
            _ => None,
        })
        .unwrap_or("")
}
