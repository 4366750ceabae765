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
use crate::model::{DataClass, ItemRecord};
use crate::protocol::document::{Document, Node};
use crate::protocol::options::CommandOptions;
use crate::protocol::status::{
    PictureStatus, RecipientStatus, ResolveStatus,
};
use crate::sync::cursor::{PictureBudget, PictureFit};

impl CommandProcessor {
    /// Resolve free-form recipient strings against the contacts classes.
    ///
    /// A recipient matches a contact by exact (case-insensitive) address or
    /// by display-name substring. Each `To` element resolves on its own;
    /// the envelope status stays "success" even when individual recipients
    /// are ambiguous or unknown, because a partial answer is still an
    /// answer.
    pub fn cmd_resolve_recipients(
        &mut self,
        req: &Document,
        opts: &CommandOptions,
    ) -> Document {
        finish(self.resolve_recipients(req, opts))
    }

    fn resolve_recipients(
        &mut self,
        req: &Document,
        opts: &CommandOptions,
    ) -> CmdResult {
        const CMD: &str = "ResolveRecipients";

        let targets: Vec<&str> = req
            .children_named("To")
            .filter_map(|n| n.value())
            .filter(|v| !v.is_empty())
            .collect();
        if targets.is_empty() {
            return Err(status_only(
                CMD,
                ResolveStatus::ProtocolError.code(),
            ));
        }

        let mut contacts = Vec::new();
        for group in
            self.store.list_groups(DataClass::Contacts).map_err(map_error!(
                self,
                CMD,
                ResolveStatus::ServerError.code()
            ))?
        {
            contacts.extend(
                self.store
                    .list_records(DataClass::Contacts, &group.id)
                    .map_err(map_error!(
                        self,
                        CMD,
                        ResolveStatus::ServerError.code()
                    ))?,
            );
        }

        let mut budget = PictureBudget::new(
            opts.max_picture_bytes
                .unwrap_or(self.config.search.max_picture_bytes),
            opts.max_pictures.unwrap_or(self.config.search.max_pictures),
        );

        let mut response = Document::new(CMD);
        response.set("Status", ResolveStatus::Success.code());
        for to in targets {
            response.push(resolve_one(
                to,
                &contacts,
                opts.max_ambiguous_recipients,
                &mut budget,
            ));
        }
        Ok(response)
    }
}

fn matches(contact: &ItemRecord, to: &str) -> bool {
    contact
        .email
        .as_deref()
        .map_or(false, |email| email.eq_ignore_ascii_case(to))
        || contact
            .subject
            .to_lowercase()
            .contains(&to.to_lowercase())
}

fn resolve_one(
    to: &str,
    contacts: &[ItemRecord],
    ambiguous_cap: Option<usize>,
    budget: &mut PictureBudget,
) -> Node {
    let hits: Vec<&ItemRecord> =
        contacts.iter().filter(|c| matches(c, to)).collect();

    let mut node = Node::new("Response");
    node.set("To", to);
    let status = match hits.len() {
        0 => RecipientStatus::NotFound,
        1 => RecipientStatus::Resolved,
        _ => RecipientStatus::Ambiguous,
    };
    node.set("Status", status.code());
    node.set("RecipientCount", hits.len());

    let listed = if hits.len() > 1 {
        ambiguous_cap.unwrap_or(hits.len())
    } else {
        hits.len()
    };
    for contact in hits.into_iter().take(listed) {
        let mut recipient = Node::new("Recipient");
        recipient.set("DisplayName", &contact.subject);
        if let Some(ref email) = contact.email {
            recipient.set("EmailAddress", email);
        }
        recipient.push(picture_node(&contact.picture, budget));
        node.push(recipient);
    }
    node
}

/// A `Picture` element for one contact, against the response's shared
/// budget. Also used by Find.
pub(super) fn picture_node(
    picture: &Option<Vec<u8>>,
    budget: &mut PictureBudget,
) -> Node {
    let mut node = Node::new("Picture");
    match picture {
        None => node.set("Status", PictureStatus::NoPhoto.code()),
        Some(bytes) => match budget.admit(bytes.len()) {
            PictureFit::Attached => {
                node.set("Status", PictureStatus::Success.code());
                node.set("Data", base64::encode(bytes));
            }
            PictureFit::TooLarge => {
                node.set("Status", PictureStatus::TooLarge.code());
            }
            PictureFit::CountExhausted => {
                node.set("Status", PictureStatus::MaxPicturesExceeded.code());
            }
        },
    }
    node
}
