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

//! Per-command status vocabularies.
//!
//! Status codes are small integers scoped to one command; the same number
//! means different things under different commands. Each vocabulary shares
//! the common trio of success / format error / server error and adds its
//! own extensions. `describe` always resolves, falling back to a literal
//! description for codes outside the known set so a front end never has to
//! fail on an unrecognised number.

use std::borrow::Cow;

macro_rules! status_vocab {
    ($(#[$attr:meta])* $name:ident {
        $($(#[$vattr:meta])* $variant:ident = $code:expr => $desc:expr,)*
    }) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $name {
            $($(#[$vattr])* $variant,)*
        }

        impl $name {
            /// The integer code sent on the wire.
            pub fn code(self) -> u16 {
                match self {
                    $($name::$variant => $code,)*
                }
            }

            /// A human-readable description of any code in this command's
            /// number space, including unknown ones.
            pub fn describe(code: u16) -> Cow<'static, str> {
                match code {
                    $($code => Cow::Borrowed($desc),)*
                    _ => Cow::Owned(
                        format!("Unrecognised status code {}", code),
                    ),
                }
            }
        }

        impl From<$name> for u16 {
            fn from(status: $name) -> u16 {
                status.code()
            }
        }
    };
}

status_vocab! {
    /// Statuses for the `FolderSync` command.
    FolderSyncStatus {
        Success = 1 => "Success",
        ServerError = 6 => "An error occurred on the server",
        KeyMismatch = 9 =>
            "Synchronisation key mismatch; resynchronise with key 0",
        MalformedRequest = 10 => "Incorrectly formatted request",
    }
}

status_vocab! {
    /// Statuses for the `FolderCreate` command.
    FolderCreateStatus {
        Success = 1 => "Success",
        AlreadyExists = 2 =>
            "A folder with that name already exists under the parent",
        SpecialFolder = 3 =>
            "The requested folder kind is a reserved system folder",
        ParentNotFound = 5 => "The parent folder does not exist",
        ServerError = 6 => "An error occurred on the server",
        KeyMismatch = 9 =>
            "Synchronisation key mismatch; resynchronise with key 0",
        MalformedRequest = 10 => "Incorrectly formatted request",
    }
}

status_vocab! {
    /// Statuses for the `FolderUpdate` command.
    FolderUpdateStatus {
        Success = 1 => "Success",
        AlreadyExists = 2 =>
            "A folder with that name already exists under the parent",
        SpecialFolder = 3 => "Default folders cannot be updated",
        NotFound = 4 => "The folder does not exist",
        ParentNotFound = 5 => "The target parent folder does not exist",
        ServerError = 6 => "An error occurred on the server",
        KeyMismatch = 9 =>
            "Synchronisation key mismatch; resynchronise with key 0",
        MalformedRequest = 10 => "Incorrectly formatted request",
    }
}

status_vocab! {
    /// Statuses for the `FolderDelete` command.
    FolderDeleteStatus {
        Success = 1 => "Success",
        SpecialFolder = 3 => "Default folders cannot be deleted",
        NotFound = 4 => "The folder does not exist",
        ServerError = 6 => "An error occurred on the server",
        KeyMismatch = 9 =>
            "Synchronisation key mismatch; resynchronise with key 0",
        MalformedRequest = 10 => "Incorrectly formatted request",
    }
}

status_vocab! {
    /// Statuses for the `Ping` command.
    PingStatus {
        Expired = 1 => "The heartbeat elapsed with no changes",
        Changed = 2 => "Changes occurred in at least one monitored folder",
        MissingParameters = 3 =>
            "The request omitted required parameters and none are cached",
        SyntaxError = 4 => "Incorrectly formatted request",
        HeartbeatOutOfRange = 5 =>
            "The requested heartbeat is outside the server's bounds",
        FolderUnknown = 7 =>
            "A monitored folder is unknown; refresh the folder hierarchy",
        ServerError = 8 => "An error occurred on the server",
    }
}

status_vocab! {
    /// Statuses for the `Search` command. Also used per result entry, where
    /// `LimitReached` marks entries degraded by an exhausted budget.
    SearchStatus {
        Success = 1 => "Success",
        ProtocolError = 2 => "The search request could not be understood",
        ServerError = 3 => "An error occurred on the server",
        RangeError = 4 =>
            "The requested range does not continue the result sequence",
        LimitReached = 5 =>
            "Result budget exhausted; entry returned without payload",
    }
}

status_vocab! {
    /// Statuses for the `GetItemEstimate` command, per collection.
    EstimateStatus {
        Success = 1 => "Success",
        UnknownCollection = 2 => "The collection is unknown",
        SyncStateNotPrimed = 3 =>
            "The collection has not completed a first synchronisation",
        KeyMismatch = 4 => "Synchronisation key mismatch",
    }
}

status_vocab! {
    /// Per-item statuses for the `MoveItems` command.
    MoveStatus {
        InvalidSource = 1 => "The source item or folder is invalid",
        InvalidDestination = 2 => "The destination folder is invalid",
        Success = 3 => "Success",
        SameFolder = 4 =>
            "The source and destination folders are the same",
        ServerError = 5 => "An error occurred on the server",
    }
}

status_vocab! {
    /// Envelope statuses for the `ResolveRecipients` command.
    ResolveStatus {
        Success = 1 => "Success",
        ServerError = 5 => "An error occurred on the server",
        ProtocolError = 6 => "The request could not be understood",
    }
}

status_vocab! {
    /// Per-recipient statuses for the `ResolveRecipients` command.
    RecipientStatus {
        Resolved = 1 => "Recipient resolved to a single match",
        Ambiguous = 2 => "Recipient matched more than one entry",
        NotFound = 4 => "Recipient matched no entries",
    }
}

status_vocab! {
    /// Per-picture statuses for the `ResolveRecipients` and `Find`
    /// commands.
    PictureStatus {
        Success = 1 => "Photo attached",
        NoPhoto = 2 => "The contact has no photo",
        TooLarge = 3 => "The photo exceeds the remaining byte budget",
        MaxPicturesExceeded = 4 => "The photo count budget is exhausted",
    }
}

status_vocab! {
    /// Statuses for the `SendMail` and `SmartForward` commands.
    SendMailStatus {
        Success = 1 => "Success",
        MalformedRequest = 2 => "The message body is missing or unreadable",
        NotFound = 4 => "The referenced original item does not exist",
        ServerError = 6 => "An error occurred on the server",
    }
}

status_vocab! {
    /// Statuses for the `Find` command.
    FindStatus {
        Success = 1 => "Success",
        ProtocolError = 2 => "The find request could not be understood",
        ServerError = 3 => "An error occurred on the server",
        RangeError = 4 => "The requested range is invalid",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codes_round_trip_through_describe() {
        assert_eq!("Success", FolderSyncStatus::describe(1));
        assert_eq!(
            "Changes occurred in at least one monitored folder",
            PingStatus::describe(PingStatus::Changed.code()),
        );
        assert_eq!(
            "Success",
            MoveStatus::describe(MoveStatus::Success.code()),
        );
    }

    #[test]
    fn unknown_codes_get_literal_fallback() {
        assert_eq!(
            "Unrecognised status code 200",
            FolderSyncStatus::describe(200),
        );
        assert_eq!("Unrecognised status code 0", PingStatus::describe(0));
    }

    #[test]
    fn codes_are_per_command_not_global() {
        // The same number legitimately means different things per command.
        assert_eq!(1, FolderSyncStatus::Success.code());
        assert_eq!(1, MoveStatus::InvalidSource.code());
        assert_eq!(1, PingStatus::Expired.code());
    }
}
