// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for deck sessions on disk.
//!
//! The store module reads/writes the deck folder format (meta file plus snapshot,
//! verification, chat, and version files) and defines the narrow collaborator
//! traits the session layer is wired against: a session store and an optional
//! current-user identity.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model::{DeckSession, IdError};
use crate::verify::ContentHashError;

pub mod deck_folder;
pub mod snapshot;
pub mod version;

pub use deck_folder::{DeckFolder, WriteDurability};
pub use snapshot::{deck_from_snapshot, snapshot_deck, DeckSnapshot, SlideSnapshot, SnapshotError};
pub use version::{
    CreateOutcome, Version, VersionMeta, VersionNotFound, VersionStore, VERSION_LIMIT,
};

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Snapshot {
        path: PathBuf,
        source: SnapshotError,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
    InvalidHash {
        value: String,
        source: Box<ContentHashError>,
    },
    InvalidRelativePath {
        field: &'static str,
        value: PathBuf,
    },
    PathOutsideSession {
        session_dir: PathBuf,
        path: PathBuf,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Snapshot { path, source } => {
                write!(f, "invalid deck snapshot at {path:?}: {source}")
            }
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::InvalidHash { value, source } => {
                write!(f, "invalid content hash {value:?}: {source}")
            }
            Self::InvalidRelativePath { field, value } => {
                write!(f, "invalid relative path for {field}: {value:?}")
            }
            Self::PathOutsideSession { session_dir, path } => write!(
                f,
                "path is outside session dir: session_dir={session_dir:?} path={path:?}"
            ),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Snapshot { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::InvalidHash { source, .. } => Some(source),
            Self::InvalidRelativePath { .. } => None,
            Self::PathOutsideSession { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

/// The injected persistence boundary. Sessions are loaded and saved whole; a
/// missing session is `Ok(None)`, not an error.
pub trait SessionStore {
    fn load_session(&self) -> Result<Option<DeckSession>, StoreError>;
    fn save_session(&self, session: &DeckSession) -> Result<(), StoreError>;
    fn delete_session(&self) -> Result<(), StoreError>;
}

/// Who is acting on the session, when anyone is known at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// The label recorded on versions this user creates.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Optional identity lookup. Absence is a first-class value, never an error to
/// be caught and swallowed.
pub trait CurrentUserProvider {
    fn current_user(&self) -> Option<UserIdentity>;
}

/// The default provider for unauthenticated contexts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymousUser;

impl CurrentUserProvider for AnonymousUser {
    fn current_user(&self) -> Option<UserIdentity> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{AnonymousUser, CurrentUserProvider, UserIdentity};

    #[test]
    fn anonymous_user_is_a_first_class_absence() {
        assert_eq!(AnonymousUser.current_user(), None);
    }

    #[test]
    fn identity_label_prefers_the_display_name() {
        let identity = UserIdentity {
            user_id: "u-42".to_owned(),
            display_name: Some("Ada".to_owned()),
        };
        assert_eq!(identity.label(), "Ada");

        let identity = UserIdentity {
            user_id: "u-42".to_owned(),
            display_name: None,
        };
        assert_eq!(identity.label(), "u-42");
    }
}
