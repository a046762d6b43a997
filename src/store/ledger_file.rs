// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{
    Activity, Amount, AmountError, Campaign, Dataset, Entity, EntityName, GroupId, IdError,
    Participant, Pledge, UserId,
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
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
    InvalidAmount {
        field: &'static str,
        value: String,
        source: Box<AmountError>,
    },
    PledgeKeyMismatch {
        key: String,
        user_id: String,
    },
    DuplicateParticipant {
        field: &'static str,
        value: String,
    },
    InconsistentTotal {
        entity: String,
        stored: String,
        computed: String,
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
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::InvalidAmount {
                field,
                value,
                source,
            } => write!(f, "invalid amount for {field}: {value:?}: {source}"),
            Self::PledgeKeyMismatch { key, user_id } => write!(
                f,
                "participant key does not match its pledge (key={key:?}, user_id={user_id:?})"
            ),
            Self::DuplicateParticipant { field, value } => {
                write!(f, "duplicate participant for {field}: {value:?}")
            }
            Self::InconsistentTotal {
                entity,
                stored,
                computed,
            } => write!(
                f,
                "stored total does not match pledges for {entity:?} (stored={stored}, computed={computed})"
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
            Self::InvalidId { source, .. } => Some(source),
            Self::InvalidAmount { source, .. } => Some(source),
            Self::PledgeKeyMismatch { .. } => None,
            Self::DuplicateParticipant { .. } => None,
            Self::InconsistentTotal { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// One on-disk JSON document holding the whole dataset.
#[derive(Debug, Clone)]
pub struct LedgerFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the dataset. A missing document is an error here; use
    /// [`LedgerFile::load_or_default`] for the first-run case.
    pub fn load(&self) -> Result<Dataset, StoreError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        let dataset_json: DatasetJson =
            serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;

        dataset_from_json(dataset_json)
    }

    /// Loads the dataset, mapping only a missing document to the empty dataset.
    /// An unparsable document still fails; corrupt data is never silently discarded.
    pub fn load_or_default(&self) -> Result<Dataset, StoreError> {
        match self.load() {
            Ok(dataset) => Ok(dataset),
            Err(StoreError::Io { path, source })
                if source.kind() == io::ErrorKind::NotFound && path == self.path =>
            {
                Ok(Dataset::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces the document atomically. On failure the previous document is intact.
    pub fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let dataset_json = dataset_to_json(dataset);
        let contents =
            serde_json::to_string_pretty(&dataset_json).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;

        write_atomic(&self.path, format!("{contents}\n").as_bytes(), self.durability)
    }
}

// Extracted JSON conversion and atomic-write helpers for `LedgerFile`.
include!("ledger_file/helpers.rs");

#[cfg(test)]
mod tests;
