// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serialized execution of ledger operations.
//!
//! The engine owns the only mutable dataset reference. Each `execute` call runs one
//! load/apply/save cycle under a global mutex, so concurrent commands — for the same
//! group or different ones — observe a total order and never interleave their
//! read-modify-write cycles. A failed apply or save persists nothing.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::model::Dataset;
use crate::ops::{apply_op, Op, OpError, Outcome};
use crate::store::{LedgerFile, StoreError};

#[derive(Debug)]
pub enum EngineError {
    /// A business error; the dataset is unchanged and nothing was persisted.
    Op(OpError),
    /// A load or save failure; the in-memory dataset keeps its pre-operation value.
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op(source) => write!(f, "{source}"),
            Self::Store(source) => write!(f, "store failure: {source}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Op(source) => Some(source),
            Self::Store(source) => Some(source),
        }
    }
}

#[derive(Debug)]
struct EngineState {
    dataset: Dataset,
}

/// The session coordinator for one ledger document.
#[derive(Debug, Clone)]
pub struct Engine {
    state: Arc<Mutex<EngineState>>,
    ledger_file: Option<Arc<LedgerFile>>,
}

impl Engine {
    /// An in-memory engine without persistence; used by tests and embedders that
    /// handle persistence themselves.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState { dataset })),
            ledger_file: None,
        }
    }

    pub fn new_persistent(dataset: Dataset, ledger_file: LedgerFile) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState { dataset })),
            ledger_file: Some(Arc::new(ledger_file)),
        }
    }

    /// Opens the ledger document, treating a missing file as the empty dataset.
    pub fn open(ledger_file: LedgerFile) -> Result<Self, StoreError> {
        let dataset = ledger_file.load_or_default()?;
        Ok(Self::new_persistent(dataset, ledger_file))
    }

    /// Runs one operation as an atomic load/apply/save cycle.
    ///
    /// Mutating operations persist the new dataset before it becomes observable;
    /// read-only operations and idempotent no-ops skip the save. Store errors leave
    /// the in-memory dataset at its pre-operation value.
    pub async fn execute(&self, op: &Op) -> Result<Outcome, EngineError> {
        let mut state = self.state.lock().await;

        if let Some(ledger_file) = &self.ledger_file {
            // Pick up external writers before applying; the dataset on disk is
            // authoritative between operations.
            let disk = ledger_file.load_or_default().map_err(EngineError::Store)?;
            if disk != state.dataset {
                state.dataset = disk;
            }
        }

        let mut candidate = state.dataset.clone();
        let result = apply_op(&mut candidate, op).map_err(EngineError::Op)?;

        if result.changed {
            if let Some(ledger_file) = &self.ledger_file {
                ledger_file.save(&candidate).map_err(EngineError::Store)?;
            }
            state.dataset = candidate;
        }

        Ok(result.outcome)
    }

    /// A point-in-time copy of the current dataset, serialized with operations.
    pub async fn snapshot(&self) -> Dataset {
        self.state.lock().await.dataset.clone()
    }
}
