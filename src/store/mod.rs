// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for the dataset on disk.
//!
//! The store module reads/writes the single JSON ledger document shared by every group.
//! Saves are atomic (temp file plus rename) so a reader never observes a partial write.

pub mod ledger_file;

pub use ledger_file::{LedgerFile, StoreError, WriteDurability};
