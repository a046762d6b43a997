// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A dataset maps group ids to that group's entities; an entity is either a campaign
//! (pledges toward a target amount) or an activity (a plain participation roster).

pub mod amount;
pub mod dataset;
pub mod entity;
pub mod ids;

pub use amount::{Amount, AmountError};
pub use dataset::Dataset;
pub use entity::{Activity, Campaign, Entity, EntityKind, Participant, Pledge};
pub use ids::{EntityName, GroupId, Id, IdError, UserId};
