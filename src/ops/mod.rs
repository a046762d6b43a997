// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ledger operations.
//!
//! `apply_op` is a pure, synchronous transformation of one dataset by one operation. It
//! either returns an outcome (plus whether the dataset changed, so callers can skip the
//! save for reads and no-ops) or a business error, in which case the dataset is left
//! exactly as it was.

use std::fmt;

use crate::model::{
    Activity, Amount, Campaign, Dataset, Entity, EntityKind, EntityName, GroupId, Participant,
    Pledge, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    CreateCampaign {
        group: GroupId,
        name: EntityName,
        target: Amount,
    },
    Pledge {
        group: GroupId,
        name: EntityName,
        user_id: UserId,
        nickname: String,
        amount: Amount,
    },
    ResetCampaign {
        group: GroupId,
        name: EntityName,
    },
    DeleteCampaign {
        group: GroupId,
        name: EntityName,
    },
    QueryCampaign {
        group: GroupId,
        name: EntityName,
    },
    ListCampaigns {
        group: GroupId,
    },
    CreateActivity {
        group: GroupId,
        name: EntityName,
    },
    JoinActivity {
        group: GroupId,
        name: EntityName,
        user_id: UserId,
        nickname: String,
    },
    ResetActivity {
        group: GroupId,
        name: EntityName,
    },
    DeleteActivity {
        group: GroupId,
        name: EntityName,
    },
    QueryActivity {
        group: GroupId,
        name: EntityName,
    },
    ListActivities {
        group: GroupId,
    },
}

/// One campaign row of a `ListCampaigns` outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSummary {
    pub name: EntityName,
    pub target: Amount,
    pub total: Amount,
}

/// What an operation did, carrying the data callers need to render a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    CampaignCreated {
        name: EntityName,
        target: Amount,
    },
    Pledged {
        name: EntityName,
        nickname: String,
        total: Amount,
        remaining: Amount,
    },
    /// The pledge landed the total exactly on the target. The campaign stays open:
    /// further pledges and withdrawals are still accepted.
    CampaignFulfilled {
        name: EntityName,
        target: Amount,
        participants: Vec<Pledge>,
    },
    Withdrawn {
        name: EntityName,
        nickname: String,
        total: Amount,
    },
    CampaignReset {
        name: EntityName,
    },
    CampaignDeleted {
        name: EntityName,
    },
    CampaignSnapshot {
        name: EntityName,
        target: Amount,
        total: Amount,
        remaining: Amount,
        participants: Vec<Pledge>,
    },
    CampaignList {
        campaigns: Vec<CampaignSummary>,
    },
    ActivityCreated {
        name: EntityName,
    },
    ActivityJoined {
        name: EntityName,
        nickname: String,
        newly_joined: bool,
    },
    ActivityReset {
        name: EntityName,
    },
    ActivityDeleted {
        name: EntityName,
    },
    ActivitySnapshot {
        name: EntityName,
        participants: Vec<Participant>,
    },
    ActivityList {
        names: Vec<EntityName>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub outcome: Outcome,
    /// Whether the dataset differs from its pre-call state. Reads and idempotent
    /// no-ops report `false` so the coordinator can skip persisting.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    NotFound {
        kind: EntityKind,
        group: GroupId,
        name: EntityName,
    },
    DuplicateName {
        group: GroupId,
        name: EntityName,
    },
    WrongKind {
        name: EntityName,
        expected: EntityKind,
        found: EntityKind,
    },
    OverAmount {
        name: EntityName,
        attempted: Amount,
        total: Amount,
        target: Amount,
    },
    NotAMember {
        name: EntityName,
        user_id: UserId,
    },
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, group, name } => {
                write!(f, "{} '{name}' not found in group '{group}'", kind.label())
            }
            Self::DuplicateName { group, name } => {
                write!(f, "name '{name}' already exists in group '{group}'")
            }
            Self::WrongKind {
                name,
                expected,
                found,
            } => write!(
                f,
                "entity kind mismatch for '{name}' (expected={expected:?}, found={found:?})"
            ),
            Self::OverAmount {
                name,
                attempted,
                total,
                target,
            } => write!(
                f,
                "pledge of {attempted} would push campaign '{name}' past its target \
                 (current {total}, target {target})"
            ),
            Self::NotAMember { name, user_id } => {
                write!(f, "user '{user_id}' has no pledge in campaign '{name}'")
            }
        }
    }
}

impl std::error::Error for OpError {}

pub fn apply_op(dataset: &mut Dataset, op: &Op) -> Result<ApplyResult, OpError> {
    match op {
        Op::CreateCampaign {
            group,
            name,
            target,
        } => apply_create_campaign(dataset, group, name, *target),
        Op::Pledge {
            group,
            name,
            user_id,
            nickname,
            amount,
        } => apply_pledge(dataset, group, name, user_id, nickname, *amount),
        Op::ResetCampaign { group, name } => apply_reset_campaign(dataset, group, name),
        Op::DeleteCampaign { group, name } => apply_delete_campaign(dataset, group, name),
        Op::QueryCampaign { group, name } => apply_query_campaign(dataset, group, name),
        Op::ListCampaigns { group } => apply_list_campaigns(dataset, group),
        Op::CreateActivity { group, name } => apply_create_activity(dataset, group, name),
        Op::JoinActivity {
            group,
            name,
            user_id,
            nickname,
        } => apply_join_activity(dataset, group, name, user_id, nickname),
        Op::ResetActivity { group, name } => apply_reset_activity(dataset, group, name),
        Op::DeleteActivity { group, name } => apply_delete_activity(dataset, group, name),
        Op::QueryActivity { group, name } => apply_query_activity(dataset, group, name),
        Op::ListActivities { group } => apply_list_activities(dataset, group),
    }
}

// Extracted per-operation implementation for campaign/activity mutations.
include!("ops_impl.rs");
