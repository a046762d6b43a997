// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Campaign/activity operation implementation helpers used by `apply_op`.
/// Keeps `ops::mod` focused on the public op/outcome/error types and dispatch.
fn campaign_ref<'a>(
    dataset: &'a Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<&'a Campaign, OpError> {
    match dataset.entity(group, name) {
        Some(Entity::Campaign(campaign)) => Ok(campaign),
        Some(other) => Err(OpError::WrongKind {
            name: name.clone(),
            expected: EntityKind::Campaign,
            found: other.kind(),
        }),
        None => Err(OpError::NotFound {
            kind: EntityKind::Campaign,
            group: group.clone(),
            name: name.clone(),
        }),
    }
}

fn campaign_mut<'a>(
    dataset: &'a mut Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<&'a mut Campaign, OpError> {
    match dataset.entity_mut(group, name) {
        Some(Entity::Campaign(campaign)) => Ok(campaign),
        Some(other) => Err(OpError::WrongKind {
            name: name.clone(),
            expected: EntityKind::Campaign,
            found: other.kind(),
        }),
        None => Err(OpError::NotFound {
            kind: EntityKind::Campaign,
            group: group.clone(),
            name: name.clone(),
        }),
    }
}

fn activity_ref<'a>(
    dataset: &'a Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<&'a Activity, OpError> {
    match dataset.entity(group, name) {
        Some(Entity::Activity(activity)) => Ok(activity),
        Some(other) => Err(OpError::WrongKind {
            name: name.clone(),
            expected: EntityKind::Activity,
            found: other.kind(),
        }),
        None => Err(OpError::NotFound {
            kind: EntityKind::Activity,
            group: group.clone(),
            name: name.clone(),
        }),
    }
}

fn activity_mut<'a>(
    dataset: &'a mut Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<&'a mut Activity, OpError> {
    match dataset.entity_mut(group, name) {
        Some(Entity::Activity(activity)) => Ok(activity),
        Some(other) => Err(OpError::WrongKind {
            name: name.clone(),
            expected: EntityKind::Activity,
            found: other.kind(),
        }),
        None => Err(OpError::NotFound {
            kind: EntityKind::Activity,
            group: group.clone(),
            name: name.clone(),
        }),
    }
}

fn apply_create_campaign(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
    target: Amount,
) -> Result<ApplyResult, OpError> {
    if dataset.entity(group, name).is_some() {
        return Err(OpError::DuplicateName {
            group: group.clone(),
            name: name.clone(),
        });
    }

    dataset.insert_entity(
        group.clone(),
        name.clone(),
        Entity::Campaign(Campaign::new(target)),
    );

    Ok(ApplyResult {
        outcome: Outcome::CampaignCreated {
            name: name.clone(),
            target,
        },
        changed: true,
    })
}

fn apply_pledge(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
    user_id: &UserId,
    nickname: &str,
    amount: Amount,
) -> Result<ApplyResult, OpError> {
    let campaign = campaign_mut(dataset, group, name)?;

    if amount.is_zero() {
        if campaign.remove_pledge(user_id).is_none() {
            return Err(OpError::NotAMember {
                name: name.clone(),
                user_id: user_id.clone(),
            });
        }
        return Ok(ApplyResult {
            outcome: Outcome::Withdrawn {
                name: name.clone(),
                nickname: nickname.to_owned(),
                total: campaign.total(),
            },
            changed: true,
        });
    }

    // Replace semantics: an existing pledge is superseded, not added to. The
    // prospective total is checked before any mutation so a rejected pledge
    // leaves the campaign untouched.
    let existing = campaign
        .pledge(user_id)
        .map(|pledge| pledge.amount)
        .unwrap_or(Amount::ZERO);
    let overshoots = match campaign.total().saturating_sub(existing).checked_add(amount) {
        Some(prospective) => prospective > campaign.target(),
        // An overflowing sum is past any representable target.
        None => true,
    };

    if overshoots {
        return Err(OpError::OverAmount {
            name: name.clone(),
            attempted: amount,
            total: campaign.total(),
            target: campaign.target(),
        });
    }

    campaign.put_pledge(Pledge {
        user_id: user_id.clone(),
        nickname: nickname.to_owned(),
        amount,
    });

    let outcome = if campaign.is_fulfilled() {
        Outcome::CampaignFulfilled {
            name: name.clone(),
            target: campaign.target(),
            participants: campaign.participants().values().cloned().collect(),
        }
    } else {
        Outcome::Pledged {
            name: name.clone(),
            nickname: nickname.to_owned(),
            total: campaign.total(),
            remaining: campaign.remaining(),
        }
    };

    Ok(ApplyResult {
        outcome,
        changed: true,
    })
}

fn apply_reset_campaign(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<ApplyResult, OpError> {
    let campaign = campaign_mut(dataset, group, name)?;
    let changed = !campaign.participants().is_empty();
    campaign.clear();

    Ok(ApplyResult {
        outcome: Outcome::CampaignReset { name: name.clone() },
        changed,
    })
}

fn apply_delete_campaign(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<ApplyResult, OpError> {
    campaign_ref(dataset, group, name)?;
    dataset.remove_entity(group, name);

    Ok(ApplyResult {
        outcome: Outcome::CampaignDeleted { name: name.clone() },
        changed: true,
    })
}

fn apply_query_campaign(
    dataset: &Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<ApplyResult, OpError> {
    let campaign = campaign_ref(dataset, group, name)?;

    Ok(ApplyResult {
        outcome: Outcome::CampaignSnapshot {
            name: name.clone(),
            target: campaign.target(),
            total: campaign.total(),
            remaining: campaign.remaining(),
            participants: campaign.participants().values().cloned().collect(),
        },
        changed: false,
    })
}

fn apply_list_campaigns(dataset: &Dataset, group: &GroupId) -> Result<ApplyResult, OpError> {
    let campaigns = dataset
        .group(group)
        .into_iter()
        .flatten()
        .filter_map(|(name, entity)| {
            entity.as_campaign().map(|campaign| CampaignSummary {
                name: name.clone(),
                target: campaign.target(),
                total: campaign.total(),
            })
        })
        .collect();

    Ok(ApplyResult {
        outcome: Outcome::CampaignList { campaigns },
        changed: false,
    })
}

fn apply_create_activity(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<ApplyResult, OpError> {
    if dataset.entity(group, name).is_some() {
        return Err(OpError::DuplicateName {
            group: group.clone(),
            name: name.clone(),
        });
    }

    dataset.insert_entity(group.clone(), name.clone(), Entity::Activity(Activity::new()));

    Ok(ApplyResult {
        outcome: Outcome::ActivityCreated { name: name.clone() },
        changed: true,
    })
}

fn apply_join_activity(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
    user_id: &UserId,
    nickname: &str,
) -> Result<ApplyResult, OpError> {
    let activity = activity_mut(dataset, group, name)?;
    let newly_joined = activity.join(Participant {
        user_id: user_id.clone(),
        nickname: nickname.to_owned(),
    });

    Ok(ApplyResult {
        outcome: Outcome::ActivityJoined {
            name: name.clone(),
            nickname: nickname.to_owned(),
            newly_joined,
        },
        changed: newly_joined,
    })
}

fn apply_reset_activity(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<ApplyResult, OpError> {
    let activity = activity_mut(dataset, group, name)?;
    let changed = !activity.participants().is_empty();
    activity.clear();

    Ok(ApplyResult {
        outcome: Outcome::ActivityReset { name: name.clone() },
        changed,
    })
}

fn apply_delete_activity(
    dataset: &mut Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<ApplyResult, OpError> {
    activity_ref(dataset, group, name)?;
    dataset.remove_entity(group, name);

    Ok(ApplyResult {
        outcome: Outcome::ActivityDeleted { name: name.clone() },
        changed: true,
    })
}

fn apply_query_activity(
    dataset: &Dataset,
    group: &GroupId,
    name: &EntityName,
) -> Result<ApplyResult, OpError> {
    let activity = activity_ref(dataset, group, name)?;

    Ok(ApplyResult {
        outcome: Outcome::ActivitySnapshot {
            name: name.clone(),
            participants: activity.participants().to_vec(),
        },
        changed: false,
    })
}

fn apply_list_activities(dataset: &Dataset, group: &GroupId) -> Result<ApplyResult, OpError> {
    let names = dataset
        .group(group)
        .into_iter()
        .flatten()
        .filter(|(_, entity)| entity.as_activity().is_some())
        .map(|(name, _)| name.clone())
        .collect();

    Ok(ApplyResult {
        outcome: Outcome::ActivityList { names },
        changed: false,
    })
}
