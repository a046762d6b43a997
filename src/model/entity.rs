// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::amount::Amount;
use super::ids::UserId;

/// The kind of entity stored under a group's flat namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Campaign,
    Activity,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::Activity => "activity",
        }
    }
}

/// One user's contribution toward a campaign target.
///
/// The nickname is the display name captured at pledge time; it is not re-resolved later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pledge {
    pub user_id: UserId,
    pub nickname: String,
    pub amount: Amount,
}

/// One roster entry of an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub nickname: String,
}

/// A group-buy campaign: pledges keyed by user, summed toward a target amount.
///
/// The total is maintained by the mutators below so that `total == Σ pledge.amount`
/// holds at every public observation point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    target: Amount,
    participants: BTreeMap<UserId, Pledge>,
    total: Amount,
}

impl Campaign {
    pub fn new(target: Amount) -> Self {
        Self {
            target,
            participants: BTreeMap::new(),
            total: Amount::ZERO,
        }
    }

    pub fn target(&self) -> Amount {
        self.target
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn remaining(&self) -> Amount {
        self.target.saturating_sub(self.total)
    }

    pub fn is_fulfilled(&self) -> bool {
        self.total == self.target
    }

    pub fn participants(&self) -> &BTreeMap<UserId, Pledge> {
        &self.participants
    }

    pub fn pledge(&self, user_id: &UserId) -> Option<&Pledge> {
        self.participants.get(user_id)
    }

    /// Inserts or replaces the user's pledge, keeping the running total consistent.
    /// Returns the replaced pledge, if any.
    pub fn put_pledge(&mut self, pledge: Pledge) -> Option<Pledge> {
        let previous = self.participants.remove(&pledge.user_id);
        if let Some(previous) = previous.as_ref() {
            self.total = self.total.saturating_sub(previous.amount);
        }
        self.total = self.total.saturating_add(pledge.amount);
        self.participants.insert(pledge.user_id.clone(), pledge);
        previous
    }

    /// Removes the user's pledge and subtracts its amount from the total.
    pub fn remove_pledge(&mut self, user_id: &UserId) -> Option<Pledge> {
        let removed = self.participants.remove(user_id);
        if let Some(removed) = removed.as_ref() {
            self.total = self.total.saturating_sub(removed.amount);
        }
        removed
    }

    /// Drops all pledges and resets the total; the target is kept.
    pub fn clear(&mut self) {
        self.participants.clear();
        self.total = Amount::ZERO;
    }
}

/// A named roster users can join; insertion order is preserved, user ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    participants: Vec<Participant>,
}

impl Activity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.participants
            .iter()
            .any(|participant| &participant.user_id == user_id)
    }

    /// Appends the participant unless the user is already on the roster.
    /// Returns whether the roster changed.
    pub fn join(&mut self, participant: Participant) -> bool {
        if self.contains(&participant.user_id) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }
}

/// A typed entity; the explicit tag replaces structural field-shape sniffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Campaign(Campaign),
    Activity(Activity),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Campaign(_) => EntityKind::Campaign,
            Self::Activity(_) => EntityKind::Activity,
        }
    }

    pub fn as_campaign(&self) -> Option<&Campaign> {
        match self {
            Self::Campaign(campaign) => Some(campaign),
            Self::Activity(_) => None,
        }
    }

    pub fn as_campaign_mut(&mut self) -> Option<&mut Campaign> {
        match self {
            Self::Campaign(campaign) => Some(campaign),
            Self::Activity(_) => None,
        }
    }

    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            Self::Activity(activity) => Some(activity),
            Self::Campaign(_) => None,
        }
    }

    pub fn as_activity_mut(&mut self) -> Option<&mut Activity> {
        match self {
            Self::Activity(activity) => Some(activity),
            Self::Campaign(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, Amount, Campaign, Participant, Pledge};
    use crate::model::UserId;

    fn pledge(user: &str, minor_units: u64) -> Pledge {
        Pledge {
            user_id: UserId::new(user).expect("user id"),
            nickname: user.to_owned(),
            amount: Amount::from_minor_units(minor_units),
        }
    }

    #[test]
    fn put_pledge_replaces_and_keeps_total_consistent() {
        let mut campaign = Campaign::new(Amount::from_minor_units(30_000));

        assert!(campaign.put_pledge(pledge("u1", 10_000)).is_none());
        assert_eq!(campaign.total(), Amount::from_minor_units(10_000));

        let previous = campaign.put_pledge(pledge("u1", 5_000)).expect("previous");
        assert_eq!(previous.amount, Amount::from_minor_units(10_000));
        assert_eq!(campaign.total(), Amount::from_minor_units(5_000));
        assert_eq!(campaign.participants().len(), 1);

        let sum: u64 = campaign
            .participants()
            .values()
            .map(|p| p.amount.minor_units())
            .sum();
        assert_eq!(sum, campaign.total().minor_units());
    }

    #[test]
    fn remove_pledge_subtracts_amount() {
        let mut campaign = Campaign::new(Amount::from_minor_units(30_000));
        campaign.put_pledge(pledge("u1", 10_000));
        campaign.put_pledge(pledge("u2", 20_000));
        assert!(campaign.is_fulfilled());

        let removed = campaign
            .remove_pledge(&UserId::new("u1").expect("user id"))
            .expect("removed");
        assert_eq!(removed.amount, Amount::from_minor_units(10_000));
        assert_eq!(campaign.total(), Amount::from_minor_units(20_000));
        assert_eq!(campaign.remaining(), Amount::from_minor_units(10_000));
        assert!(!campaign.is_fulfilled());
    }

    #[test]
    fn activity_join_is_idempotent_and_ordered() {
        let mut activity = Activity::new();
        let al = Participant {
            user_id: UserId::new("u1").expect("user id"),
            nickname: "Al".to_owned(),
        };
        let bo = Participant {
            user_id: UserId::new("u2").expect("user id"),
            nickname: "Bo".to_owned(),
        };

        assert!(activity.join(al.clone()));
        assert!(activity.join(bo.clone()));
        assert!(!activity.join(Participant {
            user_id: al.user_id.clone(),
            nickname: "Al again".to_owned(),
        }));

        assert_eq!(activity.participants(), [al, bo]);
    }
}
