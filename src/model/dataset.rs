// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::entity::Entity;
use super::ids::{EntityName, GroupId};

/// The root document: every group's campaigns and activities.
///
/// Campaigns and activities share one flat name namespace per group. Group entries are
/// created lazily on first insert and removed with their last entity, so an empty group
/// map is never observable (and never persisted).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    groups: BTreeMap<GroupId, BTreeMap<EntityName, Entity>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &BTreeMap<GroupId, BTreeMap<EntityName, Entity>> {
        &self.groups
    }

    pub fn group(&self, group_id: &GroupId) -> Option<&BTreeMap<EntityName, Entity>> {
        self.groups.get(group_id)
    }

    pub fn entity(&self, group_id: &GroupId, name: &EntityName) -> Option<&Entity> {
        self.groups.get(group_id).and_then(|group| group.get(name))
    }

    pub fn entity_mut(&mut self, group_id: &GroupId, name: &EntityName) -> Option<&mut Entity> {
        self.groups
            .get_mut(group_id)
            .and_then(|group| group.get_mut(name))
    }

    /// Inserts an entity, creating the group entry on demand.
    /// Returns the entity previously stored under the name, if any.
    pub fn insert_entity(
        &mut self,
        group_id: GroupId,
        name: EntityName,
        entity: Entity,
    ) -> Option<Entity> {
        self.groups.entry(group_id).or_default().insert(name, entity)
    }

    /// Removes an entity; the group entry is dropped when its last entity goes.
    pub fn remove_entity(&mut self, group_id: &GroupId, name: &EntityName) -> Option<Entity> {
        let group = self.groups.get_mut(group_id)?;
        let removed = group.remove(name);
        if removed.is_some() && group.is_empty() {
            self.groups.remove(group_id);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
