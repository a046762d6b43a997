// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// JSON document layer:
/// the persisted shape is decoupled from the model types, converted by fallible
/// helpers that validate every id and amount on the way in. Amounts are stored as
/// canonical decimal strings so fixed-point values round-trip exactly.
type DatasetJson = BTreeMap<String, BTreeMap<String, EntityJson>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum EntityJson {
    Campaign {
        target_amount: String,
        total_amount: String,
        #[serde(default)]
        participants: BTreeMap<String, PledgeJson>,
    },
    Activity {
        #[serde(default)]
        participants: Vec<ParticipantJson>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PledgeJson {
    user_id: String,
    nickname: String,
    amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ParticipantJson {
    user_id: String,
    nickname: String,
}

fn dataset_to_json(dataset: &Dataset) -> DatasetJson {
    dataset
        .groups()
        .iter()
        .map(|(group_id, entities)| {
            let entities = entities
                .iter()
                .map(|(name, entity)| (name.to_string(), entity_to_json(entity)))
                .collect();
            (group_id.to_string(), entities)
        })
        .collect()
}

fn entity_to_json(entity: &Entity) -> EntityJson {
    match entity {
        Entity::Campaign(campaign) => EntityJson::Campaign {
            target_amount: campaign.target().to_string(),
            total_amount: campaign.total().to_string(),
            participants: campaign
                .participants()
                .iter()
                .map(|(user_id, pledge)| {
                    (
                        user_id.to_string(),
                        PledgeJson {
                            user_id: pledge.user_id.to_string(),
                            nickname: pledge.nickname.clone(),
                            amount: pledge.amount.to_string(),
                        },
                    )
                })
                .collect(),
        },
        Entity::Activity(activity) => EntityJson::Activity {
            participants: activity
                .participants()
                .iter()
                .map(|participant| ParticipantJson {
                    user_id: participant.user_id.to_string(),
                    nickname: participant.nickname.clone(),
                })
                .collect(),
        },
    }
}

fn dataset_from_json(dataset_json: DatasetJson) -> Result<Dataset, StoreError> {
    let mut dataset = Dataset::new();

    for (group_value, entities_json) in dataset_json {
        let group_id =
            GroupId::new(group_value.clone()).map_err(|source| StoreError::InvalidId {
                field: "group id",
                value: group_value,
                source: Box::new(source),
            })?;

        for (name_value, entity_json) in entities_json {
            let name =
                EntityName::new(name_value.clone()).map_err(|source| StoreError::InvalidId {
                    field: "entity name",
                    value: name_value.clone(),
                    source: Box::new(source),
                })?;

            let entity = entity_from_json(&name_value, entity_json)?;
            dataset.insert_entity(group_id.clone(), name, entity);
        }
    }

    Ok(dataset)
}

fn entity_from_json(name: &str, entity_json: EntityJson) -> Result<Entity, StoreError> {
    match entity_json {
        EntityJson::Campaign {
            target_amount,
            total_amount,
            participants,
        } => {
            let target = parse_amount("target_amount", &target_amount)?;
            let stored_total = parse_amount("total_amount", &total_amount)?;

            let mut campaign = Campaign::new(target);
            for (key, pledge_json) in participants {
                if key != pledge_json.user_id {
                    return Err(StoreError::PledgeKeyMismatch {
                        key,
                        user_id: pledge_json.user_id,
                    });
                }
                let user_id = UserId::new(pledge_json.user_id.clone()).map_err(|source| {
                    StoreError::InvalidId {
                        field: "participants{}.user_id",
                        value: pledge_json.user_id.clone(),
                        source: Box::new(source),
                    }
                })?;
                let amount = parse_amount("participants{}.amount", &pledge_json.amount)?;
                campaign.put_pledge(Pledge {
                    user_id,
                    nickname: pledge_json.nickname,
                    amount,
                });
            }

            if campaign.total() != stored_total {
                return Err(StoreError::InconsistentTotal {
                    entity: name.to_owned(),
                    stored: stored_total.to_string(),
                    computed: campaign.total().to_string(),
                });
            }

            Ok(Entity::Campaign(campaign))
        }
        EntityJson::Activity { participants } => {
            let mut activity = Activity::new();
            for participant_json in participants {
                let user_id = UserId::new(participant_json.user_id.clone()).map_err(|source| {
                    StoreError::InvalidId {
                        field: "participants[].user_id",
                        value: participant_json.user_id.clone(),
                        source: Box::new(source),
                    }
                })?;
                if !activity.join(Participant {
                    user_id,
                    nickname: participant_json.nickname,
                }) {
                    return Err(StoreError::DuplicateParticipant {
                        field: "participants[].user_id",
                        value: participant_json.user_id,
                    });
                }
            }
            Ok(Entity::Activity(activity))
        }
    }
}

fn parse_amount(field: &'static str, value: &str) -> Result<Amount, StoreError> {
    value.parse().map_err(|source| StoreError::InvalidAmount {
        field,
        value: value.to_owned(),
        source: Box::new(source),
    })
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    // A bare relative file name has an empty parent; treat it as the current dir.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|source| StoreError::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".chipin.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
