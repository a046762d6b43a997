// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{LedgerFile, StoreError, WriteDurability};
use crate::model::{
    Activity, Amount, Campaign, Dataset, Entity, EntityName, GroupId, Participant, Pledge, UserId,
};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("chipin-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct LedgerFileTestCtx {
    tmp: TempDir,
    ledger_path: std::path::PathBuf,
    ledger: LedgerFile,
}

impl LedgerFileTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let ledger_path = tmp.path().join("ledger.json");
        let ledger = LedgerFile::new(&ledger_path);
        Self { tmp, ledger_path, ledger }
    }
}

#[fixture]
fn ctx() -> LedgerFileTestCtx {
    LedgerFileTestCtx::new("ledger-file")
}

fn pledge(user: &str, nickname: &str, amount: &str) -> Pledge {
    Pledge {
        user_id: UserId::new(user).unwrap(),
        nickname: nickname.to_owned(),
        amount: amount.parse().unwrap(),
    }
}

fn sample_dataset() -> Dataset {
    let mut dataset = Dataset::new();

    let mut campaign = Campaign::new("300".parse::<Amount>().unwrap());
    campaign.put_pledge(pledge("u1", "Al", "100"));
    campaign.put_pledge(pledge("u2", "Bo", "50.5"));
    dataset.insert_entity(
        GroupId::new("g1").unwrap(),
        EntityName::new("trip").unwrap(),
        Entity::Campaign(campaign),
    );

    let mut activity = Activity::new();
    activity.join(Participant {
        user_id: UserId::new("u1").unwrap(),
        nickname: "Al".to_owned(),
    });
    dataset.insert_entity(
        GroupId::new("g1").unwrap(),
        EntityName::new("party").unwrap(),
        Entity::Activity(activity),
    );

    dataset.insert_entity(
        GroupId::new("g2").unwrap(),
        EntityName::new("dinner").unwrap(),
        Entity::Campaign(Campaign::new("80".parse::<Amount>().unwrap())),
    );

    dataset
}

#[rstest]
fn save_and_load_round_trip(ctx: LedgerFileTestCtx) {
    let dataset = sample_dataset();

    ctx.ledger.save(&dataset).unwrap();
    let loaded = ctx.ledger.load().unwrap();

    assert_eq!(loaded, dataset);
}

#[rstest]
fn save_writes_kind_tags_and_decimal_strings(ctx: LedgerFileTestCtx) {
    ctx.ledger.save(&sample_dataset()).unwrap();

    let contents = std::fs::read_to_string(&ctx.ledger_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();

    assert_eq!(value["g1"]["trip"]["kind"], "campaign");
    assert_eq!(value["g1"]["trip"]["target_amount"], "300");
    assert_eq!(value["g1"]["trip"]["total_amount"], "150.5");
    assert_eq!(value["g1"]["trip"]["participants"]["u2"]["amount"], "50.5");
    assert_eq!(value["g1"]["trip"]["participants"]["u2"]["nickname"], "Bo");
    assert_eq!(value["g1"]["party"]["kind"], "activity");
    assert_eq!(value["g1"]["party"]["participants"][0]["user_id"], "u1");
}

#[rstest]
fn save_leaves_no_temp_files_behind(ctx: LedgerFileTestCtx) {
    ctx.ledger.save(&sample_dataset()).unwrap();
    ctx.ledger.save(&Dataset::new()).unwrap();

    let leftovers = std::fs::read_dir(ctx.tmp.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_name().to_string_lossy().starts_with(".chipin.tmp.")
        })
        .count();
    assert_eq!(leftovers, 0);
}

#[rstest]
fn load_or_default_returns_empty_dataset_for_missing_file(ctx: LedgerFileTestCtx) {
    let dataset = ctx.ledger.load_or_default().unwrap();
    assert!(dataset.is_empty());

    // A plain load still reports the missing file.
    let err = ctx.ledger.load().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
    ));
}

#[rstest]
fn load_rejects_unparsable_document(ctx: LedgerFileTestCtx) {
    std::fs::write(&ctx.ledger_path, "{ not json").unwrap();

    let err = ctx.ledger.load().unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));

    // load_or_default must not paper over corruption.
    let err = ctx.ledger.load_or_default().unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));
}

#[rstest]
fn load_rejects_total_that_does_not_match_pledges(ctx: LedgerFileTestCtx) {
    std::fs::write(
        &ctx.ledger_path,
        r#"{
            "g1": {
                "trip": {
                    "kind": "campaign",
                    "target_amount": "300",
                    "total_amount": "999",
                    "participants": {
                        "u1": { "user_id": "u1", "nickname": "Al", "amount": "100" }
                    }
                }
            }
        }"#,
    )
    .unwrap();

    let err = ctx.ledger.load().unwrap_err();
    assert!(matches!(err, StoreError::InconsistentTotal { .. }));
}

#[rstest]
fn load_rejects_malformed_amounts(ctx: LedgerFileTestCtx) {
    std::fs::write(
        &ctx.ledger_path,
        r#"{
            "g1": {
                "trip": {
                    "kind": "campaign",
                    "target_amount": "lots",
                    "total_amount": "0",
                    "participants": {}
                }
            }
        }"#,
    )
    .unwrap();

    let err = ctx.ledger.load().unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidAmount { field: "target_amount", .. }
    ));
}

#[rstest]
fn load_rejects_pledge_stored_under_the_wrong_key(ctx: LedgerFileTestCtx) {
    std::fs::write(
        &ctx.ledger_path,
        r#"{
            "g1": {
                "trip": {
                    "kind": "campaign",
                    "target_amount": "300",
                    "total_amount": "100",
                    "participants": {
                        "u9": { "user_id": "u1", "nickname": "Al", "amount": "100" }
                    }
                }
            }
        }"#,
    )
    .unwrap();

    let err = ctx.ledger.load().unwrap_err();
    assert!(matches!(err, StoreError::PledgeKeyMismatch { .. }));
}

#[rstest]
fn load_rejects_duplicate_activity_participants(ctx: LedgerFileTestCtx) {
    std::fs::write(
        &ctx.ledger_path,
        r#"{
            "g1": {
                "party": {
                    "kind": "activity",
                    "participants": [
                        { "user_id": "u1", "nickname": "Al" },
                        { "user_id": "u1", "nickname": "Al again" }
                    ]
                }
            }
        }"#,
    )
    .unwrap();

    let err = ctx.ledger.load().unwrap_err();
    assert!(matches!(err, StoreError::DuplicateParticipant { .. }));
}

#[rstest]
fn failed_save_keeps_the_previous_document(ctx: LedgerFileTestCtx) {
    let dataset = sample_dataset();
    ctx.ledger.save(&dataset).unwrap();
    let before = std::fs::read_to_string(&ctx.ledger_path).unwrap();

    // Writing through a symlinked ledger path is refused outright.
    #[cfg(unix)]
    {
        let link_path = ctx.tmp.path().join("link.json");
        std::os::unix::fs::symlink(&ctx.ledger_path, &link_path).unwrap();
        let linked = LedgerFile::new(&link_path);
        let err = linked.save(&Dataset::new()).unwrap_err();
        assert!(matches!(err, StoreError::SymlinkRefused { .. }));
    }

    let after = std::fs::read_to_string(&ctx.ledger_path).unwrap();
    assert_eq!(after, before);
    assert_eq!(ctx.ledger.load().unwrap(), dataset);
}

#[rstest]
fn durable_save_round_trips(ctx: LedgerFileTestCtx) {
    let ledger = LedgerFile::new(&ctx.ledger_path).with_durability(WriteDurability::Durable);
    assert_eq!(ledger.durability(), WriteDurability::Durable);

    let dataset = sample_dataset();
    ledger.save(&dataset).unwrap();
    assert_eq!(ledger.load().unwrap(), dataset);
}

#[rstest]
fn save_creates_missing_parent_directories(ctx: LedgerFileTestCtx) {
    let nested = ctx.tmp.path().join("nested/dir/ledger.json");
    let ledger = LedgerFile::new(&nested);

    ledger.save(&sample_dataset()).unwrap();
    assert_eq!(ledger.load().unwrap(), sample_dataset());
}
