// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use chipin::model::{Amount, Dataset, EntityName, GroupId, UserId};
use chipin::ops::{apply_op, Op};

// Benchmark identity (keep stable):
// - Group name in this file: `ops.apply`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `pledge_small`, `pledge_large`).
fn dataset_with_pledges(participants: usize) -> Dataset {
    let group = GroupId::new("bench-group").expect("group id");
    let name = EntityName::new("bench-campaign").expect("name");
    let mut dataset = Dataset::new();

    apply_op(
        &mut dataset,
        &Op::CreateCampaign {
            group: group.clone(),
            name: name.clone(),
            target: Amount::from_minor_units(u64::MAX),
        },
    )
    .expect("create campaign");

    for i in 0..participants {
        apply_op(
            &mut dataset,
            &Op::Pledge {
                group: group.clone(),
                name: name.clone(),
                user_id: UserId::new(format!("bench_user_{i:06}")).expect("user id"),
                nickname: format!("bench_user_{i:06}"),
                amount: Amount::from_minor_units(100),
            },
        )
        .expect("pledge");
    }

    dataset
}

fn bench_apply(c: &mut Criterion) {
    let mut bench_group = c.benchmark_group("ops.apply");

    for (case, participants) in [("pledge_small", 10usize), ("pledge_large", 1_000)] {
        let dataset = dataset_with_pledges(participants);
        let op = Op::Pledge {
            group: GroupId::new("bench-group").expect("group id"),
            name: EntityName::new("bench-campaign").expect("name"),
            user_id: UserId::new("bench_new_user").expect("user id"),
            nickname: "bench_new_user".to_owned(),
            amount: Amount::from_minor_units(250),
        };

        bench_group.throughput(Throughput::Elements(1));
        bench_group.bench_function(case, |b| {
            b.iter_batched(
                || dataset.clone(),
                |mut dataset| {
                    let result = apply_op(&mut dataset, black_box(&op)).expect("apply");
                    black_box(result)
                },
                BatchSize::SmallInput,
            )
        });
    }

    bench_group.finish();
}

criterion_group!(benches, bench_apply);
criterion_main!(benches);
