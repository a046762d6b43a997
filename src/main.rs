// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Chipin-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Chipin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Chipin CLI entrypoint.
//!
//! Each invocation runs exactly one ledger operation against the shared data file and
//! prints the reply text. Identity (`--user`/`--nickname`) stands in for what a chat
//! front end would resolve from the sender.

use std::error::Error;

use chipin::engine::{Engine, EngineError};
use chipin::model::{Amount, EntityName, GroupId, UserId};
use chipin::ops::{Op, OpError, Outcome};
use chipin::store::{LedgerFile, WriteDurability};

const DEFAULT_DATA_FILE: &str = "chipin-ledger.json";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--data <file>] [--durable-writes] --group <id> <command> [args]\n  {program} help\n\nCommands:\n  open-campaign <name> <target>     create a campaign with a target amount\n  pledge <name> <amount>            pledge toward a campaign (0 withdraws); needs --user\n  reset-campaign <name>             drop all pledges, keep the target\n  delete-campaign <name>            remove a campaign\n  query-campaign <name>             show target/total/remaining and pledges\n  list-campaigns                    list the group's campaigns\n  add-activity <name>               create an activity roster\n  join-activity <name>              join an activity; needs --user\n  reset-activity <name>             clear an activity's roster\n  delete-activity <name>            remove an activity\n  query-activity <name>             show an activity's roster\n  list-activities                   list the group's activities\n\n--data selects the ledger document (default {DEFAULT_DATA_FILE}).\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n--nickname sets the display name recorded with pledges/joins (defaults to the user id)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    data_file: Option<String>,
    durable_writes: bool,
    group: Option<String>,
    user: Option<String>,
    nickname: Option<String>,
    command: Vec<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => {
                if options.data_file.is_some() {
                    return Err(());
                }
                let file = args.next().ok_or(())?;
                options.data_file = Some(file);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--group" => {
                if options.group.is_some() {
                    return Err(());
                }
                let group = args.next().ok_or(())?;
                options.group = Some(group);
            }
            "--user" => {
                if options.user.is_some() {
                    return Err(());
                }
                let user = args.next().ok_or(())?;
                options.user = Some(user);
            }
            "--nickname" => {
                if options.nickname.is_some() {
                    return Err(());
                }
                let nickname = args.next().ok_or(())?;
                options.nickname = Some(nickname);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => options.command.push(arg),
        }
    }

    if options.command.is_empty() {
        return Err(());
    }

    Ok(options)
}

/// Builds the operation for a parsed command line. `Err` is a user-correctable
/// format problem (wrong argument count, malformed amount, malformed id).
fn build_op(options: &CliOptions) -> Result<Op, String> {
    let verb = options.command[0].as_str();
    let rest = &options.command[1..];

    let group = || -> Result<GroupId, String> {
        let raw = options.group.as_deref().ok_or("missing --group")?;
        GroupId::new(raw).map_err(|err| format!("invalid --group: {err}"))
    };
    let entity_name = |raw: &str| -> Result<EntityName, String> {
        EntityName::new(raw).map_err(|err| format!("invalid name '{raw}': {err}"))
    };
    let identity = || -> Result<(UserId, String), String> {
        let raw = options.user.as_deref().ok_or("missing --user")?;
        let user_id = UserId::new(raw).map_err(|err| format!("invalid --user: {err}"))?;
        let nickname = options.nickname.clone().unwrap_or_else(|| raw.to_owned());
        Ok((user_id, nickname))
    };
    let one_name = |verb: &str| -> Result<EntityName, String> {
        let [raw] = rest else {
            return Err(format!("usage: {verb} <name>"));
        };
        entity_name(raw)
    };
    let no_args = |verb: &str| -> Result<(), String> {
        if rest.is_empty() {
            Ok(())
        } else {
            Err(format!("usage: {verb}"))
        }
    };

    match verb {
        "open-campaign" => {
            let [raw_name, raw_target] = rest else {
                return Err("usage: open-campaign <name> <target>".to_owned());
            };
            let target: Amount = raw_target
                .parse()
                .map_err(|err| format!("invalid target '{raw_target}': {err}"))?;
            Ok(Op::CreateCampaign {
                group: group()?,
                name: entity_name(raw_name)?,
                target,
            })
        }
        "pledge" => {
            let [raw_name, raw_amount] = rest else {
                return Err("usage: pledge <name> <amount>".to_owned());
            };
            let amount: Amount = raw_amount
                .parse()
                .map_err(|err| format!("invalid amount '{raw_amount}': {err}"))?;
            let (user_id, nickname) = identity()?;
            Ok(Op::Pledge {
                group: group()?,
                name: entity_name(raw_name)?,
                user_id,
                nickname,
                amount,
            })
        }
        "reset-campaign" => Ok(Op::ResetCampaign {
            group: group()?,
            name: one_name("reset-campaign")?,
        }),
        "delete-campaign" => Ok(Op::DeleteCampaign {
            group: group()?,
            name: one_name("delete-campaign")?,
        }),
        "query-campaign" => Ok(Op::QueryCampaign {
            group: group()?,
            name: one_name("query-campaign")?,
        }),
        "list-campaigns" => {
            no_args("list-campaigns")?;
            Ok(Op::ListCampaigns { group: group()? })
        }
        "add-activity" => Ok(Op::CreateActivity {
            group: group()?,
            name: one_name("add-activity")?,
        }),
        "join-activity" => {
            let name = one_name("join-activity")?;
            let (user_id, nickname) = identity()?;
            Ok(Op::JoinActivity {
                group: group()?,
                name,
                user_id,
                nickname,
            })
        }
        "reset-activity" => Ok(Op::ResetActivity {
            group: group()?,
            name: one_name("reset-activity")?,
        }),
        "delete-activity" => Ok(Op::DeleteActivity {
            group: group()?,
            name: one_name("delete-activity")?,
        }),
        "query-activity" => Ok(Op::QueryActivity {
            group: group()?,
            name: one_name("query-activity")?,
        }),
        "list-activities" => {
            no_args("list-activities")?;
            Ok(Op::ListActivities { group: group()? })
        }
        _ => Err(format!("unknown command '{verb}'")),
    }
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::CampaignCreated { name, target } => {
            format!("campaign '{name}' opened with a target of {target}")
        }
        Outcome::Pledged {
            name,
            nickname,
            total,
            remaining,
        } => format!(
            "{nickname} pledged to '{name}'; current total {total}, {remaining} to go"
        ),
        Outcome::CampaignFulfilled {
            name,
            target,
            participants,
        } => {
            let mut text = format!("campaign '{name}' is fulfilled at {target}! participants:");
            for pledge in participants {
                text.push_str(&format!("\n  {}: {}", pledge.nickname, pledge.amount));
            }
            text
        }
        Outcome::Withdrawn {
            name,
            nickname,
            total,
        } => format!("{nickname} withdrew from '{name}'; current total {total}"),
        Outcome::CampaignReset { name } => format!("campaign '{name}' has been reset"),
        Outcome::CampaignDeleted { name } => format!("campaign '{name}' has been deleted"),
        Outcome::CampaignSnapshot {
            name,
            target,
            total,
            remaining,
            participants,
        } => {
            let mut text = format!(
                "campaign '{name}':\n  target:    {target}\n  total:     {total}\n  remaining: {remaining}\nparticipants:"
            );
            if participants.is_empty() {
                text.push_str("\n  (none yet)");
            }
            for pledge in participants {
                text.push_str(&format!(
                    "\n  {} ({}): {}",
                    pledge.nickname, pledge.user_id, pledge.amount
                ));
            }
            text
        }
        Outcome::CampaignList { campaigns } => {
            if campaigns.is_empty() {
                return "no campaigns in this group yet".to_owned();
            }
            let mut text = "campaigns:".to_owned();
            for campaign in campaigns {
                text.push_str(&format!(
                    "\n  {} (target {}, total {})",
                    campaign.name, campaign.target, campaign.total
                ));
            }
            text
        }
        Outcome::ActivityCreated { name } => format!("activity '{name}' added"),
        Outcome::ActivityJoined {
            name,
            nickname,
            newly_joined,
        } => {
            if *newly_joined {
                format!("{nickname} joined activity '{name}'")
            } else {
                format!("{nickname} is already in activity '{name}'")
            }
        }
        Outcome::ActivityReset { name } => format!("activity '{name}' has been reset"),
        Outcome::ActivityDeleted { name } => format!("activity '{name}' has been deleted"),
        Outcome::ActivitySnapshot { name, participants } => {
            let mut text = format!("activity '{name}' participants:");
            if participants.is_empty() {
                text.push_str("\n  (none yet)");
            }
            for participant in participants {
                text.push_str(&format!(
                    "\n  {} ({})",
                    participant.nickname, participant.user_id
                ));
            }
            text
        }
        Outcome::ActivityList { names } => {
            if names.is_empty() {
                return "no activities in this group yet".to_owned();
            }
            let mut text = "activities:".to_owned();
            for name in names {
                text.push_str(&format!("\n  {name}"));
            }
            text
        }
    }
}

fn render_op_error(err: &OpError) -> String {
    match err {
        OpError::NotFound { kind, name, .. } => format!("{} '{name}' was not found", kind.label()),
        OpError::DuplicateName { name, .. } => format!("the name '{name}' is already taken"),
        OpError::WrongKind {
            name,
            expected,
            found,
        } => format!(
            "'{name}' is {} here, not {}",
            found.label(),
            expected.label()
        ),
        OpError::OverAmount { name, .. } => format!(
            "that pledge would exceed the target of campaign '{name}'; nothing was recorded"
        ),
        OpError::NotAMember { name, .. } => format!("you have no pledge in campaign '{name}'"),
    }
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "chipin".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    if options.command[0] == "help" {
        print_usage(&program);
        return;
    }

    let op = match build_op(&options) {
        Ok(op) => op,
        Err(message) => {
            eprintln!("{program}: {message}");
            std::process::exit(2);
        }
    };

    let result = (|| -> Result<(), Box<dyn Error>> {
        let data_file = options
            .data_file
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_owned());
        let ledger_file = if options.durable_writes {
            LedgerFile::new(data_file).with_durability(WriteDurability::Durable)
        } else {
            LedgerFile::new(data_file)
        };
        let engine = Engine::open(ledger_file)?;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        match runtime.block_on(engine.execute(&op)) {
            Ok(outcome) => println!("{}", render_outcome(&outcome)),
            // Business errors are the reply, not a failure.
            Err(EngineError::Op(err)) => println!("{}", render_op_error(&err)),
            Err(err @ EngineError::Store(_)) => return Err(Box::new(err)),
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("{program}: {err}");
        std::process::exit(1);
    }
}
