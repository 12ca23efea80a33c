// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{arg, value_parser, ArgAction, Command};

fn with_output_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print as pretty JSON").action(ArgAction::SetTrue))
        .arg(arg!(--jsonl "Print as JSON lines").action(ArgAction::SetTrue))
}

fn id_arg(cmd: Command) -> Command {
    cmd.arg(
        arg!(--id <ID> "Record id")
            .required(true)
            .value_parser(value_parser!(i64)),
    )
}

fn no_category_arg() -> clap::Arg {
    arg!(--"no-category" "Remove the category")
        .action(ArgAction::SetTrue)
        .conflicts_with("category-id")
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage income/expense categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a category")
                .arg(arg!(--name <NAME>).required(true))
                .arg(arg!(--kind <KIND> "income|expense").required(true))
                .arg(arg!(--description <TEXT>))
                .arg(arg!(--color <HEX>))
                .arg(arg!(--icon <ICON>)),
        )
        .subcommand(with_output_flags(
            Command::new("list")
                .about("List categories")
                .arg(arg!(--kind <KIND> "income|expense"))
                .arg(arg!(--all "Include deleted categories").action(ArgAction::SetTrue)),
        ))
        .subcommand(id_arg(
            Command::new("update")
                .about("Change fields of a category")
                .arg(arg!(--name <NAME>))
                .arg(arg!(--description <TEXT>))
                .arg(arg!(--color <HEX>))
                .arg(arg!(--icon <ICON>))
                .arg(arg!(--active <BOOL>).value_parser(value_parser!(bool))),
        ))
        .subcommand(id_arg(Command::new("rm").about("Deactivate a category")))
        .subcommand(Command::new("seed").about("Create the default categories"))
        .subcommand(with_output_flags(
            Command::new("stats").about("Transaction count and total per category"),
        ))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and list transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--amount <AMOUNT> "Positive amount").required(true))
                .arg(arg!(--kind <KIND> "income|expense").required(true))
                .arg(arg!(--description <TEXT>).required(true))
                .arg(arg!(--"category-id" <ID>).value_parser(value_parser!(i64)))
                .arg(arg!(--notes <TEXT>)),
        )
        .subcommand(with_output_flags(
            Command::new("list")
                .about("List transactions, most recent first")
                .arg(arg!(--from <DATE> "Inclusive start date"))
                .arg(arg!(--to <DATE> "Inclusive end date"))
                .arg(arg!(--kind <KIND> "income|expense"))
                .arg(arg!(--"category-id" <ID>).value_parser(value_parser!(i64)))
                .arg(arg!(--skip <N>).value_parser(value_parser!(usize)))
                .arg(arg!(--limit <N>).value_parser(value_parser!(usize))),
        ))
        .subcommand(id_arg(
            Command::new("update")
                .about("Change fields of a transaction")
                .arg(arg!(--date <DATE>))
                .arg(arg!(--amount <AMOUNT>))
                .arg(arg!(--kind <KIND>))
                .arg(arg!(--description <TEXT>))
                .arg(arg!(--"category-id" <ID>).value_parser(value_parser!(i64)))
                .arg(no_category_arg())
                .arg(arg!(--notes <TEXT>)),
        ))
        .subcommand(id_arg(Command::new("rm").about("Delete a transaction")))
}

fn investment_cmd() -> Command {
    Command::new("investment")
        .about("Track investments")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add an investment")
                .arg(arg!(--name <NAME>).required(true))
                .arg(arg!(--"type" <TYPE> "stocks, crypto, funds, ...").required(true))
                .arg(arg!(--invested <AMOUNT>).required(true))
                .arg(arg!(--current <AMOUNT> "Defaults to the invested amount"))
                .arg(arg!(--date <DATE> "Purchase date").required(true))
                .arg(arg!(--description <TEXT>)),
        )
        .subcommand(with_output_flags(
            Command::new("list").about("List investments with profit/loss"),
        ))
        .subcommand(id_arg(
            Command::new("update")
                .about("Change fields of an investment")
                .arg(arg!(--name <NAME>))
                .arg(arg!(--"type" <TYPE>))
                .arg(arg!(--invested <AMOUNT>))
                .arg(arg!(--current <AMOUNT>))
                .arg(arg!(--date <DATE>))
                .arg(arg!(--description <TEXT>)),
        ))
        .subcommand(id_arg(Command::new("rm").about("Delete an investment")))
        .subcommand(with_output_flags(
            Command::new("summary").about("Totals and profit/loss by type"),
        ))
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Financial goals")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a goal")
                .arg(arg!(--title <TITLE>).required(true))
                .arg(
                    arg!(--"type" <TYPE> "expense_limit|savings_target|investment_goal")
                        .required(true),
                )
                .arg(arg!(--target <AMOUNT>).required(true))
                .arg(arg!(--current <AMOUNT>))
                .arg(arg!(--period <PERIOD> "monthly|yearly|custom").default_value("custom"))
                .arg(arg!(--start <DATE>).required(true))
                .arg(arg!(--end <DATE>).required(true))
                .arg(arg!(--"category-id" <ID>).value_parser(value_parser!(i64)))
                .arg(arg!(--description <TEXT>)),
        )
        .subcommand(with_output_flags(
            Command::new("list")
                .about("List goals with progress")
                .arg(arg!(--all "Include inactive goals").action(ArgAction::SetTrue)),
        ))
        .subcommand(id_arg(
            Command::new("update")
                .about("Change fields of a goal")
                .arg(arg!(--title <TITLE>))
                .arg(arg!(--"type" <TYPE>))
                .arg(arg!(--target <AMOUNT>))
                .arg(arg!(--current <AMOUNT>))
                .arg(arg!(--period <PERIOD>))
                .arg(arg!(--start <DATE>))
                .arg(arg!(--end <DATE>))
                .arg(arg!(--"category-id" <ID>).value_parser(value_parser!(i64)))
                .arg(no_category_arg())
                .arg(arg!(--description <TEXT>))
                .arg(arg!(--active <BOOL>).value_parser(value_parser!(bool))),
        ))
        .subcommand(id_arg(Command::new("rm").about("Delete a goal")))
        .subcommand(with_output_flags(
            Command::new("refresh").about("Recompute active goals from the ledger"),
        ))
        .subcommand(with_output_flags(
            Command::new("summary").about("Recompute active goals and summarise them"),
        ))
}

fn dashboard_cmd() -> Command {
    Command::new("dashboard")
        .about("Aggregated views")
        .subcommand_required(true)
        .subcommand(with_output_flags(
            Command::new("stats").about("Totals and recent transactions"),
        ))
        .subcommand(with_output_flags(
            Command::new("balance").about("Income, expense and balance"),
        ))
        .subcommand(with_output_flags(
            Command::new("chart")
                .about("Monthly income/expense series")
                .arg(
                    arg!(--months <N> "Calendar months to include, current one included")
                        .value_parser(value_parser!(u32))
                        .default_value("12"),
                ),
        ))
        .subcommand(with_output_flags(
            Command::new("monthly")
                .about("Income, expense and spend by category for a month")
                .arg(arg!(--month <MONTH> "YYYY-MM").required(true)),
        ))
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Stored preferences")
        .subcommand_required(true)
        .subcommand(Command::new("show").about("Show effective settings"))
        .subcommand(
            Command::new("set-user")
                .about("Set the default user id")
                .arg(
                    arg!(--id <ID>)
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
}

pub fn build_cli() -> Command {
    Command::new("ruvipay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Personal finance ledger: transactions, investments, goals and dashboards")
        .arg(
            arg!(--user <ID> "User id (defaults to RUVIPAY_USER or the stored default)")
                .global(true)
                .value_parser(value_parser!(i64)),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(investment_cmd())
        .subcommand(goal_cmd())
        .subcommand(dashboard_cmd())
        .subcommand(settings_cmd())
}
