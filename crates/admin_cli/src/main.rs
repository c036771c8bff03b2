use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, ExpenseCmd, MoneyCents, Scope, SettlementCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "splitpay_admin")]
#[command(about = "Admin utilities for Splitpay (users, groups, expenses, settlements)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitpay.db?mode=rwc"
    )]
    database_url: String,

    /// Record settlements without booking them back into the ledger.
    #[arg(long)]
    no_reconcile: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Group(Group),
    Expense(Expense),
    /// Print net balances.
    Balances(ScopeArgs),
    Settle(Settle),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
    AddMember(AddMemberArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    #[arg(long)]
    name: String,
    /// Id of the creating user; becomes the group admin.
    #[arg(long)]
    creator: i64,
}

#[derive(Args, Debug)]
struct AddMemberArgs {
    #[arg(long)]
    group: i64,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Expense {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// Record an expense split evenly between the given users.
    Add(ExpenseAddArgs),
}

#[derive(Args, Debug)]
struct ExpenseAddArgs {
    #[arg(long)]
    group: i64,
    #[arg(long)]
    payer: i64,
    #[arg(long)]
    description: String,
    /// Total, e.g. `12.50` or `12,50`.
    #[arg(long, value_parser = parse_amount)]
    amount: MoneyCents,
    /// Comma separated participant ids.
    #[arg(long, value_delimiter = ',', required = true)]
    split: Vec<i64>,
}

#[derive(Args, Debug)]
struct ScopeArgs {
    /// Restrict to one group (default: all groups).
    #[arg(long)]
    group: Option<i64>,
}

#[derive(Args, Debug)]
struct Settle {
    #[command(subcommand)]
    command: SettleCommand,
}

#[derive(Subcommand, Debug)]
enum SettleCommand {
    /// Print the suggested transfers.
    Plan(ScopeArgs),
    /// Record one payment.
    Record(SettleRecordArgs),
}

#[derive(Args, Debug)]
struct SettleRecordArgs {
    #[arg(long)]
    payer: i64,
    #[arg(long)]
    payee: i64,
    #[arg(long, value_parser = parse_amount)]
    amount: MoneyCents,
    #[arg(long)]
    group: Option<i64>,
}

fn parse_amount(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .reconcile_settlements(!cli.no_reconcile)
        .build()
        .await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let user = engine.register_user(&args.name, &args.email).await?;
            println!("created user: {} <{}> ({})", user.name, user.email, user.id);
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.users().await? {
                println!("{:>5}  {}  <{}>", user.id, user.name, user.email);
            }
        }
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let group = engine.create_group(&args.name, args.creator).await?;
            println!("created group: {} ({})", group.name, group.id);
        }
        Command::Group(Group {
            command: GroupCommand::AddMember(args),
        }) => {
            let user = engine.add_member(args.group, &args.email, None).await?;
            println!("added {} to group {}", user.name, args.group);
        }
        Command::Expense(Expense {
            command: ExpenseCommand::Add(args),
        }) => {
            let cmd = ExpenseCmd::new(args.group, args.payer, args.description, args.amount)
                .split_evenly(&args.split);
            let detail = engine.record_expense(cmd).await?;
            println!(
                "recorded expense {}: {} paid {}",
                detail.expense.id, detail.payer.name, detail.expense.amount
            );
            for share in detail.shares {
                println!("  {:<20} {:>10}", share.participant.name, share.amount.to_string());
            }
        }
        Command::Balances(args) => {
            let balances = engine.compute_balances(Scope::from_group(args.group)).await?;
            let names = engine.name_directory(balances.keys().copied()).await?;
            for (user_id, balance) in balances {
                println!("{:<20} {:>10}", names.name(user_id), balance.to_string());
            }
        }
        Command::Settle(Settle {
            command: SettleCommand::Plan(args),
        }) => {
            let plan = engine.plan_settlements(Scope::from_group(args.group)).await?;
            if plan.is_empty() {
                println!("nothing to settle");
            }
            let names = engine
                .name_directory(plan.iter().flat_map(|s| [s.payer_id, s.payee_id]))
                .await?;
            for suggestion in plan {
                println!(
                    "{} -> {}: {}",
                    names.name(suggestion.payer_id),
                    names.name(suggestion.payee_id),
                    suggestion.amount
                );
            }
        }
        Command::Settle(Settle {
            command: SettleCommand::Record(args),
        }) => {
            let mut cmd = SettlementCmd::new(args.payer, args.payee, args.amount);
            if let Some(group) = args.group {
                cmd = cmd.group_id(group);
            }
            let settlement = engine.record_settlement(cmd).await?;
            println!("recorded settlement {}", settlement.id);
        }
    }

    Ok(())
}
