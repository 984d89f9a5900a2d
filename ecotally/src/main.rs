//! ecotally - CLI for the household sustainability and spending dashboard
//!
//! This tool provides commands for:
//! - Printing the dashboard (stats, daily goals, achievements)
//! - Charting money or carbon over a week, 12 months, or all years
//! - Charting the last 7 days of electricity or water usage
//! - Completing a daily goal
//! - Logging and deleting activities and usage readings
//! - Managing wallets and the transactions booked against them
//!
//! Uses XDG Base Directory specification for file locations:
//! - Records: $XDG_DATA_HOME/ecotally/records.json (~/.local/share/ecotally/records.json)
//! - Config: $XDG_CONFIG_HOME/ecotally/config.toml (~/.config/ecotally/config.toml)
//! - Logs: $XDG_STATE_HOME/ecotally/ (~/.local/state/ecotally/)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use ecotally_core::analytics::{
    goals, usage_week, Chart, ChartRange, Clock, Dashboard, DashboardEngine, GoalKind,
    MAX_ECO_SCORE,
};
use ecotally_core::types::{NewActivity, NewTransaction, NewUsageLog, TransactionKind};
use ecotally_core::format::{
    format_amount, format_kg, format_quantity, format_relative_day, progress_bar,
};
use ecotally_core::store::{JsonFileStore, RecordStore};
use ecotally_core::{ActivityCategory, Config, RecordSet, UsageKind, Wallet};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecotally")]
#[command(about = "Household sustainability and spending dashboard")]
#[command(version)]
struct Args {
    /// Records snapshot file (default: from config)
    #[arg(short, long, global = true)]
    records: Option<PathBuf>,

    /// Signed-in account whose records are summarized
    #[arg(short, long, global = true)]
    owner: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Treat this day (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Write logs to the XDG state directory
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show stats, daily goals, and achievements
    Dashboard,

    /// Show a two-series bar chart
    Chart {
        /// What to chart
        #[arg(short, long, value_enum, default_value_t = Series::Money)]
        series: Series,

        /// Time window
        #[arg(long, value_enum, default_value_t = Range::Week)]
        range: Range,
    },

    /// Show the last 7 days of utility usage
    Usage {
        /// Which utility
        #[arg(short, long, value_enum, default_value_t = Utility::Electricity)]
        kind: Utility,
    },

    /// Log today's activity for a daily goal
    CompleteGoal {
        /// Goal to complete
        #[arg(short, long, value_enum)]
        goal: Goal,
    },

    /// Log a carbon activity
    Log {
        /// Category, e.g. car, bus, meat, recycling
        #[arg(short, long)]
        category: String,

        /// Title shown in lists (default: the category)
        #[arg(short, long)]
        title: Option<String>,

        /// Signed kg CO2e; negative values are offsets
        #[arg(short, long, allow_negative_numbers = true)]
        impact: f64,
    },

    /// Log an electricity or water reading
    LogUsage {
        /// Which utility
        #[arg(short, long, value_enum)]
        kind: Utility,

        /// kWh for electricity, liters for water
        #[arg(short, long)]
        quantity: f64,
    },

    /// List wallets and their balances
    Wallets,

    /// Open an empty wallet
    AddWallet {
        /// Wallet name
        #[arg(short, long)]
        name: String,
    },

    /// Book a transaction against a wallet
    AddTransaction {
        /// Wallet id
        #[arg(short, long)]
        wallet: String,

        #[arg(short, long, value_enum)]
        kind: Flow,

        #[arg(short, long)]
        amount: f64,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Change a transaction; unspecified fields keep their values
    EditTransaction {
        /// Transaction id
        #[arg(long)]
        id: String,

        /// Move to another wallet
        #[arg(short, long)]
        wallet: Option<String>,

        #[arg(short, long, value_enum)]
        kind: Option<Flow>,

        #[arg(short, long)]
        amount: Option<f64>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a record by id
    Delete {
        /// What kind of record
        #[arg(short, long, value_enum)]
        what: RecordKind,

        #[arg(long)]
        id: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Series {
    /// Income and expenses
    Money,
    /// Offsets and emissions
    Carbon,
}

#[derive(Clone, Copy, ValueEnum)]
enum Range {
    Week,
    Month,
    Year,
}

impl From<Range> for ChartRange {
    fn from(range: Range) -> Self {
        match range {
            Range::Week => ChartRange::Week,
            Range::Month => ChartRange::Month,
            Range::Year => ChartRange::Year,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Utility {
    Electricity,
    Water,
}

impl From<Utility> for UsageKind {
    fn from(kind: Utility) -> Self {
        match kind {
            Utility::Electricity => UsageKind::Electricity,
            Utility::Water => UsageKind::Water,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Goal {
    #[value(alias = "plant_tree")]
    PlantTree,
    Volunteer,
}

impl From<Goal> for GoalKind {
    fn from(goal: Goal) -> Self {
        match goal {
            Goal::PlantTree => GoalKind::PlantTree,
            Goal::Volunteer => GoalKind::Volunteer,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Flow {
    Income,
    Expense,
}

impl From<Flow> for TransactionKind {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Income => TransactionKind::Income,
            Flow::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Activity,
    Electricity,
    Water,
    Transaction,
    Wallet,
}

impl RecordKind {
    fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Activity => "activity",
            RecordKind::Electricity => "electricity log",
            RecordKind::Water => "water log",
            RecordKind::Transaction => "transaction",
            RecordKind::Wallet => "wallet",
        }
    }
}

/// Everything a subcommand needs, resolved from arguments and config
struct App {
    store: JsonFileStore,
    engine: DashboardEngine,
    owner: Option<String>,
    clock: Clock,
    format: OutputFormat,
}

impl App {
    fn records(&self) -> Result<RecordSet> {
        match self.owner.as_deref() {
            Some(owner) => self.store.load(owner).with_context(|| {
                format!("failed to load records from {}", self.store.path().display())
            }),
            None => Ok(RecordSet::default()),
        }
    }

    fn require_owner(&self, action: &str) -> Result<String> {
        match &self.owner {
            Some(owner) => Ok(owner.clone()),
            None => anyhow::bail!("{} requires --owner", action),
        }
    }

    fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard = if args.verbose {
        let guard = ecotally_core::logging::init(&config.logging)
            .context("failed to initialize logging")?;
        eprintln!("Logging to {}", guard.current_file().display());
        Some(guard)
    } else {
        None
    };

    let records_path = args.records.unwrap_or_else(|| config.records_path());
    let zone = config.clock.zone().context("invalid clock configuration")?;
    let clock = match (args.today, zone) {
        (Some(day), Some(zone)) => Clock::at_noon(day, zone),
        (Some(day), None) => Clock::at_noon_utc(day),
        (None, Some(zone)) => Clock::now_in(zone),
        (None, None) => Clock::system(),
    };
    let ctx = App {
        store: JsonFileStore::open(records_path),
        engine: DashboardEngine::new(config.scoring.clone()),
        owner: args.owner.filter(|owner| !owner.trim().is_empty()),
        clock,
        format: args.format,
    };

    match args.command {
        Command::Dashboard => cmd_dashboard(&ctx),
        Command::Chart { series, range } => cmd_chart(&ctx, series, range.into()),
        Command::Usage { kind } => cmd_usage(&ctx, kind.into()),
        Command::CompleteGoal { goal } => cmd_complete_goal(ctx, goal.into()),
        Command::Log {
            category,
            title,
            impact,
        } => cmd_log(ctx, category, title, impact),
        Command::LogUsage { kind, quantity } => cmd_log_usage(ctx, kind.into(), quantity),
        Command::Wallets => cmd_wallets(&ctx),
        Command::AddWallet { name } => cmd_add_wallet(ctx, &name),
        Command::AddTransaction {
            wallet,
            kind,
            amount,
            category,
            description,
        } => {
            let owner = ctx.require_owner("adding a transaction")?;
            let draft = NewTransaction {
                kind: kind.into(),
                amount,
                category,
                description,
                occurred_at: ctx.clock.now(),
                wallet_id: wallet,
                owner_id: owner,
            };
            cmd_add_transaction(ctx, draft)
        }
        Command::EditTransaction {
            id,
            wallet,
            kind,
            amount,
            category,
            description,
        } => {
            let edit = TransactionEdit {
                wallet,
                kind: kind.map(Into::into),
                amount,
                category,
                description,
            };
            cmd_edit_transaction(ctx, &id, edit)
        }
        Command::Delete { what, id } => cmd_delete(ctx, what, &id),
    }
}

fn cmd_dashboard(ctx: &App) -> Result<()> {
    let records = ctx.records()?;
    let dashboard = ctx
        .engine
        .evaluate(ctx.owner.as_deref(), &records, &ctx.clock);

    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    if ctx.owner.is_none() {
        println!("Not signed in. Pass --owner to see a dashboard.");
        return Ok(());
    }

    print_dashboard(&dashboard, &records, &ctx.clock);
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard, records: &RecordSet, clock: &Clock) {
    let stats = &dashboard.stats;

    let title = format!("Eco Dashboard ({})", clock.today());
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("Eco-score:       {}/{}", stats.eco_score, MAX_ECO_SCORE);
    println!(
        "Streak:          {} days (longest {})",
        stats.streak_days, stats.longest_streak_days
    );
    println!("Total impact:    {}", format_kg(stats.total_impact));
    println!("This month:      {}", format_kg(stats.current_month_impact));
    println!("Good days:       {}/7", stats.good_day_count);
    println!(
        "Electricity:     {} this month",
        format_quantity(stats.current_month_electricity, UsageKind::Electricity.unit())
    );
    println!(
        "Water:           {} this month",
        format_quantity(stats.current_month_water, UsageKind::Water.unit())
    );
    println!("Activities:      {}", stats.activity_count);
    println!("Transactions:    {}", stats.transaction_count);
    if let Some(latest) = records
        .activities
        .iter()
        .max_by_key(|a| clock.local_day(a.occurred_at))
    {
        println!(
            "Last logged:     {} ({})",
            latest.title,
            format_relative_day(latest.occurred_at, clock)
        );
    }
    println!();

    println!("Daily goals");
    for goal in &dashboard.goals {
        let mark = if goal.completed_today { "x" } else { " " };
        println!("  [{}] {}", mark, goal.title);
    }
    println!();

    println!(
        "Achievements ({}/{} unlocked)",
        stats.unlocked_count,
        dashboard.achievements.len()
    );
    for achievement in &dashboard.achievements {
        let mark = if achievement.unlocked { "+" } else { " " };
        println!(
            "  {} {} {:>3}/{:<3} {} ({})",
            mark,
            progress_bar(achievement.progress, achievement.target, 10),
            achievement.progress,
            achievement.target,
            achievement.title,
            achievement.tier.as_str()
        );
    }
}

fn cmd_chart(ctx: &App, series: Series, range: ChartRange) -> Result<()> {
    let records = ctx.records()?;
    let chart = match series {
        Series::Money => Chart::build(&records.transactions, range, &ctx.clock),
        Series::Carbon => Chart::build(&records.activities, range, &ctx.clock),
    };

    if ctx.format == OutputFormat::Json {
        let output = serde_json::json!({
            "range": chart.range,
            "labels": chart.labels(),
            "income": chart.incomes(),
            "expense": chart.expenses(),
            "total_income": chart.total_income(),
            "total_expense": chart.total_expense(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let (what, income_label, expense_label, fmt) = match series {
        Series::Money => ("Money", "income", "expense", format_amount as fn(f64) -> String),
        Series::Carbon => ("Carbon", "offset", "emission", format_kg as fn(f64) -> String),
    };
    println!("{} by {}", what, range.as_str());
    println!();
    for bucket in &chart.buckets {
        println!(
            "  {:<8} {} {:>12}   {} {:>12}",
            bucket.label,
            income_label,
            fmt(bucket.income),
            expense_label,
            fmt(bucket.expense)
        );
    }
    println!();
    println!(
        "Total: {} {}, {} {}",
        income_label,
        fmt(chart.total_income()),
        expense_label,
        fmt(chart.total_expense())
    );
    Ok(())
}

fn cmd_usage(ctx: &App, kind: UsageKind) -> Result<()> {
    let records = ctx.records()?;
    let days = usage_week(records.usage(kind), &ctx.clock);

    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }

    let name = match kind {
        UsageKind::Electricity => "Electricity",
        UsageKind::Water => "Water",
    };
    println!("{}, last 7 days", name);
    println!();
    for day in &days {
        println!(
            "  {} {}  {:>12}",
            day.label,
            day.key,
            format_quantity(day.total, kind.unit())
        );
    }
    let total: f64 = days.iter().map(|d| d.total).sum();
    println!();
    println!("Total: {}", format_quantity(total, kind.unit()));
    Ok(())
}

fn cmd_complete_goal(mut ctx: App, goal: GoalKind) -> Result<()> {
    let owner = ctx.require_owner("completing a goal")?;

    let records = ctx.records()?;
    if goals::completed_today(&records.activities, &goal.category(), &ctx.clock) {
        println!("Already completed today: {}", goal.title());
        return Ok(());
    }

    let draft = goal.draft(&owner, &ctx.clock, ctx.engine.scoring());
    let created = ctx
        .store
        .create_activity(draft)
        .with_context(|| format!("failed to write records to {}", ctx.store.path().display()))?;
    tracing::info!(goal = goal.id(), id = %created.id, "Completed daily goal");

    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("You completed: {}", goal.title());
        println!("Logged {} ({})", created.category, format_kg(created.impact_kg));
    }
    Ok(())
}

fn cmd_log(mut ctx: App, category: String, title: Option<String>, impact: f64) -> Result<()> {
    let owner = ctx.require_owner("logging an activity")?;
    if !impact.is_finite() {
        anyhow::bail!("--impact must be a finite number");
    }

    let category = ActivityCategory::from(category.trim().to_string());
    let draft = NewActivity {
        title: title.unwrap_or_else(|| category.to_string()),
        category,
        impact_kg: impact,
        occurred_at: ctx.clock.now(),
        owner_id: owner,
    };
    let created = ctx
        .store
        .create_activity(draft)
        .with_context(|| format!("failed to write records to {}", ctx.store.path().display()))?;

    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&created);
    }
    println!(
        "Logged {}: {} ({})",
        created.category,
        created.title,
        format_kg(created.impact_kg)
    );
    Ok(())
}

fn cmd_log_usage(mut ctx: App, kind: UsageKind, quantity: f64) -> Result<()> {
    let owner = ctx.require_owner("logging usage")?;
    let created = ctx
        .store
        .create_usage_log(NewUsageLog {
            kind,
            quantity,
            occurred_at: ctx.clock.now(),
            owner_id: owner,
        })
        .context("failed to log usage")?;

    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&created);
    }
    let name = match kind {
        UsageKind::Electricity => "electricity",
        UsageKind::Water => "water",
    };
    println!(
        "Logged {} of {}",
        format_quantity(created.quantity, kind.unit()),
        name
    );
    Ok(())
}

fn print_wallet(wallet: &Wallet) {
    println!(
        "  {:<16} {:>12}   income {:>10}   expenses {:>10}   {}",
        wallet.name,
        format_amount(wallet.amount),
        format_amount(wallet.total_income),
        format_amount(wallet.total_expenses),
        wallet.id
    );
}

fn cmd_wallets(ctx: &App) -> Result<()> {
    ctx.require_owner("listing wallets")?;
    let records = ctx.records()?;

    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&records.wallets);
    }
    if records.wallets.is_empty() {
        println!("No wallets yet. Create one with add-wallet.");
        return Ok(());
    }
    println!("Wallets");
    for wallet in &records.wallets {
        print_wallet(wallet);
    }
    let total: f64 = records.wallets.iter().map(|w| w.amount).sum();
    println!();
    println!("Total: {}", format_amount(total));
    Ok(())
}

fn cmd_add_wallet(mut ctx: App, name: &str) -> Result<()> {
    let owner = ctx.require_owner("adding a wallet")?;
    let wallet = ctx
        .store
        .create_wallet(&owner, name)
        .context("failed to create wallet")?;

    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&wallet);
    }
    println!("Created wallet {} ({})", wallet.name, wallet.id);
    Ok(())
}

fn cmd_add_transaction(mut ctx: App, draft: NewTransaction) -> Result<()> {
    let created = ctx
        .store
        .add_transaction(draft)
        .context("failed to add transaction")?;

    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&created);
    }
    println!(
        "Added {} of {} ({})",
        created.kind.as_str(),
        format_amount(created.amount),
        created.id
    );
    print_balance(&ctx, &created.wallet_id)
}

/// Fields to change on an existing transaction
struct TransactionEdit {
    wallet: Option<String>,
    kind: Option<TransactionKind>,
    amount: Option<f64>,
    category: Option<String>,
    description: Option<String>,
}

fn cmd_edit_transaction(mut ctx: App, id: &str, edit: TransactionEdit) -> Result<()> {
    ctx.require_owner("editing a transaction")?;
    let records = ctx.records()?;
    let existing = records
        .transactions
        .iter()
        .find(|t| t.id == id)
        .with_context(|| format!("transaction {} not found", id))?;

    let mut draft = existing.to_draft(ctx.clock.now());
    if let Some(wallet) = edit.wallet {
        draft.wallet_id = wallet;
    }
    if let Some(kind) = edit.kind {
        draft.kind = kind;
    }
    if let Some(amount) = edit.amount {
        draft.amount = amount;
    }
    if edit.category.is_some() {
        draft.category = edit.category;
    }
    if edit.description.is_some() {
        draft.description = edit.description;
    }

    let updated = ctx
        .store
        .update_transaction(id, draft)
        .context("failed to update transaction")?;

    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&updated);
    }
    println!(
        "Updated transaction {}: {} of {}",
        updated.id,
        updated.kind.as_str(),
        format_amount(updated.amount)
    );
    print_balance(&ctx, &updated.wallet_id)
}

fn print_balance(ctx: &App, wallet_id: &str) -> Result<()> {
    let records = ctx.records()?;
    if let Some(wallet) = records.wallets.iter().find(|w| w.id == wallet_id) {
        print_wallet(wallet);
    }
    Ok(())
}

fn cmd_delete(mut ctx: App, what: RecordKind, id: &str) -> Result<()> {
    let owner = ctx.require_owner("deleting a record")?;
    let context = || format!("failed to delete {} {}", what.as_str(), id);

    let deleted = match what {
        RecordKind::Activity => ctx
            .store
            .delete_activity(&owner, id)
            .map(serde_json::to_value)
            .with_context(context)?,
        RecordKind::Electricity => ctx
            .store
            .delete_usage_log(UsageKind::Electricity, &owner, id)
            .map(serde_json::to_value)
            .with_context(context)?,
        RecordKind::Water => ctx
            .store
            .delete_usage_log(UsageKind::Water, &owner, id)
            .map(serde_json::to_value)
            .with_context(context)?,
        RecordKind::Transaction => ctx
            .store
            .delete_transaction(&owner, id)
            .map(serde_json::to_value)
            .with_context(context)?,
        RecordKind::Wallet => ctx
            .store
            .delete_wallet(&owner, id)
            .map(serde_json::to_value)
            .with_context(context)?,
    }?;

    if ctx.format == OutputFormat::Json {
        return ctx.print_json(&deleted);
    }
    println!("Deleted {} {}", what.as_str(), id);
    Ok(())
}
