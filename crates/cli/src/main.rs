mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actionlog_core::constants::RECENT_WEIGHT_LIMIT;
use actionlog_core::{ActionId, env_parse_with_default};
use actionlog_llm::LlmClient;
use actionlog_storage::{SettingsStore, SqliteKv};
use anyhow::{Context as _, Result};
use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset as _};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "actionlog")]
#[command(about = "Personal action journal with LLM-guided capture and reminders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a knowledge-archive entry (action-1)
    Knowledge {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        question: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record a household-operations entry (action-2)
    Household {
        #[arg(long)]
        observation: String,
        #[arg(long)]
        analysis: String,
    },
    /// Record a problem and its reframings (action-3)
    Reframe {
        #[arg(long)]
        problem: String,
        #[arg(long = "reframe")]
        reframes: Vec<String>,
    },
    /// Weight log (action-4)
    #[command(subcommand)]
    Weight(WeightCommand),
    /// List records, newest first
    List {
        #[arg(short, long)]
        action: Option<ActionId>,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Export every record as JSON
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replace every record with the contents of an export file
    Import {
        file: PathBuf,
    },
    /// Delete every record
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Print markdown references to the given records
    Compose {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Capture a record through a guided conversation
    Capture {
        action: ActionId,
        #[arg(long)]
        auto_save: bool,
    },
    /// Free chat with the model
    Chat {
        text: String,
    },
    /// Ask the model to polish a stored record
    Refine {
        id: String,
        request: String,
        /// Write the reply into the record
        #[arg(long)]
        apply: bool,
    },
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(subcommand)]
    Remind(RemindCommand),
}

#[derive(Subcommand)]
enum WeightCommand {
    Add {
        #[arg(long, allow_negative_numbers = true)]
        kg: f64,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
    },
    List {
        #[arg(short, long, default_value_t = RECENT_WEIGHT_LIMIT)]
        limit: usize,
    },
    Trend,
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show,
    Set(ProfileArgs),
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    /// Comma-separated list
    #[arg(long, value_delimiter = ',')]
    expertise: Option<Vec<String>>,
    #[arg(long)]
    persona: Option<String>,
    #[arg(long)]
    goals: Option<String>,
    #[arg(long)]
    use_in_prompts: Option<bool>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    SetKey { key: String },
    ClearKey,
    SetModel { model: String },
}

#[derive(Subcommand)]
enum RemindCommand {
    Add(ReminderArgs),
    List,
    Cancel {
        id: String,
    },
    Edit {
        id: String,
        #[command(flatten)]
        reminder: ReminderArgs,
    },
    /// Remove one-shot reminders that already fired
    Prune,
    /// Re-arm stored reminders and print them as they fire
    Run,
}

#[derive(Args)]
struct ReminderArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    body: Option<String>,
    #[command(flatten)]
    when: WhenArgs,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct WhenArgs {
    /// Next HH:MM, once
    #[arg(long, value_parser = parse_hm)]
    once: Option<NaiveTime>,
    /// HH:MM every day
    #[arg(long, value_parser = parse_hm)]
    daily: Option<NaiveTime>,
    /// YYYY-MM-DDTHH:MM
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
}

fn parse_hm(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M")
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM: {e}"))
}

pub(crate) fn get_data_dir() -> PathBuf {
    std::env::var_os("ACTIONLOG_DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
        dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("actionlog")
    })
}

pub(crate) fn ensure_data_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data directory {}", dir.display()))
}

pub(crate) fn open_kv() -> Result<Arc<SqliteKv>> {
    let dir = get_data_dir();
    ensure_data_dir(&dir)?;
    Ok(Arc::new(SqliteKv::new(&dir.join("actionlog.db"))?))
}

/// Offset used for reminder wall times; the local offset unless overridden.
pub(crate) fn tz_offset() -> Result<FixedOffset> {
    let local_minutes = Local::now().offset().fix().local_minus_utc() / 60;
    let minutes: i32 = env_parse_with_default("ACTIONLOG_TZ_OFFSET_MINUTES", local_minutes);
    FixedOffset::east_opt(minutes.saturating_mul(60))
        .with_context(|| format!("ACTIONLOG_TZ_OFFSET_MINUTES out of range: {minutes}"))
}

fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Builds the completion client from stored settings, with environment overrides.
pub(crate) fn llm_client(kv: &Arc<SqliteKv>) -> Result<LlmClient> {
    let settings = SettingsStore::new(Arc::clone(kv)).load();
    let api_key = env_non_empty("ACTIONLOG_API_KEY").or(settings.api_key).context(
        "no API key configured; run `actionlog config set-key <key>` or set ACTIONLOG_API_KEY",
    )?;
    let base_url = env_non_empty("ACTIONLOG_API_URL").unwrap_or(settings.base_url);
    let model = env_non_empty("ACTIONLOG_MODEL").unwrap_or(settings.model);
    Ok(LlmClient::new(api_key, base_url)?.with_model(model))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Knowledge { topic, question, notes } => {
            commands::records::run_knowledge(topic, question, notes)?;
        },
        Commands::Household { observation, analysis } => {
            commands::records::run_household(observation, analysis)?;
        },
        Commands::Reframe { problem, reframes } => {
            commands::records::run_reframe(problem, reframes)?;
        },
        Commands::Weight(cmd) => match cmd {
            WeightCommand::Add { kg, date, note } => {
                commands::records::run_weight_add(kg, date, note)?;
            },
            WeightCommand::List { limit } => commands::records::run_weight_list(limit)?,
            WeightCommand::Trend => commands::records::run_weight_trend()?,
        },
        Commands::List { action } => commands::history::run_list(action)?,
        Commands::Show { id } => commands::history::run_show(&id)?,
        Commands::Delete { id, yes } => commands::history::run_delete(&id, yes)?,
        Commands::Export { out } => commands::history::run_export(out.as_deref())?,
        Commands::Import { file } => commands::history::run_import(&file)?,
        Commands::Clear { yes } => commands::history::run_clear(yes)?,
        Commands::Compose { ids } => commands::history::run_compose(&ids)?,
        Commands::Capture { action, auto_save } => {
            commands::capture::run(action, auto_save).await?;
        },
        Commands::Chat { text } => commands::chat::run_chat(&text).await?,
        Commands::Refine { id, request, apply } => {
            commands::chat::run_refine(&id, &request, apply).await?;
        },
        Commands::Profile(cmd) => match cmd {
            ProfileCommand::Show => commands::settings::run_profile_show()?,
            ProfileCommand::Set(args) => commands::settings::run_profile_set(args)?,
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommand::Show => commands::settings::run_config_show()?,
            ConfigCommand::SetKey { key } => commands::settings::run_set_key(&key)?,
            ConfigCommand::ClearKey => commands::settings::run_clear_key()?,
            ConfigCommand::SetModel { model } => commands::settings::run_set_model(&model)?,
        },
        Commands::Remind(cmd) => match cmd {
            RemindCommand::Add(args) => commands::remind::run_add(args).await?,
            RemindCommand::List => commands::remind::run_list().await?,
            RemindCommand::Cancel { id } => commands::remind::run_cancel(&id).await?,
            RemindCommand::Edit { id, reminder } => {
                commands::remind::run_edit(&id, reminder).await?;
            },
            RemindCommand::Prune => commands::remind::run_prune().await?,
            RemindCommand::Run => commands::remind::run_forever().await?,
        },
    }

    Ok(())
}
