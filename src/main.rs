use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use realgain::cli::setup::setup;
use realgain::core::autofill::FillScope;
use realgain::core::config::SamplingMode;
use realgain::core::log::init_logging;
use realgain::core::{ExchangeKind, MonthField, MonthLabel};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for realgain::AppCommand {
    fn from(cmd: Commands) -> realgain::AppCommand {
        use realgain::AppCommand;
        match cmd {
            Commands::List => AppCommand::List,
            Commands::Show { id } => AppCommand::Show { id },
            Commands::Create {
                name,
                description,
                start,
                end,
            } => AppCommand::Create {
                name,
                description,
                start,
                end,
            },
            Commands::Duplicate { id } => AppCommand::Duplicate { id },
            Commands::Delete { id } => AppCommand::Delete { id },
            Commands::AddMonth { id, month } => AppCommand::AddMonth { id, label: month },
            Commands::RepeatMonth { id, month } => AppCommand::RepeatMonth { id, label: month },
            Commands::EditMonth {
                id,
                row,
                field,
                value,
            } => AppCommand::EditMonth {
                id,
                row,
                field,
                value,
            },
            Commands::DeleteMonth { id, row } => AppCommand::DeleteMonth { id, row },
            Commands::FillExchange {
                id,
                kind,
                scope,
                sampling,
            } => AppCommand::FillExchange {
                id,
                kind,
                sampling,
                scope,
            },
            Commands::FillInflation { id, scope } => AppCommand::FillInflation { id, scope },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List stored periods with their real gain
    List,
    /// Display the months and metrics of a period
    Show { id: String },
    /// Create a period with one empty month per calendar month
    Create {
        #[arg(short, long)]
        name: String,
        /// First month, as YYYY-MM
        #[arg(short, long, value_parser = MonthLabel::parse_year_month)]
        start: MonthLabel,
        /// Last month, as YYYY-MM
        #[arg(short, long, value_parser = MonthLabel::parse_year_month)]
        end: MonthLabel,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Copy a period under a new id
    Duplicate { id: String },
    /// Delete a period
    Delete { id: String },
    /// Append an empty month (MM/YY)
    AddMonth { id: String, month: MonthLabel },
    /// Append a copy of the last month, by default as the following month
    RepeatMonth { id: String, month: Option<MonthLabel> },
    /// Set one field of a month, by its row number in `show`
    EditMonth {
        id: String,
        row: usize,
        #[arg(value_enum)]
        field: MonthField,
        value: String,
    },
    /// Remove a month, by its row number in `show`
    DeleteMonth { id: String, row: usize },
    /// Fetch exchange rates for the months of a period
    FillExchange {
        id: String,
        #[arg(short, long, value_enum)]
        kind: Option<ExchangeKind>,
        #[arg(long, value_enum, default_value_t = FillScope::All)]
        scope: FillScope,
        #[arg(long, value_enum)]
        sampling: Option<SamplingMode>,
    },
    /// Fetch monthly inflation for the months of a period
    FillInflation {
        id: String,
        #[arg(long, value_enum, default_value_t = FillScope::All)]
        scope: FillScope,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => realgain::cli::setup::setup_at_path(path),
            None => setup(),
        },
        Some(cmd) => realgain::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
