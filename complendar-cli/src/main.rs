mod commands;
mod logging;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "complendar")]
#[command(about = "Turn a shared birthday spreadsheet into a calendar you can subscribe to")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spreadsheet into an .ics file
    Convert {
        /// Google Sheets link, CSV URL, local CSV file, or "-" for stdin
        #[arg(env = "COMPLENDAR_SPREADSHEET_URL")]
        source: String,

        /// Where to write the calendar (default: complendar_<random>.ics)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file to use instead of ~/.config/complendar/config.toml
        #[arg(long)]
        config: Option<PathBuf>,

        /// More log output (-v, -vv, -vvv)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    },
    /// List upcoming birthdays in an .ics file
    Preview {
        file: PathBuf,

        /// How many years ahead to list
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
        years: u32,

        /// Start listing from this date (YYYY-MM-DD, default: today)
        #[arg(long)]
        from: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            source,
            output,
            config,
            verbose,
        } => {
            logging::init(verbose);
            commands::convert::run(&source, output, config.as_deref()).await
        }
        Commands::Preview { file, years, from } => {
            logging::init(0);
            commands::preview::run(&file, years, from.as_deref())
        }
    }
}
