mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "Browse your course timetable from an iCalendar feed, one day at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or set the link to your timetable feed
    Url {
        /// New feed URL (http, https or webcal)
        url: Option<String>,
    },
    /// Show the events of one day
    Day {
        /// Day to show (YYYY-MM-DD). Defaults to the day of your next event
        #[arg(short, long)]
        date: Option<String>,

        /// Step this many days-with-events forward
        #[arg(short, long, default_value_t = 0)]
        forward: u32,

        /// Step this many days-with-events back
        #[arg(short, long, default_value_t = 0)]
        back: u32,

        /// Show the description of the event with this UID
        #[arg(short, long)]
        expand: Option<String>,

        /// Print the day as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the next event that has not ended yet
    Next {
        /// Print the event as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every day that has events
    Days,
    /// Keep the next event up to date, reloading the feed periodically
    Watch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Url { url } => commands::url::run(url).await,
        Commands::Day {
            date,
            forward,
            back,
            expand,
            json,
        } => {
            let options = commands::day::DayOptions {
                date,
                forward,
                back,
                expand,
                json,
            };
            commands::day::run(options).await
        }
        Commands::Next { json } => commands::next::run(json).await,
        Commands::Days => commands::days::run().await,
        Commands::Watch => commands::watch::run().await,
    }
}
