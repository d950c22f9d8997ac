mod config;

use anyhow::Context;
use careconnect_core::{Category, Clock, Domain, FeedbackKind, FeedbackLog, Profile, anonymize};
use careconnect_store::{BundleSource, ContentStore};
use careconnect_sync::{ContentFetcher, DashboardLoader, HttpTransport, LoadOutcome};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use config::Settings;

#[derive(Parser)]
#[command(name = "careconnect", version, about = "Daily dashboard content for CareConnect")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Today's dashboard, from the day cache or a fresh fetch
    Load,
    /// Drop today's cached dashboard and fetch again
    Refresh,
    /// Print the current dashboard, or one content domain, without fetching
    Show {
        /// music, recipe, photo or nostalgia_news
        domain: Option<Domain>,
    },
    /// Check whether the content pipeline is reachable
    Health,
    /// Record that an item was enjoyed
    Like { category: Category, item: String },
    /// Record that an item was not enjoyed
    Dislike { category: Category, item: String },
    /// Show the feedback log summary
    Feedback {
        /// Delete all recorded feedback
        #[arg(long)]
        clear: bool,
    },
    /// Manage the saved profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the saved profile and what would be sent for it
    Show,
    /// Update fields of the saved profile
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        birth_year: Option<i32>,
        /// Repeat for up to three entries; replaces the saved list
        #[arg(long)]
        heritage: Vec<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        /// Repeat for several interests; replaces the saved list
        #[arg(long = "interest")]
        interests: Vec<String>,
    },
    /// Delete the saved profile
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    tracing::debug!(api_url = %cli.settings.api_url, data_dir = %cli.settings.data_dir.display(), "starting");

    let transport = HttpTransport::new(&cli.settings.fetcher_config())
        .context("building HTTP client")?;
    let loader = DashboardLoader::new(
        ContentFetcher::new(transport, cli.settings.fetcher_config()),
        cli.settings.open_kv()?,
        ContentStore::new(),
        cli.settings.clock(),
    );

    match cli.command {
        Command::Load => report(loader.load().await)?,
        Command::Refresh => report(loader.refresh().await)?,
        Command::Show { domain } => {
            if let Some(entry) = loader.cache().entry() {
                let source = entry.served_as();
                loader.store().publish(entry.bundle, source);
            }
            let store = loader.store();
            indicate(store.source());
            match domain {
                Some(domain) => print_json(&store.get_domain(domain))?,
                None => print_json(&store.get_data())?,
            }
        }
        Command::Health => {
            let status = loader.health().await;
            print_json(&json!({ "api_url": loader.fetcher().config().base_url, "status": status }))?;
        }
        Command::Like { category, item } => record(&loader, FeedbackKind::Like, category, &item)?,
        Command::Dislike { category, item } => {
            record(&loader, FeedbackKind::Dislike, category, &item)?
        }
        Command::Feedback { clear } => {
            if clear {
                loader.feedback().clear().context("clearing feedback")?;
            }
            print_json(&feedback_report(&loader.feedback().load()))?;
        }
        Command::Profile { action } => profile(&loader, action)?,
    }
    Ok(())
}

fn feedback_report(log: &FeedbackLog) -> serde_json::Value {
    json!({
        "total": log.len(),
        "engagement": log.engagement(),
        "personalization_ready": log.personalization_ready(),
        "preferred_categories": log.preferred_categories(),
        "avoided_categories": log.avoided_categories(),
        "by_category": log.by_category(),
        "summary": log.summary(),
    })
}

fn report(outcome: LoadOutcome) -> anyhow::Result<()> {
    if let Some(failure) = &outcome.failure {
        eprintln!("Content service unavailable ({})", failure.reason());
    }
    indicate(outcome.source);
    print_json(&outcome.bundle)
}

fn indicate(source: BundleSource) {
    if let Some(note) = source.indicator() {
        eprintln!("{note}");
    }
}

fn record(
    loader: &DashboardLoader<HttpTransport>,
    kind: FeedbackKind,
    category: Category,
    item: &str,
) -> anyhow::Result<()> {
    if item.trim().is_empty() {
        anyhow::bail!("feedback item must not be empty");
    }
    let entry = loader
        .feedback()
        .record(kind, item, category)
        .context("recording feedback")?;
    print_json(&entry)
}

fn profile(loader: &DashboardLoader<HttpTransport>, action: ProfileAction) -> anyhow::Result<()> {
    let profiles = loader.profiles();
    match action {
        ProfileAction::Show => {
            let saved = profiles.load();
            let profile = saved.clone().unwrap_or_else(Profile::demo);
            print_json(&json!({
                "saved": saved.is_some(),
                "profile": profile,
                "anonymized": anonymize(&profile, loader.clock().current_year()),
            }))
        }
        ProfileAction::Set {
            name,
            birth_year,
            heritage,
            city,
            state,
            interests,
        } => {
            let mut profile = profiles.load().unwrap_or_default();
            if name.is_some() {
                profile.name = name;
            }
            if birth_year.is_some() {
                profile.birth_year = birth_year;
            }
            if !heritage.is_empty() {
                profile.heritage = heritage;
            }
            if city.is_some() {
                profile.city = city;
            }
            if state.is_some() {
                profile.state = state;
            }
            if !interests.is_empty() {
                profile.interests = interests;
            }
            profiles.save(&profile).context("saving profile")?;
            print_json(&profile)
        }
        ProfileAction::Clear => {
            profiles.clear().context("clearing profile")?;
            eprintln!("Profile cleared; the demo profile will be used");
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
