use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use landing::view::{Control, Trigger};
use landing::{
    FileJar, History, HttpProfileClient, IdentityStore, Landing,
    LandingConfig, MemoryHistory, Page, SessionResolver, SubmitOutcome,
    ViewController, ViewState,
};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:102.0) Gecko/20100101 Firefox/102.0";

#[derive(Parser, Debug)]
#[command(name = "landing-cli")]
#[command(
    about = "Load the subscription landing page for a path and print it",
    long_about = None
)]
struct Cli {
    /// Location pathname, `/` or `/<id>-<name>`
    #[arg(default_value = "/")]
    path: String,

    /// TOML config; without it LANDING_API_URL is used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cookie jar kept between runs
    #[arg(long, default_value = "landing-cookies.json")]
    cookies: PathBuf,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Display name to sign up with when the visitor is unknown
    #[arg(long)]
    name: Option<String>,

    /// Follow the "open app" button once the dashboard is shown
    #[arg(long)]
    open_app: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    landing::initialize();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LandingConfig::load(path),
        None => LandingConfig::from_env(),
    }
    .context("Failed to load configuration")?;
    let endpoints = config.endpoints();

    let client = HttpProfileClient::new(endpoints.clone())
        .context("Failed to build HTTP client")?;
    let resolver = SessionResolver::new(
        IdentityStore::new(FileJar::new(&cli.cookies)),
        client,
        MemoryHistory::new(&cli.path),
    );
    let mut landing =
        Landing::new(resolver, ViewController::new(endpoints), Page::new());

    let state = landing.load(&cli.user_agent).await;

    if let (ViewState::AwaitingInput, Some(name)) = (&state, &cli.name) {
        landing.surface_mut().type_name(name);
        match landing.activate(&Control::NameButton, Trigger::Click).await {
            Some(SubmitOutcome::EmptyName) => {
                log::warn!("display name is blank, nothing submitted")
            }
            Some(SubmitOutcome::Failed(e)) => log::error!("sign up failed: {e}"),
            _ => {}
        }
    }

    if cli.open_app {
        landing
            .activate(&Control::OpenAppButton, Trigger::Click)
            .await;
    }

    print!("{}", landing.surface());
    println!("location: {}", landing.resolver().history().pathname());
    for url in landing.surface().navigations() {
        println!("navigate: {url}");
    }
    Ok(())
}
