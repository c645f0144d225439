//! `eventpulse` - terminal front end for the EventPulse ticket booking client.
//!
//! Drives the same views a browser would, through the store runtime, and
//! prints the resulting view state.
//!
//! # Usage
//!
//! ```bash
//! eventpulse events --search jazz
//! eventpulse event 42
//! eventpulse book 42 --quantity 3 --user fan@example.com
//! eventpulse featured
//! eventpulse nav --user admin@example.com --admin
//! eventpulse open /events/42
//! ```
//!
//! Configuration comes from `EVENTPULSE_*` environment variables (a `.env`
//! file is honored); `--api-url` overrides the API base URL.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventpulse_client::api::HttpEventApi;
use eventpulse_client::app::{AppAction, AppReducer, AppState};
use eventpulse_client::features::catalog::CatalogAction;
use eventpulse_client::features::detail::DetailAction;
use eventpulse_client::features::navbar;
use eventpulse_client::features::ViewEnvironment;
use eventpulse_client::routes::Route;
use eventpulse_client::session::{InMemorySessionProvider, SessionContext};
use eventpulse_client::types::{EventId, User};
use eventpulse_client::{render, Config};
use eventpulse_core::environment::SystemClock;
use eventpulse_runtime::{EffectHandle, Store};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type AppStore = Store<AppState, AppAction, ViewEnvironment, AppReducer>;

#[derive(Debug, Parser)]
#[command(name = "eventpulse", version, about = "Browse events and book tickets")]
struct Cli {
    /// API base URL (overrides EVENTPULSE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List events, optionally filtered
    Events {
        /// Case-insensitive text matched against title, description and location
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one event
    Event {
        /// Event id
        id: String,
    },
    /// Book tickets for an event
    Book {
        /// Event id
        id: String,
        /// Number of tickets, as typed
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,
        /// Sign in as this email first
        #[arg(long)]
        user: Option<String>,
        /// Sign in with the admin flag
        #[arg(long, requires = "user")]
        admin: bool,
    },
    /// Show the home page's featured events
    Featured,
    /// Open a client path such as `/events` or `/events/42`
    Open {
        /// Path to open
        path: String,
    },
    /// Show navigation bar items
    Nav {
        /// Sign in as this email first
        #[arg(long)]
        user: Option<String>,
        /// Sign in with the admin flag
        #[arg(long, requires = "user")]
        admin: bool,
    },
}

fn session_for(user: Option<&str>, admin: bool) -> SessionContext {
    match user {
        Some(email) => InMemorySessionProvider::signed_in(User::new(email, admin)).into_context(),
        None => InMemorySessionProvider::anonymous().into_context(),
    }
}

async fn settle(mut handle: EffectHandle, config: &Config) -> Result<()> {
    handle
        .wait_with_timeout(config.effect_timeout)
        .await
        .context("timed out waiting for the event API")
}

async fn navigate(store: &AppStore, route: Route, config: &Config) -> Result<()> {
    let handle = store.send(AppAction::Navigate(route)).await?;
    settle(handle, config).await
}

async fn book(store: &AppStore, session: &SessionContext, config: &Config) -> Result<()> {
    if session.current_user().is_none() {
        store.send(AppAction::Detail(DetailAction::BookTickets)).await?;
        let route = store.state(|s| s.route.clone()).await;
        println!("Sign in to book tickets (redirected to {route})");
        return Ok(());
    }

    if store.state(|s| s.detail.event.loaded().is_none()).await {
        warn!("No booking was made");
        println!("{}", store.state(|s| render::detail(&s.detail)).await);
        return Ok(());
    }

    let mut redirects = store.subscribe_actions();
    store
        .send_and_wait_for(
            AppAction::Detail(DetailAction::BookTickets),
            |action| matches!(action, AppAction::Detail(DetailAction::BookingCompleted(_))),
            config.effect_timeout,
        )
        .await
        .context("booking did not complete")?;

    println!("{}", store.state(|s| render::detail(&s.detail)).await);

    if store.state(|s| s.detail.success.is_some()).await {
        let deadline = config.redirect_delay + Duration::from_secs(1);
        let redirected = tokio::time::timeout(deadline, async {
            while let Ok(action) = redirects.recv().await {
                if matches!(action, AppAction::Detail(DetailAction::RedirectElapsed)) {
                    return true;
                }
            }
            false
        })
        .await;
        if matches!(redirected, Ok(true)) {
            let route = store.state(|s| s.route.clone()).await;
            println!("Redirected to {route}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "eventpulse=info,eventpulse_client=info,eventpulse_runtime=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    eventpulse_runtime::metrics::describe_metrics();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    info!(api_url = %config.api_url, "Starting EventPulse client");

    let (user, admin) = match &cli.command {
        Command::Book { user, admin, .. } | Command::Nav { user, admin } => {
            (user.as_deref(), *admin)
        },
        _ => (None, false),
    };
    let session = session_for(user, admin);

    if let Command::Nav { .. } = cli.command {
        println!("{}", render::navbar(&navbar::items(session.as_ref())));
        return Ok(());
    }

    let api = HttpEventApi::from_config(&config)?;
    let env = ViewEnvironment::new(Arc::new(SystemClock), Arc::new(api), Arc::clone(&session))
        .with_config(&config);
    let store = Store::new(AppState::default(), AppReducer::new(), env);

    match &cli.command {
        Command::Events { search } => {
            navigate(&store, Route::Events, &config).await?;
            if let Some(text) = search {
                store
                    .send(AppAction::Catalog(CatalogAction::SearchChanged(text.clone())))
                    .await?;
            }
            println!("{}", store.state(|s| render::navbar(&s.navbar.items)).await);
            println!("{}", store.state(|s| render::catalog(&s.catalog)).await);
        },
        Command::Event { id } => {
            navigate(&store, Route::EventDetail(EventId::new(id.as_str())), &config).await?;
            println!("{}", store.state(|s| render::detail(&s.detail)).await);
        },
        Command::Book { id, quantity, .. } => {
            navigate(&store, Route::EventDetail(EventId::new(id.as_str())), &config).await?;
            store
                .send(AppAction::Detail(DetailAction::QuantityChanged(quantity.clone())))
                .await?;
            book(&store, &session, &config).await?;
        },
        Command::Featured => {
            navigate(&store, Route::Home, &config).await?;
            println!("{}", store.state(|s| render::home(&s.home)).await);
        },
        Command::Open { path } => {
            let route: Route = path.parse()?;
            navigate(&store, route, &config).await?;
            println!("{}", store.state(render::current_view).await);
        },
        Command::Nav { .. } => {},
    }

    if let Err(error) = store.shutdown(Duration::from_secs(1)).await {
        warn!(error = %error, "Effects still running at exit");
    }

    Ok(())
}
