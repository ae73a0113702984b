use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use bus_notifier::cache::CachedFeed;
use bus_notifier::config::{NotifierConfig, demo_sessions, load_sessions};
use bus_notifier::feed::FeedClient;
use bus_notifier::monitor::{Collaborators, SessionScheduler};
use bus_notifier::notify::ConsoleSink;
use bus_notifier::stops::{RouteTables, StopClient, StopDirectory};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match NotifierConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // Static tables are required by every session (fail fast if unavailable)
    let tables =
        match RouteTables::load(&config.line_to_route_path, &config.route_to_stop_path).await {
            Ok(tables) => tables,
            Err(e) => {
                error!(error = %e, "failed to load route tables");
                return ExitCode::FAILURE;
            }
        };
    info!(lines = tables.line_count(), "loaded route tables");

    let sessions = match load_sessions(&config.sessions_path).await {
        Ok(Some(sessions)) => sessions,
        Ok(None) => {
            warn!(
                path = %config.sessions_path.display(),
                "no sessions file, using demo sessions"
            );
            demo_sessions()
        }
        Err(e) => {
            error!(error = %e, "failed to read sessions");
            return ExitCode::FAILURE;
        }
    };

    let feed_client = match FeedClient::new(config.feed_config()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create feed client");
            return ExitCode::FAILURE;
        }
    };
    let feed = CachedFeed::new(feed_client, &config.cache_config());

    // The stop registry is downloaded lazily by the first session that needs it
    let stop_client = match StopClient::new(config.stop_client_config()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create stop registry client");
            return ExitCode::FAILURE;
        }
    };
    let registry = StopDirectory::remote(stop_client, config.stop_cache());

    let scheduler = SessionScheduler::new(
        Collaborators {
            tables,
            registry,
            feed,
            sink: ConsoleSink,
        },
        config.monitor_settings(),
    );

    let cancel = scheduler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("interrupt received, stopping sessions");
        cancel.cancel();

        // A second interrupt skips the graceful stop.
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second interrupt received, exiting");
            std::process::exit(130);
        }
    });

    info!(
        sessions = sessions.len(),
        poll_secs = config.poll_interval.as_secs(),
        "starting bus notifier"
    );
    let reports = scheduler.run_all(sessions).await;

    let mut failed = false;
    for report in &reports {
        match &report.result {
            Ok(outcome) => info!(session = %report.label, ?outcome, "session finished"),
            Err(e) => {
                failed = true;
                error!(session = %report.label, error = %e, "session failed");
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
