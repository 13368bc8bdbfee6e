use std::{
    env::{self},
    error::Error,
    fs::OpenOptions,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use property_ledger::{
    AppState, SQLiteTransactionStore, build_router, graceful_shutdown, initialize_db,
    logging_middleware,
};

/// The web server for the Property Ledger transactions dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone to show dates in, e.g. "Asia/Riyadh".
    #[arg(long, default_value = "Asia/Riyadh")]
    timezone: String,

    /// Where signed-out viewers are sent to sign in.
    #[arg(long, default_value = "/log_in")]
    log_in_url: String,

    /// Log the headers and bodies of every request and response.
    #[arg(long, default_value_t = false)]
    log_bodies: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging()?;

    let args = Args::parse();

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        return Err(format!("\"{}\" is not a canonical timezone name", args.timezone).into());
    }

    let secret = env::var("SECRET").map_err(|_| "The environment variable 'SECRET' must be set")?;

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let app_state = AppState::new(
        &secret,
        &args.timezone,
        Arc::new(SQLiteTransactionStore::new(conn)),
    )
    .with_log_in_url(&args.log_in_url);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state);

    let router = if args.log_bodies {
        router.layer(middleware::from_fn(logging_middleware))
    } else {
        router
    };

    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
