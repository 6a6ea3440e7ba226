use clap::Parser;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod error;
mod net;
mod session;

#[derive(Parser)]
struct Args {
    /// Game id to join, or tournament id with --tournament
    id: String,

    /// Display name to play under
    name: String,

    /// Server hostname
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(long, default_value_t = 7878)]
    port: u16,

    /// Join a tournament instead of a single game
    #[arg(short, long, default_value_t = false)]
    tournament: bool,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);

    let conn = net::Connection::connect(&args.host, args.port)?;
    let mut session = session::Session::new(conn, args.name);
    if args.tournament {
        session.run_tournament(&args.id)
    } else {
        session.run_game(&args.id)
    }
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
