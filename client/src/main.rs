use clap::Parser;
use client::network::Client;
use client::session::{keys, SessionStore};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server address (push channel and command channel)
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Party queue endpoint used for requeue-with-party
    #[arg(short = 'q', long, default_value = "127.0.0.1:8081")]
    queue: String,

    /// User id announced when joining as a player
    #[arg(short = 'u', long, default_value = "anonymous")]
    user_id: String,

    /// Party id; enables the wait-queue requeue path
    #[arg(short = 'p', long)]
    party: Option<String>,

    /// Join as a spectator instead of a player
    #[arg(long)]
    spectator: bool,

    /// Round id to join, if already known
    #[arg(short = 'r', long)]
    round: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut store = SessionStore::new();
    store.set(keys::USER_ID, args.user_id);
    if args.spectator {
        store.set(keys::IS_SPECTATOR, "true");
    }
    if let Some(party) = args.party {
        store.set(keys::PARTY_ID, party);
    }
    if let Some(round) = args.round {
        store.set(keys::ROUND_ID, round);
    }

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Controls: arrows/WASD to steer, Enter to start, R to requeue");

    let mut client = Client::new(&args.server, &args.queue, store).await?;
    client.run().await?;

    Ok(())
}
