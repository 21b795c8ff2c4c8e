/// Encore - terminal music player driving the playback core
use clap::{Parser, Subcommand};
use encore_api_client::{EncoreApiClient, HttpStreamResolver};
use encore_cli::{
    parse_command, status_report, AppConfig, Command, Playlist, TracingRenderer,
};
use encore_playback::{
    Intent, LikedPersistence, LikedStore, PlaybackContext, StreamResolver, TrackId,
};
use encore_storage::JsonFileLikedPersistence;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Encore terminal player", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./encore.toml when present)
    #[arg(short, long, global = true, env = "ENCORE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a playlist file, reading commands from stdin
    Play {
        /// Playlist JSON file
        playlist: PathBuf,
        /// Queue position to start from (1-based)
        #[arg(short, long, default_value_t = 1)]
        start: usize,
    },
    /// List liked songs
    Liked,
    /// Like or unlike a track
    Like {
        /// Track ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore=info,encore_cli=info,encore_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Play { playlist, start } => {
            play(&config, &playlist, start).await?;
        }
        Commands::Liked => {
            list_liked(&config).await?;
        }
        Commands::Like { id } => {
            toggle_liked(&config, &id).await?;
        }
    }

    Ok(())
}

async fn play(config: &AppConfig, playlist_path: &Path, start: usize) -> anyhow::Result<()> {
    let playlist = Playlist::load(playlist_path).await?;
    if start == 0 || start > playlist.len() {
        anyhow::bail!(
            "--start must be between 1 and {} (got {start})",
            playlist.len()
        );
    }

    let resolver: Arc<dyn StreamResolver> = match config.api_config() {
        Some(api) => {
            tracing::info!(url = %api.url, "Resolving streams through the API");
            Arc::new(HttpStreamResolver::new(EncoreApiClient::new(api)?))
        }
        None => Arc::new(playlist.stream_resolver()),
    };
    let persistence: Arc<dyn LikedPersistence> =
        Arc::new(JsonFileLikedPersistence::new(&config.storage.liked_path));

    let mut context = match PlaybackContext::init(
        config.player.clone(),
        Arc::clone(&resolver),
        Arc::clone(&persistence),
    )
    .await
    {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(error = %e, "Starting with no liked songs");
            PlaybackContext::new(config.player.clone(), resolver, persistence)
        }
    };

    let (snapshot_tx, snapshot_rx) = watch::channel(context.snapshot());
    context.subscribe(TracingRenderer::new(snapshot_tx));

    tracing::info!(
        name = playlist.name.as_deref().unwrap_or("untitled"),
        tracks = playlist.len(),
        "Queued playlist"
    );
    context.enqueue_all(playlist.tracks());
    context.play_index(start - 1)?;

    let (intent_tx, intent_rx) = mpsc::channel(32);
    let player = tokio::spawn(async move {
        context.run(intent_rx).await;
        context.dispose();
    });

    read_commands(&intent_tx, &snapshot_rx).await?;

    // Player may already be gone if the channel closed
    let _ = intent_tx.send(Intent::Shutdown).await;
    player.await?;

    Ok(())
}

async fn read_commands(
    intents: &mpsc::Sender<Intent>,
    snapshots: &watch::Receiver<Arc<encore_playback::PlaybackSnapshot>>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let intent = match parse_command(&line) {
            Ok(Command::Empty) => continue,
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                println!("{}", encore_cli::input::HELP);
                continue;
            }
            Ok(Command::Status) => {
                print!("{}", status_report(&snapshots.borrow()));
                continue;
            }
            Ok(Command::ToggleRepeat) => Intent::SetRepeat(snapshots.borrow().repeat.toggled()),
            Ok(Command::Intent(intent)) => intent,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if intents.send(intent).await.is_err() {
            break;
        }
    }

    Ok(())
}

async fn list_liked(config: &AppConfig) -> anyhow::Result<()> {
    let store = JsonFileLikedPersistence::new(&config.storage.liked_path);
    let ids = store.read().await?;

    println!("Liked songs ({}):", ids.len());
    for id in ids {
        println!("  {id}");
    }

    Ok(())
}

async fn toggle_liked(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let persistence = Arc::new(JsonFileLikedPersistence::new(&config.storage.liked_path));
    let mut liked = LikedStore::new(persistence);
    liked.load_from_persistence().await?;

    let id = TrackId::new(id);
    if liked.toggle(&id).await? {
        println!("Liked {id}");
    } else {
        println!("Unliked {id}");
    }

    Ok(())
}
