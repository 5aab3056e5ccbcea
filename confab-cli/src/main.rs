use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use confab_core::{MediaConstraints, PeerId, RemoteTrack, RoomName, Topology};
use confab_room::{
    LinkSnapshot, LinkState, MemoryRelay, RoomConfig, RoomError, RoomHandle, RoomObserver,
    StaticTrackSource, TransportFactory, WebrtcTransportFactory, join_room,
};
use dialoguer::Input;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "confab", version, about = "Room signaling and peer-link orchestration")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join participants to one room over an in-process relay with WebRTC links.
    Simulate {
        /// Room to join. Prompted for when missing.
        #[arg(long)]
        room: Option<String>,

        #[arg(long, value_enum, default_value_t = TopologyArg::HubSpoke)]
        topology: TopologyArg,

        /// Number of participants. Prompted for when missing.
        #[arg(short, long)]
        participants: Option<usize>,

        /// Participant (1-based) that leaves after the first settle.
        #[arg(long)]
        leave: Option<usize>,

        /// How long to let negotiations run before printing.
        #[arg(long, default_value_t = 1500)]
        settle_ms: u64,

        /// JSON room configuration to start from.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        audio_only: bool,

        /// Skip STUN servers and rely on host candidates.
        #[arg(long)]
        no_stun: bool,
    },

    /// Print the effective room configuration as JSON.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TopologyArg {
    Mesh,
    HubSpoke,
}

impl From<TopologyArg> for Topology {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Mesh => Topology::Mesh,
            TopologyArg::HubSpoke => Topology::HubSpoke,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Simulate {
            room,
            topology,
            participants,
            leave,
            settle_ms,
            config,
            audio_only,
            no_stun,
        } => {
            let mut base = load_config(config.as_deref())?;
            base.room = match room {
                Some(room) => RoomName::from(room),
                None if !base.room.is_empty() => base.room,
                None => RoomName::from(
                    Input::<String>::new()
                        .with_prompt("Room")
                        .default("lesson".into())
                        .interact_text()?,
                ),
            };
            base.topology = topology.into();
            if audio_only {
                base.media = MediaConstraints::audio_only();
            }
            if no_stun {
                base.ice_servers.clear();
            }

            let participants = match participants {
                Some(n) => n,
                None => Input::<usize>::new()
                    .with_prompt("Participants")
                    .default(3)
                    .interact_text()?,
            };
            if participants == 0 {
                bail!("at least one participant is needed");
            }

            simulate(base, participants, leave, Duration::from_millis(settle_ms)).await?;
        }

        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RoomConfig> {
    let Some(path) = path else {
        return Ok(RoomConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

async fn simulate(
    base: RoomConfig,
    participants: usize,
    leave: Option<usize>,
    settle: Duration,
) -> Result<()> {
    println!(
        "{}",
        format!(
            "Joining {} participant(s) to '{}' ({})",
            participants, base.room, base.topology
        )
        .green()
        .bold()
    );

    debug!("Using {} ICE server(s)", base.ice_servers.len());

    let relay = MemoryRelay::new();
    let media = StaticTrackSource::new();
    let transports: Arc<dyn TransportFactory> = Arc::new(WebrtcTransportFactory::new());

    let mut joined: Vec<(String, RoomHandle)> = Vec::new();
    for n in 1..=participants {
        let mut config = base.clone();
        config.user_name = format!("participant-{n}");
        let name = config.user_name.clone();

        let handle = join_room(
            config,
            &relay,
            &media,
            transports.clone(),
            Arc::new(ConsoleObserver { name: name.clone() }),
        )
        .await
        .with_context(|| format!("{name} failed to join"))?;

        println!("  {} {} as {}", "+".green(), name.bold(), handle.role());
        joined.push((name, handle));
    }

    tokio::time::sleep(settle).await;
    print_links(&relay, &base.room, &joined).await?;

    if let Some(index) = leave {
        if index == 0 || index > joined.len() {
            bail!("no participant #{index}");
        }
        let (name, handle) = joined.remove(index - 1);
        println!("\n  {} {} leaves", "-".red(), name.bold());
        handle.leave().await?;

        tokio::time::sleep(settle).await;
        print_links(&relay, &base.room, &joined).await?;
    }

    for (_, handle) in &joined {
        handle.leave().await?;
    }
    println!("{}", "Done.".green().bold());
    Ok(())
}

async fn print_links(
    relay: &MemoryRelay,
    room: &RoomName,
    joined: &[(String, RoomHandle)],
) -> Result<()> {
    for (name, handle) in joined {
        let links = handle.links().await?;
        println!(
            "\n{} [{}] {}",
            name.cyan().bold(),
            short(&handle.me()),
            handle.role().to_string().dimmed()
        );
        if links.is_empty() {
            println!("    {}", "no links".dimmed());
        }
        for link in &links {
            print_link(relay, room, link);
        }
    }
    Ok(())
}

fn print_link(relay: &MemoryRelay, room: &RoomName, link: &LinkSnapshot) {
    let peer = relay
        .user_name(room, &link.peer_id)
        .unwrap_or_else(|| short(&link.peer_id));
    let state = link.state.to_string();
    let state = match link.state {
        LinkState::Connected => state.green(),
        LinkState::Offering | LinkState::AnswerPending => state.yellow(),
        LinkState::Closed => state.red(),
        LinkState::Idle => state.dimmed(),
    };
    println!(
        "    {:<16} {:<10} {:<14} tracks={} candidates={}/{}",
        peer,
        link.role.to_string(),
        state,
        link.remote_tracks.len(),
        link.applied_candidates,
        link.applied_candidates + link.pending_candidates,
    );
}

fn short(id: &PeerId) -> String {
    id.to_string().chars().take(8).collect()
}

struct ConsoleObserver {
    name: String,
}

#[async_trait]
impl RoomObserver for ConsoleObserver {
    async fn on_remote_track(&self, peer_id: PeerId, track: RemoteTrack) {
        println!(
            "  {} {} receives {} from {}",
            "~".blue(),
            self.name,
            track.kind,
            short(&peer_id)
        );
    }

    async fn on_link_failed(&self, peer_id: PeerId, error: &RoomError) {
        println!(
            "  {} {} lost {}: {}",
            "!".red().bold(),
            self.name,
            short(&peer_id),
            error
        );
    }

    async fn on_warning(&self, error: &RoomError) {
        println!("  {} {}: {}", "?".yellow(), self.name, error);
    }
}
