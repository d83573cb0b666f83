use std::{
    fs::File,
    io::BufWriter,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use tracing_subscriber::EnvFilter;

use lissajous::{CancelToken, Generator, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "lissajous", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve a new animated GIF on every request to `/`.
    Serve(ServeArgs),
    /// Render one animation to a GIF file.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// JSON server config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file).
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Shutdown grace period in milliseconds (overrides the config file).
    #[arg(long)]
    grace_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// JSON server config; only its `animation` section is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed frequency ratio instead of a random one.
    #[arg(long, conflicts_with = "seed")]
    freq: Option<f64>,

    /// Seed for the frequency ratio draw.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(p) => ServerConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        cfg.listen = listen;
    }
    if let Some(ms) = args.grace_ms {
        cfg.grace_period_ms = ms;
    }

    tracing::info!("starting up server");
    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    rt.block_on(lissajous::server::serve(cfg))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let generator = Generator::new(cfg.animation)?;

    let freq = match (args.freq, args.seed) {
        (Some(freq), _) => freq,
        (None, Some(seed)) => generator.random_frequency(&mut StdRng::seed_from_u64(seed)),
        (None, None) => generator.random_frequency(&mut rand::thread_rng()),
    };

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let file = File::create(&args.out)
        .with_context(|| format!("create gif '{}'", args.out.display()))?;

    generator
        .write_gif(freq, BufWriter::new(file), &CancelToken::new())
        .with_context(|| format!("write gif '{}'", args.out.display()))?;

    tracing::info!(freq, out = %args.out.display(), "wrote animation");
    Ok(())
}
