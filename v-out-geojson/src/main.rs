//! Point d'entrée CLI pour v-out-geojson

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use v_out_geojson::cli::{self, ExportArgs};
use v_out_geojson::ToolkitConfig;

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Exporte une couche vecteur GRASS en GeoJSON dans la projection d'un code EPSG
#[derive(Parser)]
#[command(name = "v-out-geojson")]
#[command(author, version)]
#[command(about = "Exports vector map to GeoJSON format into projection with given EPSG code")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    export: ExportArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging (stderr: stdout est réservé au document)
    init_logging(cli.verbose, cli.quiet);

    let config = ToolkitConfig::from_env();

    // Un signal annule l'export: les guards sont droppés, les données temporaires supprimées
    tokio::select! {
        result = cli::cmd_export(&cli.export, &config) => {
            result?;
        }
        signal = shutdown_signal() => {
            signal?;
            anyhow::bail!("Interrupted, temporary data removed");
        }
    }

    Ok(())
}

/// Attend SIGINT (ou SIGTERM sous unix)
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
