//! Définition et implémentation de la commande CLI
//!
//! `v-out-geojson --input roads@PERMANENT --output roads.geojson --epsg 3358`
//! `v-out-geojson --input roads --output -` (document sur la sortie standard)

use anyhow::Result;
use clap::Args;
use grass_session::Session;
use tracing::debug;

use crate::config::ToolkitConfig;
use crate::export::{run_export, Destination, ExportRequest};
use crate::report::ExportReport;

/// Options de l'export
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Input vector map (name or name@mapset)
    #[arg(short, long, value_name = "NAME[@MAPSET]")]
    pub input: String,

    /// Output GeoJSON file. "-" to write to stdout
    #[arg(short, long, value_name = "FILE", allow_hyphen_values = true)]
    pub output: String,

    /// Output EPSG code
    #[arg(long, default_value_t = 4326, value_parser = clap::value_parser!(u32).range(1..))]
    pub epsg: u32,
}

impl ExportArgs {
    pub fn to_request(&self) -> ExportRequest {
        ExportRequest {
            input: self.input.clone(),
            destination: Destination::parse(&self.output),
            epsg: self.epsg,
        }
    }
}

/// Exécute l'export dans la session GRASS courante
pub async fn cmd_export(args: &ExportArgs, config: &ToolkitConfig) -> Result<ExportReport> {
    let workspace = config.current_workspace()?;
    debug!(workspace = %workspace, gisrc = %workspace.gisrc().display(), "Current workspace");

    let mut session = Session::new(config.toolkit(), workspace);
    let request = args.to_request();
    let mut stdout = std::io::stdout();

    let report = run_export(&mut session, &request, &mut stdout).await?;
    debug!(report = %report.to_json()?, "Export report");

    Ok(report)
}
