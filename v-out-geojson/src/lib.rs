//! # v-out-geojson
//!
//! Export d'une couche vecteur GRASS en GeoJSON, reprojetée dans un EPSG donné.
//!
//! ## Features
//!
//! - Reprojection via une location temporaire (`g.proj`, `v.proj`)
//! - Export via `v.out.ogr format=GeoJSON`
//! - Sortie fichier ou sortie standard (`--output -`)
//! - Nettoyage garanti des données temporaires, y compris sur erreur ou signal
//!
//! ## Usage CLI
//!
//! ```bash
//! # Dans une session GRASS (GISRC défini)
//! v-out-geojson --input roads@PERMANENT --output roads.geojson
//! v-out-geojson --input roads --output roads_3358.geojson --epsg 3358
//! v-out-geojson --input roads --output - > roads.txt
//! ```

pub mod cli;
pub mod config;
pub mod export;
pub mod report;

pub use config::ToolkitConfig;
pub use export::{run_export, Destination, ExportRequest};
pub use report::{ExportReport, ExportStage};
