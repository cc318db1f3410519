//! Export d'une couche vecteur en GeoJSON (reprojection, sortie fichier ou stdout)

pub mod document;
pub mod orchestrator;
pub mod output;
pub mod render;

pub use orchestrator::{run_export, ExportRequest};
pub use output::{Destination, OutputFile};
