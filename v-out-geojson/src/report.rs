//! Rapport d'export
//!
//! Suit l'étape atteinte par l'export (nommée dans l'erreur en cas d'échec) et
//! résume le résultat: nombre de features, empreinte du fichier produit.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::export::ExportRequest;

/// Étapes d'un export, dans l'ordre
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportStage {
    /// Rien n'a encore été modifié
    Init,
    /// Location temporaire créée dans l'EPSG cible
    TempWorkspaceCreated,
    /// Location temporaire active
    WorkspaceSwitched,
    /// Couche reprojetée dans la location temporaire
    LayerReprojected,
    /// `v.out.ogr` a écrit le GeoJSON
    Exported,
    /// Document affiché sur la sortie standard
    Printed,
    /// Document laissé à l'emplacement demandé
    Saved,
    /// Espace de travail d'origine de nouveau actif
    Restored,
    /// Ressources temporaires libérées
    Done,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStage::Init => "INIT",
            ExportStage::TempWorkspaceCreated => "TEMP_WORKSPACE_CREATED",
            ExportStage::WorkspaceSwitched => "WORKSPACE_SWITCHED",
            ExportStage::LayerReprojected => "LAYER_REPROJECTED",
            ExportStage::Exported => "EXPORTED",
            ExportStage::Printed => "PRINTED",
            ExportStage::Saved => "SAVED",
            ExportStage::Restored => "RESTORED",
            ExportStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Résumé d'un export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub input: String,
    pub epsg: u32,
    pub destination: String,
    pub stage: ExportStage,
    /// Nombre de features (connu quand le document a été relu)
    pub features: Option<usize>,
    /// Empreinte blake3 du fichier produit par `v.out.ogr`
    pub digest: Option<String>,
}

impl ExportReport {
    pub fn new(request: &ExportRequest) -> Self {
        Self {
            input: request.input.clone(),
            epsg: request.epsg,
            destination: request.destination.to_string(),
            stage: ExportStage::Init,
            features: None,
            digest: None,
        }
    }

    /// Passe à l'étape suivante
    pub fn advance(&mut self, stage: ExportStage) {
        tracing::trace!(from = %self.stage, to = %stage, "Export stage");
        self.stage = stage;
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize export report")
    }
}

/// Calcule l'empreinte blake3 d'un fichier
pub fn file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 65536];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
