//! Configuration issue de l'environnement

use std::path::PathBuf;

use anyhow::{Context, Result};
use grass_session::{ProcessToolkit, ToolkitSettings, Workspace};

/// Configuration de l'accès au toolkit GRASS
#[derive(Debug, Clone, Default)]
pub struct ToolkitConfig {
    /// Fichier GISRC de la session courante (`GISRC`)
    pub gisrc: Option<PathBuf>,

    /// Installation GRASS (`GISBASE`): modules cherchés dans `bin/` et `scripts/`
    pub gisbase: Option<PathBuf>,

    /// Variables appliquées à chaque module
    pub settings: ToolkitSettings,
}

impl ToolkitConfig {
    /// Lit `GISRC` et `GISBASE`. Les réglages de compression et de format des
    /// messages sont fixes.
    pub fn from_env() -> Self {
        Self {
            gisrc: non_empty_var("GISRC"),
            gisbase: non_empty_var("GISBASE"),
            settings: ToolkitSettings::default(),
        }
    }

    /// Espace de travail courant de la session
    pub fn current_workspace(&self) -> Result<Workspace> {
        let gisrc = self
            .gisrc
            .as_deref()
            .ok_or(grass_session::GrassError::NotInSession)?;
        Workspace::from_gisrc(gisrc)
            .with_context(|| format!("Failed to read GISRC file {}", gisrc.display()))
    }

    pub fn toolkit(&self) -> ProcessToolkit {
        ProcessToolkit::new(self.gisbase.clone(), self.settings.clone())
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
