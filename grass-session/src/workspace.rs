//! Référence vers un espace de travail GRASS (base, location, mapset)

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gisenv::{GisEnv, GISDBASE, LOCATION_NAME, MAPSET};

/// Espace de travail GRASS décrit par un fichier GISRC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    gisrc: PathBuf,
    gisdbase: PathBuf,
    location: String,
    mapset: String,
}

impl Workspace {
    /// Charge l'espace de travail décrit par un fichier GISRC
    pub fn from_gisrc(path: &Path) -> Result<Self> {
        let env = GisEnv::read(path)?;
        Self::from_env(path, &env)
    }

    /// Construit l'espace de travail à partir d'un GISRC déjà parsé
    pub fn from_env(path: &Path, env: &GisEnv) -> Result<Self> {
        Ok(Self {
            gisrc: path.to_path_buf(),
            gisdbase: PathBuf::from(env.require(GISDBASE, path)?),
            location: env.require(LOCATION_NAME, path)?.to_string(),
            mapset: env.require(MAPSET, path)?.to_string(),
        })
    }

    /// Fichier GISRC à transmettre aux modules
    pub fn gisrc(&self) -> &Path {
        &self.gisrc
    }

    pub fn gisdbase(&self) -> &Path {
        &self.gisdbase
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn mapset(&self) -> &str {
        &self.mapset
    }

    /// Répertoire de la location sur disque
    pub fn location_path(&self) -> PathBuf {
        self.gisdbase.join(&self.location)
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.gisdbase.display(),
            self.location,
            self.mapset
        )
    }
}
