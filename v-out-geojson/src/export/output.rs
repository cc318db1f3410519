//! Destination de l'export: fichier ou sortie standard

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Valeur de `--output` désignant la sortie standard
pub const STDOUT_SENTINEL: &str = "-";

/// Destination demandée par l'utilisateur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

impl Destination {
    pub fn parse(output: &str) -> Self {
        if output == STDOUT_SENTINEL {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(output))
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Destination::Stdout)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::File(path) => write!(f, "{}", path.display()),
            Destination::Stdout => f.write_str(STDOUT_SENTINEL),
        }
    }
}

/// Fichier que `v.out.ogr` doit écrire. En mode stdout, le fichier vit dans un
/// répertoire temporaire supprimé au drop.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    scratch: Option<TempDir>,
}

impl OutputFile {
    pub fn for_destination(destination: &Destination) -> Result<Self> {
        match destination {
            Destination::File(path) => Ok(Self {
                path: path.clone(),
                scratch: None,
            }),
            Destination::Stdout => {
                let dir = tempfile::Builder::new()
                    .prefix("tmp_")
                    .tempdir()
                    .context("Failed to create temporary output directory")?;
                let name = dir
                    .path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                Ok(Self {
                    path: dir.path().join(format!("{}.geojson", name)),
                    scratch: Some(dir),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Vrai si le fichier est temporaire (mode stdout)
    pub fn is_temporary(&self) -> bool {
        self.scratch.is_some()
    }
}
