//! Types d'erreurs pour le crate grass-session

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Erreurs pouvant survenir lors du pilotage d'une session GRASS
#[derive(Debug, Error)]
pub enum GrassError {
    /// Erreur d'I/O (lecture GISRC, création de fichiers temporaires...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Variable GISRC absente: on n'est pas dans une session GRASS
    #[error("GISRC is not set: this module must be run inside a GRASS session")]
    NotInSession,

    /// Ligne invalide dans un fichier GISRC
    #[error("Invalid GISRC file {path}, line {line}: {content:?}")]
    InvalidGisrc {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// Clé obligatoire absente du fichier GISRC
    #[error("Missing {key} in GISRC file {path}")]
    MissingKey { key: &'static str, path: PathBuf },

    /// Référence de couche `nom@mapset` invalide
    #[error("Invalid vector map reference <{reference}>: {reason}")]
    InvalidLayer { reference: String, reason: String },

    /// Impossible de lancer un module du toolkit
    #[error("Failed to start {module}: {source}")]
    Spawn {
        module: String,
        #[source]
        source: std::io::Error,
    },

    /// Un module du toolkit a échoué
    #[error("{module} failed ({}): {stderr}", exit_label(.code))]
    ModuleFailed {
        module: String,
        code: Option<i32>,
        stderr: String,
    },

    /// La location temporaire existe déjà (jamais supprimée si on ne l'a pas créée)
    #[error("Location <{0}> already exists")]
    LocationExists(String),

    /// La location temporaire ne rapporte pas l'EPSG demandé
    #[error("Creation of temporary location failed! (expected EPSG:{expected}, found {found:?})")]
    LocationVerification { expected: u32, found: Option<String> },
}

impl GrassError {
    /// Crée une erreur de référence de couche avec contexte
    pub fn invalid_layer(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLayer {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de module à partir du stderr capturé
    pub fn module_failed(module: impl Into<String>, status: ExitStatus, stderr: &[u8]) -> Self {
        Self::ModuleFailed {
            module: module.into(),
            code: status.code(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, GrassError>;
