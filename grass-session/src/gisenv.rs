//! Lecture et écriture des fichiers GISRC
//!
//! Un fichier GISRC est une suite de lignes `CLE: valeur`:
//!
//! ```text
//! GISDBASE: /home/user/grassdata
//! LOCATION_NAME: nc_spm_08
//! MAPSET: PERMANENT
//! GUI: text
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{GrassError, Result};

pub const GISDBASE: &str = "GISDBASE";
pub const LOCATION_NAME: &str = "LOCATION_NAME";
pub const MAPSET: &str = "MAPSET";

/// Contenu d'un fichier GISRC (ordre des clés conservé)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GisEnv {
    entries: Vec<(String, String)>,
}

impl GisEnv {
    /// Construit l'environnement d'une location: mapset, base, location, GUI
    pub fn for_location(gisdbase: &Path, location: &str, mapset: &str) -> Self {
        let mut env = Self::default();
        env.set(MAPSET, mapset);
        env.set(GISDBASE, gisdbase.to_string_lossy());
        env.set(LOCATION_NAME, location);
        env.set("GUI", "text");
        env
    }

    /// Parse le contenu d'un fichier GISRC. `path` ne sert qu'aux messages d'erreur.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut env = Self::default();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = line.split_once(':').ok_or_else(|| GrassError::InvalidGisrc {
                path: path.to_path_buf(),
                line: idx + 1,
                content: raw.to_string(),
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(GrassError::InvalidGisrc {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    content: raw.to_string(),
                });
            }
            env.set(key, value.trim());
        }

        Ok(env)
    }

    /// Lit un fichier GISRC
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Écrit le fichier GISRC
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Définit une clé (remplace la valeur si elle existe déjà)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Récupère une clé obligatoire
    pub fn require(&self, key: &'static str, path: &Path) -> Result<&str> {
        self.get(key).ok_or_else(|| GrassError::MissingKey {
            key,
            path: path.to_path_buf(),
        })
    }

    pub fn gisdbase(&self) -> Option<PathBuf> {
        self.get(GISDBASE).map(PathBuf::from)
    }

    pub fn location_name(&self) -> Option<&str> {
        self.get(LOCATION_NAME)
    }

    pub fn mapset(&self) -> Option<&str> {
        self.get(MAPSET)
    }
}

impl fmt::Display for GisEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gisrc() {
        let content = "GISDBASE: /data/grassdata\nLOCATION_NAME: nc_spm_08\n\nMAPSET: user1\nGUI: text\n";
        let env = GisEnv::parse(Path::new("rc"), content).unwrap();

        assert_eq!(env.gisdbase(), Some(PathBuf::from("/data/grassdata")));
        assert_eq!(env.location_name(), Some("nc_spm_08"));
        assert_eq!(env.mapset(), Some("user1"));
        assert_eq!(env.get("GUI"), Some("text"));
    }

    #[test]
    fn test_parse_keeps_colons_in_value() {
        let env = GisEnv::parse(Path::new("rc"), "GISDBASE: C:/grassdata\n").unwrap();
        assert_eq!(env.get(GISDBASE), Some("C:/grassdata"));
    }

    #[test]
    fn test_parse_invalid_line() {
        let err = GisEnv::parse(Path::new("rc"), "GISDBASE: /data\nnot a key value\n").unwrap_err();
        match err {
            GrassError::InvalidGisrc { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_for_location_layout() {
        let env = GisEnv::for_location(Path::new("/data"), "temp_import_location_42", "PERMANENT");
        assert_eq!(
            env.to_string(),
            "MAPSET: PERMANENT\nGISDBASE: /data\nLOCATION_NAME: temp_import_location_42\nGUI: text\n"
        );
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rc");

        let mut env = GisEnv::for_location(Path::new("/data"), "loc", "PERMANENT");
        env.set(MAPSET, "user1");
        env.write(&path).unwrap();

        let read = GisEnv::read(&path).unwrap();
        assert_eq!(read, env);
        assert_eq!(read.mapset(), Some("user1"));
    }

    #[test]
    fn test_require_missing_key() {
        let env = GisEnv::default();
        assert!(matches!(
            env.require(MAPSET, Path::new("rc")),
            Err(GrassError::MissingKey { key: "MAPSET", .. })
        ));
    }
}
