//! Références de couches vecteur `nom@mapset`

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{GrassError, Result};

/// Noms légaux GRASS: pas de `.` initial, ni espace, ni caractère de contrôle
/// ou non ASCII, ni `/ \ " ' @ , = *`
fn legal_name() -> &'static Regex {
    static LEGAL: OnceLock<Regex> = OnceLock::new();
    LEGAL.get_or_init(|| {
        Regex::new(r#"^[!-~&&[^./\\"'@,=*]][!-~&&[^/\\"'@,=*]]*$"#).expect("valid regex")
    })
}

/// Couche vecteur identifiée par son nom et son mapset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRef {
    pub name: String,
    pub mapset: String,
}

impl LayerRef {
    /// Parse `nom` ou `nom@mapset`. Sans mapset explicite, `default_mapset` est utilisé.
    pub fn parse(reference: &str, default_mapset: &str) -> Result<Self> {
        let (name, mapset) = match reference.split_once('@') {
            Some((name, mapset)) => {
                if mapset.contains('@') {
                    return Err(GrassError::invalid_layer(reference, "more than one '@'"));
                }
                (name, mapset)
            }
            None => (reference, default_mapset),
        };

        check_name(reference, name, "map name")?;
        check_name(reference, mapset, "mapset")?;

        Ok(Self {
            name: name.to_string(),
            mapset: mapset.to_string(),
        })
    }
}

fn check_name(reference: &str, value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(GrassError::invalid_layer(reference, format!("empty {}", what)));
    }
    if !legal_name().is_match(value) {
        return Err(GrassError::invalid_layer(
            reference,
            format!("<{}> is not a legal {}", value, what),
        ));
    }
    Ok(())
}

impl fmt::Display for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.mapset)
    }
}
