//! Relecture du GeoJSON produit par `v.out.ogr`

use std::path::{Path, PathBuf};

use geojson::GeoJson;
use serde_json::Value;
use thiserror::Error;

/// Erreurs de relecture du document exporté
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Invalid GeoJSON in {}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<DocumentError>,
    },
}

pub type Result<T> = std::result::Result<T, DocumentError>;

/// Décimales conservées sur les coordonnées des géométries
pub const COORDINATE_PRECISION: usize = 6;

/// Document GeoJSON relu depuis un fichier
#[derive(Debug, Clone)]
pub struct Document {
    /// Valeurs telles qu'écrites, coordonnées arrondies à [`COORDINATE_PRECISION`]
    /// décimales (entiers conservés, membres étrangers inclus)
    pub value: Value,
    /// Nombre de features (0 pour une géométrie seule)
    pub features: usize,
}

impl Document {
    /// Lit et valide un fichier GeoJSON
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| DocumentError::InFile {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(content)?;
        let features = match GeoJson::from_json_value(value.clone())? {
            GeoJson::FeatureCollection(fc) => fc.features.len(),
            GeoJson::Feature(_) => 1,
            GeoJson::Geometry(_) => 0,
        };
        round_document(&mut value, COORDINATE_PRECISION);
        Ok(Self { value, features })
    }
}

/// Arrondit les coordonnées des géométries du document, et seulement elles:
/// `bbox`, propriétés et membres étrangers sont laissés tels quels
fn round_document(value: &mut Value, precision: usize) {
    let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
    match kind.as_deref() {
        Some("FeatureCollection") => {
            if let Some(Value::Array(features)) = value.get_mut("features") {
                for feature in features {
                    round_document(feature, precision);
                }
            }
        }
        Some("Feature") => {
            if let Some(geometry) = value.get_mut("geometry") {
                round_geometry(geometry, precision);
            }
        }
        _ => round_geometry(value, precision),
    }
}

fn round_geometry(geometry: &mut Value, precision: usize) {
    if let Some(Value::Array(geometries)) = geometry.get_mut("geometries") {
        for child in geometries {
            round_geometry(child, precision);
        }
    }
    if let Some(coordinates) = geometry.get_mut("coordinates") {
        round_numbers(coordinates, precision);
    }
}

fn round_numbers(value: &mut Value, precision: usize) {
    match value {
        Value::Array(items) => {
            for item in items {
                round_numbers(item, precision);
            }
        }
        Value::Number(n) if n.is_f64() => {
            let rounded = n
                .as_f64()
                .map(|f| round_to(f, precision))
                .and_then(serde_json::Number::from_f64);
            if let Some(rounded) = rounded {
                *n = rounded;
            }
        }
        _ => {}
    }
}

/// Arrondi décimal exact (moitié au pair sur la valeur binaire), relu en f64
fn round_to(value: f64, precision: usize) -> f64 {
    format!("{:.*}", precision, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::render::render;

    #[test]
    fn test_parse_feature_collection() {
        let doc = Document::parse(
            r#"{"type":"FeatureCollection","name":"roads","features":[
                {"type":"Feature","properties":{"cat":1},"geometry":{"type":"Point","coordinates":[1,2]}},
                {"type":"Feature","properties":{"cat":2},"geometry":null}
            ]}"#,
        )
        .unwrap();

        assert_eq!(doc.features, 2);
        // Les coordonnées entières ne sont pas converties en flottants
        assert_eq!(doc.value["features"][0]["geometry"]["coordinates"][0], 1);
        assert!(doc.value["features"][0]["geometry"]["coordinates"][0].is_u64());
        assert_eq!(doc.value["name"], "roads");
    }

    #[test]
    fn test_coordinates_rounded_to_six_decimals() {
        let doc = Document::parse(
            r#"{"type":"Point","coordinates":[630772.654321987,230497.3212345678]}"#,
        )
        .unwrap();
        assert_eq!(
            render(&doc.value),
            r#"{"coordinates": [630772.654322, 230497.321235], "type": "Point"}"#
        );
    }

    #[test]
    fn test_rounding_only_touches_geometry_coordinates() {
        let doc = Document::parse(
            r#"{"type":"FeatureCollection","bbox":[0.1234567891,0,1,1],"features":[
                {"type":"Feature","properties":{"area":0.1234567891,"coordinates":[0.1234567891]},
                 "geometry":{"type":"GeometryCollection","geometries":[
                    {"type":"Point","coordinates":[12,-0.0000001]},
                    {"type":"LineString","coordinates":[[1.0000004,2.5],[3.1234567,4]]}
                 ]}},
                {"type":"Feature","properties":{},"geometry":null}
            ]}"#,
        )
        .unwrap();

        let features = &doc.value["features"];
        let geometries = &features[0]["geometry"]["geometries"];
        assert_eq!(render(&geometries[0]["coordinates"]), "[12, -0.0]");
        assert_eq!(render(&geometries[1]["coordinates"]), "[[1.0, 2.5], [3.123457, 4]]");
        assert_eq!(render(&features[0]["properties"]), r#"{"area": 0.1234567891, "coordinates": [0.1234567891]}"#);
        assert_eq!(render(&doc.value["bbox"]), "[0.1234567891, 0, 1, 1]");
        assert!(features[1]["geometry"].is_null());
    }

    #[test]
    fn test_parse_geometry() {
        let doc = Document::parse(r#"{"type":"Point","coordinates":[1.5,2.5]}"#).unwrap();
        assert_eq!(doc.features, 0);
    }

    #[test]
    fn test_parse_rejects_non_geojson() {
        assert!(matches!(
            Document::parse(r#"{"hello":"world"}"#),
            Err(DocumentError::GeoJson(_))
        ));
        assert!(matches!(Document::parse("not json"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn test_read_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        std::fs::write(&path, "{").unwrap();

        let err = Document::read(&path).unwrap_err();
        assert!(matches!(err, DocumentError::InFile { .. }));
        assert!(err.to_string().contains("broken.geojson"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = Document::read(Path::new("/nonexistent/out.geojson")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/out.geojson"));
    }
}
