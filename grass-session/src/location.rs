//! Location temporaire projetée dans un EPSG donné
//!
//! [`ScratchLocation`] possède la location `temp_import_location_<pid>` et son
//! fichier GISRC privé. Les deux sont supprimés au drop, quel que soit le chemin
//! de sortie.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::{GrassError, Result};
use crate::gisenv::GisEnv;
use crate::module::{ModuleCall, Toolkit};
use crate::session::Session;
use crate::workspace::Workspace;

pub const SCRATCH_PREFIX: &str = "temp_import_location_";
pub const SCRATCH_MAPSET: &str = "PERMANENT";

/// Location temporaire, détruite au drop
#[derive(Debug)]
pub struct ScratchLocation {
    workspace: Workspace,
    location_path: PathBuf,
    gisrc: Option<TempPath>,
    epsg: u32,
}

impl ScratchLocation {
    /// Nom de la location temporaire pour un processus
    pub fn name_for(pid: u32) -> String {
        format!("{}{}", SCRATCH_PREFIX, pid)
    }

    /// Crée la location dans la base de l'espace de travail actif de `session`.
    ///
    /// Échoue sans rien créer si la location existe déjà. Si `g.proj` refuse le
    /// code EPSG, l'erreur du module est retournée telle quelle.
    pub async fn create<T: Toolkit>(session: &Session<T>, epsg: u32) -> Result<Self> {
        let source = session.active();
        let name = Self::name_for(std::process::id());
        let location_path = source.gisdbase().join(&name);

        if location_path.exists() {
            return Err(GrassError::LocationExists(name));
        }

        let gisrc = tempfile::Builder::new()
            .prefix("gisrc_")
            .tempfile()?
            .into_temp_path();
        let env = GisEnv::for_location(source.gisdbase(), &name, SCRATCH_MAPSET);
        env.write(&gisrc)?;
        let workspace = Workspace::from_env(&gisrc, &env)?;

        // Le guard existe avant g.proj -c: une création partielle est nettoyée
        let scratch = Self {
            workspace,
            location_path,
            gisrc: Some(gisrc),
            epsg,
        };

        let (key, value) = crs_option(session, epsg).await?;
        debug!("Creating temporary location with EPSG:{}...", epsg);
        session
            .run(
                &ModuleCall::new("g.proj")
                    .flag('c')
                    .option("location", &name)
                    .option(key, value)
                    .quiet(),
            )
            .await?;

        Ok(scratch)
    }

    /// Vérifie que la location rapporte bien l'EPSG demandé.
    /// `session` doit avoir cette location pour espace de travail actif.
    pub async fn verify<T: Toolkit>(&self, session: &Session<T>) -> Result<()> {
        let proj = session
            .run(&ModuleCall::new("g.proj").flag('g'))
            .await?
            .key_values();

        let found = reported_epsg(&proj);
        if found.as_deref() != Some(self.epsg.to_string().as_str()) {
            return Err(GrassError::LocationVerification {
                expected: self.epsg,
                found,
            });
        }
        Ok(())
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn name(&self) -> &str {
        self.workspace.location()
    }

    pub fn path(&self) -> &Path {
        &self.location_path
    }
}

impl Drop for ScratchLocation {
    fn drop(&mut self) {
        debug!(location = %self.location_path.display(), "Cleaning up...");

        match std::fs::remove_dir_all(&self.location_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove temporary location {}: {}",
                self.location_path.display(),
                e
            ),
        }

        if let Some(gisrc) = self.gisrc.take() {
            if let Err(e) = gisrc.close() {
                warn!("Failed to remove temporary GISRC: {}", e);
            }
        }
    }
}

/// Option CRS de `g.proj -c`: les versions qui affichent `epsg` dans `g.proj -g`
/// acceptent `epsg=`, les autres `srid=EPSG:`
async fn crs_option<T: Toolkit>(session: &Session<T>, epsg: u32) -> Result<(&'static str, String)> {
    let probe = session
        .run(&ModuleCall::new("g.proj").flag('g'))
        .await?
        .key_values();

    if probe.contains_key("epsg") {
        Ok(("epsg", epsg.to_string()))
    } else {
        Ok(("srid", format!("EPSG:{}", epsg)))
    }
}

/// Code EPSG rapporté par `g.proj -g`
pub fn reported_epsg(proj: &BTreeMap<String, String>) -> Option<String> {
    if let Some(epsg) = proj.get("epsg") {
        return Some(epsg.clone());
    }
    proj.get("srid")
        .and_then(|srid| srid.split_once("EPSG:"))
        .map(|(_, code)| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleOutput;
    use crate::testing::{stdout, RecordingToolkit};

    const KNOWN_CODES: [&str; 3] = ["4326", "3358", "3857"];

    /// Simule `g.proj` sur une base sur disque: `-c` crée la location et mémorise
    /// l'EPSG, `-g` le relit depuis la location du GISRC
    fn fake_g_proj(gisdbase: PathBuf, key: &'static str) -> RecordingToolkit {
        RecordingToolkit::with_handler(move |call, gisrc| {
            if call.name != "g.proj" {
                return Ok(ModuleOutput::default());
            }
            if call.has_flag('c') {
                let code = call
                    .get("epsg")
                    .map(str::to_string)
                    .or_else(|| call.get("srid").map(|s| s.trim_start_matches("EPSG:").to_string()))
                    .unwrap_or_default();
                if !KNOWN_CODES.contains(&code.as_str()) {
                    return Err(GrassError::ModuleFailed {
                        module: "g.proj".into(),
                        code: Some(1),
                        stderr: format!(
                            "ERROR: EPSG PCS/GCS code {} not found in EPSG support files.  Is this a valid EPSG coordinate system?",
                            code
                        ),
                    });
                }
                let mapset = gisdbase.join(call.get("location").unwrap()).join("PERMANENT");
                std::fs::create_dir_all(&mapset).unwrap();
                std::fs::write(mapset.join("PROJ_EPSG"), &code).unwrap();
                return Ok(ModuleOutput::default());
            }
            let ws = Workspace::from_gisrc(gisrc)?;
            let code = std::fs::read_to_string(ws.location_path().join("PERMANENT").join("PROJ_EPSG"))
                .unwrap_or_else(|_| "3358".into());
            Ok(match key {
                "epsg" => stdout(&format!("name=test\nepsg={}\n", code)),
                _ => stdout(&format!("name=test\nsrid=EPSG:{}\n", code)),
            })
        })
    }

    fn source(dir: &Path) -> Workspace {
        let gisdbase = dir.join("grassdata");
        std::fs::create_dir_all(gisdbase.join("nc_spm").join("PERMANENT")).unwrap();
        let rc = dir.join("rc");
        GisEnv::for_location(&gisdbase, "nc_spm", "PERMANENT").write(&rc).unwrap();
        Workspace::from_gisrc(&rc).unwrap()
    }

    #[tokio::test]
    async fn test_create_verify_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(dir.path());
        let mut session = Session::new(
            fake_g_proj(source.gisdbase().to_path_buf(), "srid"),
            source.clone(),
        );

        let scratch = ScratchLocation::create(&session, 4326).await.unwrap();
        let location = scratch.path().to_path_buf();
        let gisrc = scratch.workspace().gisrc().to_path_buf();

        assert_eq!(scratch.name(), ScratchLocation::name_for(std::process::id()));
        assert_eq!(scratch.workspace().mapset(), "PERMANENT");
        assert_eq!(scratch.workspace().gisdbase(), source.gisdbase());
        assert!(location.is_dir());
        assert!(gisrc.is_file());

        {
            let guard = session.switch_to(scratch.workspace().clone());
            scratch.verify(&guard).await.unwrap();
        }

        let calls = session.toolkit().calls();
        let create = &calls[1].0;
        assert_eq!(create.get("srid"), Some("EPSG:4326"));
        assert_eq!(calls[1].1, source.gisrc());
        assert_eq!(calls[2].1, gisrc);

        drop(scratch);
        assert!(!location.exists());
        assert!(!gisrc.exists());
        assert!(source.location_path().is_dir());
    }

    #[tokio::test]
    async fn test_create_uses_epsg_key_when_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(dir.path());
        let session = Session::new(
            fake_g_proj(source.gisdbase().to_path_buf(), "epsg"),
            source.clone(),
        );

        let _scratch = ScratchLocation::create(&session, 3358).await.unwrap();
        let calls = session.toolkit().calls();
        assert_eq!(calls[1].0.get("epsg"), Some("3358"));
        assert_eq!(calls[1].0.get("srid"), None);
    }

    #[tokio::test]
    async fn test_create_unknown_epsg() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(dir.path());
        let session = Session::new(
            fake_g_proj(source.gisdbase().to_path_buf(), "srid"),
            source.clone(),
        );

        let err = ScratchLocation::create(&session, 335888).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("EPSG PCS/GCS code 335888 not found in EPSG support files."));

        let name = ScratchLocation::name_for(std::process::id());
        assert!(!source.gisdbase().join(name).exists());
    }

    #[tokio::test]
    async fn test_create_refuses_existing_location() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(dir.path());
        let existing = source
            .gisdbase()
            .join(ScratchLocation::name_for(std::process::id()));
        std::fs::create_dir_all(&existing).unwrap();

        let session = Session::new(RecordingToolkit::default(), source.clone());
        let err = ScratchLocation::create(&session, 4326).await.unwrap_err();

        assert!(matches!(err, GrassError::LocationExists(_)));
        assert!(existing.is_dir());
        assert!(session.toolkit().calls().is_empty());
    }

    #[tokio::test]
    async fn test_verify_detects_wrong_epsg() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(dir.path());
        let toolkit = RecordingToolkit::with_handler(|call, _| {
            if call.has_flag('g') {
                Ok(stdout("srid=EPSG:3857\n"))
            } else {
                Ok(ModuleOutput::default())
            }
        });
        let mut session = Session::new(toolkit, source);

        let scratch = ScratchLocation::create(&session, 4326).await.unwrap();
        let guard = session.switch_to(scratch.workspace().clone());
        let err = scratch.verify(&guard).await.unwrap_err();

        match err {
            GrassError::LocationVerification { expected, found } => {
                assert_eq!(expected, 4326);
                assert_eq!(found.as_deref(), Some("3857"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reported_epsg() {
        let mut proj = BTreeMap::new();
        proj.insert("srid".to_string(), "EPSG:3358".to_string());
        assert_eq!(reported_epsg(&proj).as_deref(), Some("3358"));

        proj.insert("epsg".to_string(), "4326".to_string());
        assert_eq!(reported_epsg(&proj).as_deref(), Some("4326"));

        assert_eq!(reported_epsg(&BTreeMap::new()), None);
    }
}
