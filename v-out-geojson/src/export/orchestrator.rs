//! Enchaînement de l'export
//!
//! 1. relever l'espace de travail courant
//! 2. créer une location temporaire dans l'EPSG cible
//! 3. l'activer (et vérifier son EPSG)
//! 4. `v.proj` de la couche vers cette location
//! 5. `v.out.ogr format=GeoJSON`
//! 6. afficher le document ou indiquer le fichier produit
//! 7. restaurer l'espace de travail d'origine
//!
//! Chaque ressource temporaire est un guard: fichier de sortie temporaire,
//! espace de travail actif, location et GISRC temporaires sont libérés dans cet
//! ordre sur tous les chemins de sortie.

use std::io::Write;

use anyhow::{Context, Result};
use grass_session::{LayerRef, ModuleCall, ScratchLocation, Session, Toolkit, Workspace};
use tracing::{debug, info};

use crate::export::document::Document;
use crate::export::output::{Destination, OutputFile};
use crate::export::render::render;
use crate::report::{file_digest, ExportReport, ExportStage};

/// Paramètres d'un export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Couche source, `nom` ou `nom@mapset`
    pub input: String,
    pub destination: Destination,
    /// EPSG cible
    pub epsg: u32,
}

/// Exporte la couche demandée. En mode stdout, le document est écrit dans `stdout`.
///
/// En cas d'erreur, l'étape atteinte est ajoutée au contexte de l'erreur.
pub async fn run_export<T, W>(
    session: &mut Session<T>,
    request: &ExportRequest,
    stdout: &mut W,
) -> Result<ExportReport>
where
    T: Toolkit,
    W: Write,
{
    let mut report = ExportReport::new(request);
    debug!("Export input as GeoJSON...");

    let source = session.active().clone();
    let layer = LayerRef::parse(&request.input, source.mapset())?;

    let result = export_steps(session, request, &source, &layer, stdout, &mut report).await;
    match result {
        Ok(()) => Ok(report),
        Err(e) => Err(e.context(format!(
            "Export of <{}> to EPSG:{} failed (last stage: {})",
            request.input, request.epsg, report.stage
        ))),
    }
}

async fn export_steps<T, W>(
    session: &mut Session<T>,
    request: &ExportRequest,
    source: &Workspace,
    layer: &LayerRef,
    stdout: &mut W,
    report: &mut ExportReport,
) -> Result<()>
where
    T: Toolkit,
    W: Write,
{
    let scratch = ScratchLocation::create(session, request.epsg).await?;
    report.advance(ExportStage::TempWorkspaceCreated);

    {
        let target = session.switch_to(scratch.workspace().clone());
        report.advance(ExportStage::WorkspaceSwitched);
        scratch.verify(&target).await?;

        target
            .run(
                &ModuleCall::new("v.proj")
                    .option("location", source.location())
                    .option("mapset", &layer.mapset)
                    .option("input", &layer.name)
                    .option("output", &layer.name)
                    .quiet(),
            )
            .await?;
        report.advance(ExportStage::LayerReprojected);

        let output = OutputFile::for_destination(&request.destination)?;
        target
            .run(
                &ModuleCall::new("v.out.ogr")
                    .option("input", &layer.name)
                    .option("output", output.path().display())
                    .option("format", "GeoJSON"),
            )
            .await?;
        report.advance(ExportStage::Exported);
        report.digest = Some(file_digest(output.path())?);

        match &request.destination {
            Destination::Stdout => {
                let document = Document::read(output.path())?;
                report.features = Some(document.features);

                info!(
                    "GeoJSON of <{}> in EPSG:<{}> is:",
                    request.input, request.epsg
                );
                writeln!(stdout, "{}", render(&document.value))
                    .and_then(|_| stdout.flush())
                    .context("Failed to write GeoJSON to stdout")?;
                report.advance(ExportStage::Printed);
            }
            Destination::File(path) => {
                info!(
                    "GeoJSON of <{}> in EPSG:<{}> is saved in <{}>",
                    request.input,
                    request.epsg,
                    path.display()
                );
                report.advance(ExportStage::Saved);
            }
        }
    }
    report.advance(ExportStage::Restored);

    drop(scratch);
    report.advance(ExportStage::Done);
    Ok(())
}
