//! # grass-session
//!
//! Primitives pour piloter une session GRASS GIS depuis Rust.
//!
//! ## Features
//!
//! - Lecture/écriture des fichiers GISRC
//! - Références d'espaces de travail et de couches `nom@mapset`
//! - Appels aux modules du toolkit via le trait [`Toolkit`]
//! - Session avec changement d'espace de travail à portée limitée
//! - Location temporaire projetée, supprimée au drop
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use grass_session::{ProcessToolkit, ScratchLocation, Session, Workspace};
//!
//! let workspace = Workspace::from_gisrc(Path::new(&std::env::var("GISRC")?))?;
//! let mut session = Session::new(ProcessToolkit::default(), workspace);
//! let scratch = ScratchLocation::create(&session, 4326).await?;
//! {
//!     let target = session.switch_to(scratch.workspace().clone());
//!     scratch.verify(&target).await?;
//! }
//! // location et GISRC temporaires supprimés ici
//! drop(scratch);
//! ```

pub mod error;
pub mod gisenv;
pub mod layer;
pub mod location;
pub mod module;
pub mod session;
pub mod workspace;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::GrassError;
pub use gisenv::GisEnv;
pub use layer::LayerRef;
pub use location::ScratchLocation;
pub use module::{parse_key_val, ModuleCall, ModuleOutput, ProcessToolkit, Toolkit, ToolkitSettings};
pub use session::{Session, WorkspaceGuard};
pub use workspace::Workspace;
