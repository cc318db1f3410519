//! Toolkit en mémoire pour les tests
//!
//! Disponible avec `cfg(test)` ou la feature `testing`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GrassError, Result};
use crate::module::{ModuleCall, ModuleOutput, Toolkit};

type Handler = Box<dyn Fn(&ModuleCall, &Path) -> Result<ModuleOutput> + Send + Sync>;

/// Enregistre chaque appel et délègue la réponse à un handler
pub struct RecordingToolkit {
    calls: Mutex<Vec<(ModuleCall, PathBuf)>>,
    failures: Vec<(String, String)>,
    handler: Handler,
}

impl Default for RecordingToolkit {
    fn default() -> Self {
        Self::with_handler(|_, _| Ok(ModuleOutput::default()))
    }
}

impl RecordingToolkit {
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&ModuleCall, &Path) -> Result<ModuleOutput> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// Fait échouer `module` (code 1) avec `stderr`
    pub fn fail_on(mut self, module: &str, stderr: &str) -> Self {
        self.failures.push((module.to_string(), stderr.to_string()));
        self
    }

    /// Appels reçus, dans l'ordre, avec le GISRC utilisé
    pub fn calls(&self) -> Vec<(ModuleCall, PathBuf)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Noms des modules appelés, dans l'ordre
    pub fn modules(&self) -> Vec<String> {
        self.calls().into_iter().map(|(call, _)| call.name).collect()
    }
}

/// Sortie d'un module qui ne produit que `stdout`
pub fn stdout(text: &str) -> ModuleOutput {
    ModuleOutput {
        stdout: text.to_string(),
        stderr: String::new(),
    }
}

#[async_trait]
impl Toolkit for RecordingToolkit {
    async fn run(&self, call: &ModuleCall, gisrc: &Path) -> Result<ModuleOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((call.clone(), gisrc.to_path_buf()));
        }

        if let Some((module, stderr)) = self.failures.iter().find(|(m, _)| *m == call.name) {
            return Err(GrassError::ModuleFailed {
                module: module.clone(),
                code: Some(1),
                stderr: stderr.clone(),
            });
        }

        (self.handler)(call, gisrc)
    }
}
