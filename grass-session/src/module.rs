//! Appels aux modules du toolkit GRASS (`g.proj`, `v.proj`, `v.out.ogr`...)
//!
//! Le trait [`Toolkit`] est le point d'extension: [`ProcessToolkit`] lance de vrais
//! processus, les tests utilisent des implémentations en mémoire.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{GrassError, Result};

/// Appel d'un module: `nom -flags cle=valeur ... [--quiet]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCall {
    pub name: String,
    pub flags: String,
    pub options: Vec<(String, String)>,
    pub quiet: bool,
}

impl ModuleCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: String::new(),
            options: Vec::new(),
            quiet: false,
        }
    }

    pub fn flag(mut self, flag: char) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.options.push((key.into(), value.to_string()));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Valeur d'une option (utile pour les toolkits de test)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(flag)
    }

    /// Arguments de la ligne de commande
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() + 2);
        if !self.flags.is_empty() {
            args.push(format!("-{}", self.flags));
        }
        for (key, value) in &self.options {
            args.push(format!("{}={}", key, value));
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args
    }
}

impl fmt::Display for ModuleCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in self.args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Sortie d'un module terminé avec succès
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ModuleOutput {
    /// Sortie `cle=valeur` (équivalent de `parse_command`)
    pub fn key_values(&self) -> BTreeMap<String, String> {
        parse_key_val(&self.stdout)
    }
}

/// Parse une sortie `cle=valeur`, une paire par ligne. Les lignes sans `=` sont des
/// clés sans valeur.
pub fn parse_key_val(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}

/// Exécute des modules GRASS dans l'espace de travail désigné par `gisrc`
#[async_trait]
pub trait Toolkit: Send + Sync {
    async fn run(&self, call: &ModuleCall, gisrc: &Path) -> Result<ModuleOutput>;
}

/// Réglages d'environnement appliqués à chaque module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitSettings {
    /// `GRASS_COMPRESS_NULLS`
    pub compress_nulls: bool,
    /// `GRASS_COMPRESSOR`
    pub compressor: String,
    /// `GRASS_MESSAGE_FORMAT`
    pub message_format: String,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            compress_nulls: true,
            compressor: "LZ4".into(),
            message_format: "plain".into(),
        }
    }
}

impl ToolkitSettings {
    pub fn env_vars(&self) -> [(&'static str, String); 3] {
        [
            (
                "GRASS_COMPRESS_NULLS",
                if self.compress_nulls { "1" } else { "0" }.to_string(),
            ),
            ("GRASS_COMPRESSOR", self.compressor.clone()),
            ("GRASS_MESSAGE_FORMAT", self.message_format.clone()),
        ]
    }
}

/// Lance les modules comme processus enfants
#[derive(Debug, Clone, Default)]
pub struct ProcessToolkit {
    gisbase: Option<PathBuf>,
    settings: ToolkitSettings,
}

impl ProcessToolkit {
    pub fn new(gisbase: Option<PathBuf>, settings: ToolkitSettings) -> Self {
        Self { gisbase, settings }
    }

    /// Exécutable d'un module: `$GISBASE/bin`, puis `$GISBASE/scripts`, sinon le PATH
    pub fn resolve(&self, module: &str) -> PathBuf {
        if let Some(base) = &self.gisbase {
            for dir in ["bin", "scripts"] {
                let candidate = base.join(dir).join(module);
                if candidate.is_file() {
                    return candidate;
                }
            }
        }
        PathBuf::from(module)
    }
}

#[async_trait]
impl Toolkit for ProcessToolkit {
    async fn run(&self, call: &ModuleCall, gisrc: &Path) -> Result<ModuleOutput> {
        let program = self.resolve(&call.name);
        debug!(module = %call, gisrc = %gisrc.display(), "Running module");

        let mut command = Command::new(&program);
        command
            .args(call.args())
            .env("GISRC", gisrc)
            .envs(self.settings.env_vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = command.output().await.map_err(|source| GrassError::Spawn {
            module: call.name.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(GrassError::module_failed(
                &call.name,
                output.status,
                &output.stderr,
            ));
        }

        let result = ModuleOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.stderr.trim().is_empty() {
            debug!(module = %call.name, stderr = %result.stderr.trim(), "Module messages");
        }
        trace!(module = %call.name, stdout = %result.stdout, "Module output");

        Ok(result)
    }
}
