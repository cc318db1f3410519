//! Session GRASS: un toolkit et l'espace de travail actif
//!
//! L'espace de travail actif est une valeur explicite, jamais la variable `GISRC`
//! du processus. [`Session::switch_to`] active un autre espace de travail pour la
//! durée de vie du [`WorkspaceGuard`] retourné; le précédent est restauré au drop,
//! y compris lors d'un retour anticipé par `?`.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::error::Result;
use crate::module::{ModuleCall, ModuleOutput, Toolkit};
use crate::workspace::Workspace;

pub struct Session<T> {
    toolkit: T,
    active: Workspace,
}

impl<T: Toolkit> Session<T> {
    pub fn new(toolkit: T, workspace: Workspace) -> Self {
        Self {
            toolkit,
            active: workspace,
        }
    }

    /// Espace de travail actif
    pub fn active(&self) -> &Workspace {
        &self.active
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    /// Exécute un module dans l'espace de travail actif
    pub async fn run(&self, call: &ModuleCall) -> Result<ModuleOutput> {
        self.toolkit.run(call, self.active.gisrc()).await
    }

    /// Active `workspace` jusqu'au drop du guard
    pub fn switch_to(&mut self, workspace: Workspace) -> WorkspaceGuard<'_, T> {
        debug!(from = %self.active, to = %workspace, "Switching workspace");
        let previous = std::mem::replace(&mut self.active, workspace);
        WorkspaceGuard {
            session: self,
            previous: Some(previous),
        }
    }
}

/// Espace de travail temporairement actif
pub struct WorkspaceGuard<'a, T: Toolkit> {
    session: &'a mut Session<T>,
    previous: Option<Workspace>,
}

impl<T: Toolkit> WorkspaceGuard<'_, T> {
    /// Espace de travail qui sera restauré
    pub fn previous(&self) -> Option<&Workspace> {
        self.previous.as_ref()
    }
}

impl<T: Toolkit> Deref for WorkspaceGuard<'_, T> {
    type Target = Session<T>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<T: Toolkit> DerefMut for WorkspaceGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<T: Toolkit> Drop for WorkspaceGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            debug!(to = %previous, "Restoring workspace");
            self.session.active = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingToolkit;
    use std::path::Path;

    fn workspace(dir: &Path, name: &str, location: &str) -> Workspace {
        let rc = dir.join(name);
        std::fs::write(
            &rc,
            format!("GISDBASE: /data\nLOCATION_NAME: {}\nMAPSET: PERMANENT\n", location),
        )
        .unwrap();
        Workspace::from_gisrc(&rc).unwrap()
    }

    #[tokio::test]
    async fn test_commands_use_active_gisrc() {
        let dir = tempfile::tempdir().unwrap();
        let source = workspace(dir.path(), "rc_source", "nc_spm");
        let scratch = workspace(dir.path(), "rc_scratch", "tmp");

        let mut session = Session::new(RecordingToolkit::default(), source.clone());
        session.run(&ModuleCall::new("g.region")).await.unwrap();
        {
            let guard = session.switch_to(scratch.clone());
            assert_eq!(guard.active(), &scratch);
            assert_eq!(guard.previous(), Some(&source));
            guard.run(&ModuleCall::new("v.proj")).await.unwrap();
        }
        assert_eq!(session.active(), &source);

        let calls = session.toolkit().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, source.gisrc());
        assert_eq!(calls[1].1, scratch.gisrc());
    }

    #[tokio::test]
    async fn test_restore_on_early_return() {
        let dir = tempfile::tempdir().unwrap();
        let source = workspace(dir.path(), "rc_source", "nc_spm");
        let scratch = workspace(dir.path(), "rc_scratch", "tmp");

        let toolkit = RecordingToolkit::default().fail_on("v.proj", "ERROR: Vector map <x> not found");
        let mut session = Session::new(toolkit, source.clone());

        async fn step(session: &mut Session<RecordingToolkit>, ws: Workspace) -> Result<()> {
            let guard = session.switch_to(ws);
            guard.run(&ModuleCall::new("v.proj")).await?;
            Ok(())
        }

        assert!(step(&mut session, scratch).await.is_err());
        assert_eq!(session.active(), &source);
    }
}
