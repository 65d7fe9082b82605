use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use css_sprite_core::{CollaboratorOp, Persistence, Result, SpriteError};
use tracing::info;

/// Writes `<folder>/<name>.css` and opens folders with the platform file manager.
pub struct FsPersistence {
    name: String,
    dry_run: bool,
    written: Vec<PathBuf>,
}

impl FsPersistence {
    pub fn new(name: impl Into<String>, dry_run: bool) -> Self {
        Self {
            name: name.into(),
            dry_run,
            written: Vec::new(),
        }
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Persistence for FsPersistence {
    fn save_text_file(&mut self, contents: &str, folder: &Path) -> Result<()> {
        let css_path = folder.join(format!("{}.css", self.name));
        if self.dry_run {
            info!(?css_path, bytes = contents.len(), "dry run: stylesheet not written");
            return Ok(());
        }
        fs::create_dir_all(folder)
            .and_then(|_| fs::write(&css_path, contents))
            .map_err(|e| {
                SpriteError::collaborator(
                    CollaboratorOp::SaveStylesheet,
                    format!("{}: {}", css_path.display(), e),
                )
            })?;
        info!(?css_path, "wrote stylesheet");
        self.written.push(css_path);
        Ok(())
    }

    fn open_folder(&mut self, path: &Path) -> Result<()> {
        let opener = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Command::new(opener)
            .arg(path)
            .spawn()
            .map_err(|e| SpriteError::collaborator(CollaboratorOp::OpenFolder, e))?;
        Ok(())
    }
}
