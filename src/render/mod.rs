pub mod colormaps;
pub mod colors;
pub mod json;
pub mod png;
pub mod scene;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::HepError;
use crate::naming::NameCounter;
use scene::Scene;

/// Destination for finished scenes.
pub trait RenderSink: Send + Sync {
    /// Writes `scene` to `base.<ext>` for each supported extension and
    /// returns the paths written.
    fn save(
        &self,
        scene: &Scene,
        base: &Path,
        extensions: &BTreeSet<String>,
    ) -> Result<Vec<PathBuf>, HepError>;
}

fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Writes `json` scene dumps and `png` rasters.
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneWriter;

impl RenderSink for SceneWriter {
    fn save(
        &self,
        scene: &Scene,
        base: &Path,
        extensions: &BTreeSet<String>,
    ) -> Result<Vec<PathBuf>, HepError> {
        let mut written = Vec::new();
        for extension in extensions {
            let path = with_extension(base, extension);
            match extension.as_str() {
                "json" => json::write_scene(scene, &path)?,
                "png" => png::write_scene(scene, &path)?,
                other => {
                    log::warn!("No writer for .{other} files, skipping {}", path.display());
                    continue;
                }
            }
            written.push(path);
        }
        Ok(written)
    }
}

/// Keeps scenes in memory instead of writing them. Clones share storage.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    scenes: Arc<Mutex<Vec<(PathBuf, Scene)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenes(&self) -> Vec<(PathBuf, Scene)> {
        match self.scenes.lock() {
            Ok(scenes) => scenes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RenderSink for RecordingSink {
    fn save(
        &self,
        scene: &Scene,
        base: &Path,
        extensions: &BTreeSet<String>,
    ) -> Result<Vec<PathBuf>, HepError> {
        let paths: Vec<PathBuf> = extensions.iter().map(|e| with_extension(base, e)).collect();
        let mut scenes = match self.scenes.lock() {
            Ok(scenes) => scenes,
            Err(poisoned) => poisoned.into_inner(),
        };
        scenes.push((base.to_path_buf(), scene.clone()));
        Ok(paths)
    }
}

/// Everything a figure needs to print: where files go, how they are
/// written and the shared name counter.
pub struct RenderContext {
    pub names: NameCounter,
    pub output_dir: PathBuf,
    pub table_dir: PathBuf,
    sink: Box<dyn RenderSink>,
    create_dirs: bool,
}

impl RenderContext {
    pub fn new(output_dir: &Path) -> Self {
        RenderContext {
            names: NameCounter::new(),
            output_dir: output_dir.to_path_buf(),
            table_dir: PathBuf::from("tables"),
            sink: Box::new(SceneWriter),
            create_dirs: true,
        }
    }

    /// Context that hands scenes to `sink` and never touches the disk for
    /// plots.
    pub fn with_sink(output_dir: &Path, sink: Box<dyn RenderSink>) -> Self {
        RenderContext {
            sink,
            create_dirs: false,
            ..RenderContext::new(output_dir)
        }
    }

    pub fn table_dir(mut self, dir: &Path) -> Self {
        self.table_dir = dir.to_path_buf();
        self
    }

    pub fn sink(&self) -> &dyn RenderSink {
        self.sink.as_ref()
    }

    /// `output_dir/subdir/name`, creating directories as needed. Names may
    /// contain `/` to place files in further subdirectories.
    pub fn output_base(&self, subdir: &str, name: &str) -> Result<PathBuf, HepError> {
        let mut base = self.output_dir.clone();
        if !subdir.is_empty() {
            base.push(subdir);
        }
        base.push(name);
        self.ensure_parent(&base)?;
        Ok(base)
    }

    pub fn ensure_parent(&self, path: &Path) -> Result<(), HepError> {
        if self.create_dirs
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    pub fn save(
        &self,
        scene: &Scene,
        base: &Path,
        extensions: &BTreeSet<String>,
    ) -> Result<Vec<PathBuf>, HepError> {
        let written = self.sink.save(scene, base, extensions)?;
        for path in &written {
            log::info!("open {}", path.display());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_appended() {
        assert_eq!(
            with_extension(Path::new("plots/met__cut"), "png"),
            PathBuf::from("plots/met__cut.png")
        );
    }

    #[test]
    fn recording_sink_keeps_scenes() {
        let sink = RecordingSink::new();
        let ctx = RenderContext::with_sink(Path::new("plots"), Box::new(sink.clone()));
        let base = ctx.output_base("zg", "met").unwrap();
        assert_eq!(base, PathBuf::from("plots/zg/met"));
        let scene = Scene {
            name: "met".to_owned(),
            width: 10,
            height: 10,
            pads: Vec::new(),
            texts: Vec::new(),
        };
        let exts = BTreeSet::from(["png".to_owned(), "json".to_owned()]);
        let written = ctx.save(&scene, &base, &exts).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(sink.scenes().len(), 1);
    }
}
