use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use winit::event::WindowEvent;

use crate::resource::{Resource, ResourceMap};

#[derive(Debug)]
pub enum DropEvent {
    /// Files are being dragged over the window or have started arriving.
    DropStart,
    Drop(ResourceMap),
    DropError(String),
}

/// Collects the files of one drag-and-drop gesture.
///
/// winit reports every dropped path as a separate event, so paths are
/// buffered until [`DropSurface::flush`] is called once the event batch is done.
#[derive(Default)]
pub struct DropSurface {
    hovering: bool,
    dropped: Vec<PathBuf>,
}

impl DropSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<DropEvent> {
        match event {
            WindowEvent::HoveredFile(_) => self.start(),
            WindowEvent::HoveredFileCancelled => self.cancel(),
            WindowEvent::DroppedFile(path) => {
                let event = self.start();
                self.dropped.push(path.clone());
                event
            }
            _ => None,
        }
    }

    fn start(&mut self) -> Option<DropEvent> {
        if self.hovering || !self.dropped.is_empty() {
            return None;
        }

        self.hovering = true;
        Some(DropEvent::DropStart)
    }

    /// Ends a started gesture that never delivered any file.
    fn cancel(&mut self) -> Option<DropEvent> {
        if !self.hovering || !self.dropped.is_empty() {
            return None;
        }

        self.hovering = false;
        Some(DropEvent::DropError(String::from("Drop cancelled")))
    }

    pub fn is_pending(&self) -> bool {
        !self.dropped.is_empty()
    }

    pub fn flush(&mut self) -> Option<DropEvent> {
        if self.dropped.is_empty() {
            return None;
        }

        self.hovering = false;
        let paths = std::mem::take(&mut self.dropped);

        match collect_files(&paths) {
            Ok(resources) => Some(DropEvent::Drop(resources)),
            Err(error) => {
                log::error!("{error:?}");
                Some(DropEvent::DropError(format!("{error:#}")))
            }
        }
    }
}

/// Reads dropped paths into a resource map.
///
/// Plain files are keyed by their file name. Directories are walked and their
/// files keyed as `/<directory>/<relative path>`.
pub fn collect_files(paths: &[PathBuf]) -> Result<ResourceMap> {
    let mut entries = vec![];

    for path in paths {
        if path.is_dir() {
            let directory = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            walk_directory(path, &format!("/{directory}/"), &mut entries)?;
        } else {
            let key = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("{} has no file name", path.display()))?;
            entries.push((key, read_file(path)?));
        }
    }

    log::debug!("Collected {} dropped files", entries.len());

    Ok(entries
        .into_iter()
        .map(|(key, data)| {
            let resource = Resource::from_path_bytes(&key, data);
            (key, resource)
        })
        .collect())
}

fn walk_directory(directory: &Path, prefix: &str, entries: &mut Vec<(String, Vec<u8>)>) -> Result<()> {
    let read_dir = std::fs::read_dir(directory)
        .with_context(|| format!("Unable to read directory {}", directory.display()))?;

    for entry in read_dir {
        let path = entry?.path();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if path.is_dir() {
            walk_directory(&path, &format!("{prefix}{name}/"), entries)?;
        } else {
            entries.push((format!("{prefix}{name}"), read_file(&path)?));
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Unable to read {}", path.display()))
}
