use std::path::PathBuf;

use clap::Parser;

use gltf_dropview::args::Args;
use gltf_dropview::options::{parse_camera_position, AppOptions};

/// A drag-and-drop viewer for the glTF 3D asset format
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to load at startup, as if dropped on the window
    pub files: Vec<PathBuf>,

    /// Options in location fragment form, e.g. "#model=scene.gltf&kiosk=1"
    #[arg(short, long)]
    pub fragment: Option<String>,

    /// Hide window decorations and skip validation
    #[arg(short, long)]
    pub kiosk: bool,

    /// URL or path of a .gltf or .glb asset to load at startup
    #[arg(short, long)]
    pub model: Option<String>,

    /// Name of the environment preset handed to the renderer
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Initial camera position as "x,y,z"
    #[arg(short, long, allow_hyphen_values = true)]
    pub camera_position: Option<String>,

    /// Directory or http(s) URL that relative URLs are resolved against
    #[arg(short, long)]
    pub asset_root: Option<String>,

    /// JSON manifest of asset sets to fetch and view before anything else
    #[arg(long)]
    pub preload: Option<PathBuf>,

    /// JSON table of per-asset placements
    #[arg(long)]
    pub placements: Option<PathBuf>,

    /// Directory that validation reports are written to
    #[arg(short, long)]
    pub report_dir: Option<PathBuf>,

    /// Run the startup loads without opening a window
    #[arg(long)]
    pub headless: bool,
}

impl Cli {
    /// Fragment options first, then the dedicated flags on top.
    pub fn options(&self) -> AppOptions {
        let mut options = match &self.fragment {
            Some(fragment) => AppOptions::from_fragment(fragment),
            None => AppOptions::default(),
        };

        if self.kiosk {
            options.kiosk = true;
        }

        if let Some(model) = &self.model {
            options.model = Some(model.clone());
        }

        if let Some(preset) = &self.preset {
            options.preset = preset.clone();
        }

        if let Some(camera_position) = &self.camera_position {
            options.camera_position = parse_camera_position(camera_position);
        }

        options
    }
}

impl From<Cli> for Args {
    fn from(value: Cli) -> Self {
        Args {
            options: value.options(),
            files: value.files,
            asset_root: value.asset_root,
            preload: value.preload,
            placements: value.placements,
            report_dir: value.report_dir,
            headless: value.headless,
        }
    }
}
