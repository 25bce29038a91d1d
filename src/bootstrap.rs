use anyhow::Result;

use crate::args::Args;
use crate::context::AppContext;
use crate::dropzone::collect_files;
use crate::error::Error;
use crate::fetch::{fetch_all, AnyFetcher, AssetRoot, ResourceFetcher};
use crate::manifest::{PreloadAsset, PreloadManifest};
use crate::placement::PlacementTable;
use crate::render::loader::SceneGraphRenderer;
use crate::render::{Renderer, RendererSettings};
use crate::resource::{ResourceMap, RootSource};
use crate::status::{LogPresenter, Presenter};
use crate::validate::GltfValidator;
use crate::viewer::{ViewOutcome, Viewer};

pub type DefaultRenderer = SceneGraphRenderer<AnyFetcher>;

/// Everything the application needs before the first load, read from the command line.
pub struct Bootstrap {
    pub context: AppContext,
    pub asset_root: AssetRoot,
    pub preload: Vec<PreloadAsset>,
    args: Args,
}

impl Bootstrap {
    pub fn from_args(args: Args) -> Result<Self> {
        let asset_root = match &args.asset_root {
            Some(source) => AssetRoot::from_source(source)?,
            None => AssetRoot::default(),
        };

        let mut placements = match &args.placements {
            Some(path) => PlacementTable::from_path(path)?,
            None => PlacementTable::default(),
        };

        let manifest = match &args.preload {
            Some(path) => PreloadManifest::from_path(path)?,
            None => PreloadManifest::default(),
        };
        manifest.merge_placements(&mut placements);

        log::debug!("Loaded {} placements", placements.len());

        Ok(Self {
            context: AppContext::new(args.options.clone(), placements),
            asset_root,
            preload: manifest.assets,
            args,
        })
    }

    pub fn create_viewer(&self, presenter: Box<dyn Presenter>) -> Result<Viewer<DefaultRenderer>> {
        let validator = GltfValidator::new(self.args.report_dir.clone())?;
        let asset_root = self.asset_root.clone();

        Ok(Viewer::new(
            self.context.clone(),
            Box::new(move |settings: &RendererSettings| -> Result<DefaultRenderer> {
                Ok(SceneGraphRenderer::new(
                    settings.clone(),
                    AnyFetcher::new(asset_root.clone()),
                ))
            }),
            Box::new(validator),
            presenter,
        ))
    }

    pub fn startup(&self) -> Result<Startup<AnyFetcher>> {
        let initial_drop = match self.args.files.is_empty() {
            true => None,
            false => Some(collect_files(&self.args.files)?),
        };

        Ok(Startup {
            fetcher: AnyFetcher::new(self.asset_root.clone()),
            preload: self.preload.clone(),
            model: self.context.options.model.clone(),
            initial_drop,
        })
    }
}

/// The loads that happen once at startup, run one after the other.
pub struct Startup<F: ResourceFetcher> {
    pub fetcher: F,
    pub preload: Vec<PreloadAsset>,
    pub model: Option<String>,
    pub initial_drop: Option<ResourceMap>,
}

impl<F: ResourceFetcher> Startup<F> {
    pub async fn run<R: Renderer>(self, viewer: &mut Viewer<R>) -> Vec<ViewOutcome> {
        let mut outcomes = vec![];

        for asset in &self.preload {
            log::info!("Preloading {}", asset.root);

            let outcome = match fetch_all(&self.fetcher, &asset.urls).await {
                Ok(resources) => {
                    viewer
                        .view(RootSource::Url(asset.root.clone()), &asset.root_path, resources)
                        .await
                }
                Err(error) => viewer.report_error(&error),
            };
            outcomes.push(outcome);
        }

        if let Some(model) = &self.model {
            log::info!("Loading model {model}");
            outcomes.push(
                viewer
                    .view(RootSource::Url(model.clone()), "", ResourceMap::new())
                    .await,
            );
        }

        if let Some(resources) = self.initial_drop {
            outcomes.push(viewer.load(resources).await);
        }

        outcomes
    }
}

/// Runs every startup load without a window.
///
/// Fails when any of them was reported to the user as an error.
pub fn run_headless(args: Args) -> Result<()> {
    let bootstrap = Bootstrap::from_args(args)?;
    let mut viewer = bootstrap.create_viewer(Box::new(LogPresenter::default()))?;
    let startup = bootstrap.startup()?;

    let outcomes = pollster::block_on(startup.run(&mut viewer));

    if outcomes.is_empty() {
        log::warn!("Nothing to load");
    }

    let failures: Vec<&String> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ViewOutcome::Reported(message) => Some(message),
            ViewOutcome::Displayed(_) => None,
        })
        .collect();

    if !failures.is_empty() {
        return Err(Error::new(format!(
            "{} of {} loads failed",
            failures.len(),
            outcomes.len()
        ))
        .into());
    }

    if let Some(renderer) = viewer.session() {
        log::info!(
            "Scene holds {} assets with {} nodes",
            renderer.scene().children.len(),
            renderer
                .scene()
                .children
                .iter()
                .map(|child| child.node_count())
                .sum::<usize>()
        );
    }

    Ok(())
}
