use std::rc::Rc;

use anyhow::Result;

use crate::classify::classify;
use crate::context::AppContext;
use crate::object_url::{ObjectUrlStore, TemporaryUrl};
use crate::render::{LoadRequest, Renderer, RendererSettings, SceneHandle};
use crate::resolve::resolve_root;
use crate::resource::{ResourceMap, RootSource};
use crate::status::Presenter;
use crate::validate::Validator;

pub type RendererFactory<R> = Box<dyn FnMut(&RendererSettings) -> Result<R>>;

/// How a single `view` call ended.
#[derive(Debug)]
pub enum ViewOutcome {
    Displayed(SceneHandle),
    Reported(String),
}

impl ViewOutcome {
    pub fn is_displayed(&self) -> bool {
        matches!(self, ViewOutcome::Displayed(_))
    }
}

/// Runs loads against a lazily created renderer session that is reused by every later load.
pub struct Viewer<R: Renderer> {
    context: AppContext,
    session: Option<R>,
    create_renderer: RendererFactory<R>,
    validator: Box<dyn Validator>,
    presenter: Box<dyn Presenter>,
    object_urls: Rc<ObjectUrlStore>,
}

impl<R: Renderer> Viewer<R> {
    pub fn new(
        context: AppContext,
        create_renderer: RendererFactory<R>,
        validator: Box<dyn Validator>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            context,
            session: None,
            create_renderer,
            validator,
            presenter,
            object_urls: ObjectUrlStore::new(),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn session(&mut self) -> Option<&mut R> {
        self.session.as_mut()
    }

    pub fn object_urls(&self) -> &ObjectUrlStore {
        &self.object_urls
    }

    pub fn drop_started(&mut self) {
        self.presenter.show_spinner();
    }

    pub fn drop_failed(&mut self, message: &str) {
        log::warn!("Drop failed: {message}");
        self.presenter.hide_spinner();
    }

    /// Alerts the user about a failure that happened before a load could start.
    pub fn report_error(&mut self, error: &anyhow::Error) -> ViewOutcome {
        self.presenter.hide_spinner();
        report(self.presenter.as_mut(), error)
    }

    /// Loads a set of files provided by the user, rooted at its single scene file.
    pub async fn load(&mut self, resources: ResourceMap) -> ViewOutcome {
        let selection = match resolve_root(&resources) {
            Ok(selection) => selection,
            Err(error) => return self.report_error(&anyhow::Error::from(error)),
        };

        self.view(
            RootSource::Resource(selection.resource),
            &selection.root_path,
            resources,
        )
        .await
    }

    pub async fn view(
        &mut self,
        root: RootSource,
        root_path: &str,
        resources: ResourceMap,
    ) -> ViewOutcome {
        self.presenter.show_spinner();

        if self.session.is_none() {
            match (self.create_renderer)(&self.context.renderer_settings()) {
                Ok(renderer) => {
                    log::info!("Viewer session created");
                    self.session = Some(renderer);
                }
                Err(error) => return self.report_error(&error),
            }
        }

        let asset_id = root.asset_id();
        // Only in-memory roots need a temporary URL. It is revoked when the guard drops.
        let (load_url, temporary_url): (String, Option<TemporaryUrl>) = match &root {
            RootSource::Url(url) => (url.clone(), None),
            RootSource::Resource(resource) => {
                let temporary_url = self.object_urls.create(resource);
                (temporary_url.url().to_string(), Some(temporary_url))
            }
        };

        let request = LoadRequest {
            url: &load_url,
            root_path,
            resources: &resources,
            object_urls: &self.object_urls,
        };

        let outcome = match self.session.as_mut() {
            Some(renderer) => match renderer.load(request).await {
                Ok(handle) => {
                    if let Some(placement) = self.context.placements.get(&asset_id) {
                        if let Err(error) = renderer.scene_mut().place(&handle, placement) {
                            log::warn!("Unable to place {asset_id}: {error}");
                        }
                    }

                    if !self.context.options.kiosk {
                        if let Err(error) = self.validator.validate(request, &handle) {
                            log::warn!("Validation of {asset_id} failed: {error:?}");
                        }
                    }

                    ViewOutcome::Displayed(handle)
                }
                Err(error) => report(self.presenter.as_mut(), &error),
            },
            None => ViewOutcome::Reported(String::from("No viewer session is available.")),
        };

        self.presenter.hide_spinner();
        drop(temporary_url);

        outcome
    }
}

fn report(presenter: &mut dyn Presenter, error: &anyhow::Error) -> ViewOutcome {
    log::error!("{error:?}");

    let message = classify(error);
    presenter.alert(&message);

    ViewOutcome::Reported(message)
}
