use crate::options::AppOptions;
use crate::placement::PlacementTable;
use crate::render::RendererSettings;

/// Application-wide configuration handed to the components that need it.
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub options: AppOptions,
    pub placements: PlacementTable,
}

impl AppContext {
    pub fn new(options: AppOptions, placements: PlacementTable) -> Self {
        Self {
            options,
            placements,
        }
    }

    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings::from(&self.options)
    }
}
