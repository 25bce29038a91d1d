use std::sync::Arc;

/// Loading indicator and user-facing alerts.
pub trait Presenter {
    fn show_spinner(&mut self);
    fn hide_spinner(&mut self);
    fn alert(&mut self, message: &str);
}

/// Reports through the log, for headless runs.
#[derive(Default)]
pub struct LogPresenter {
    pub loading: bool,
    pub alerts: Vec<String>,
}

impl Presenter for LogPresenter {
    fn show_spinner(&mut self) {
        self.loading = true;
        log::info!("Loading...");
    }

    fn hide_spinner(&mut self) {
        self.loading = false;
    }

    fn alert(&mut self, message: &str) {
        log::error!("{message}");
        self.alerts.push(message.to_string());
    }
}

/// Shows loading and error state in the window title.
/// An alert stays in the title until the next load starts.
pub struct WindowPresenter {
    window: Arc<winit::window::Window>,
    title: String,
    showing_alert: bool,
}

impl WindowPresenter {
    pub fn new(window: Arc<winit::window::Window>, title: impl Into<String>) -> Self {
        Self {
            window,
            title: title.into(),
            showing_alert: false,
        }
    }
}

impl Presenter for WindowPresenter {
    fn show_spinner(&mut self) {
        self.showing_alert = false;
        self.window.set_title(&format!("{} - Loading...", self.title));
    }

    fn hide_spinner(&mut self) {
        if !self.showing_alert {
            self.window.set_title(&self.title);
        }
    }

    fn alert(&mut self, message: &str) {
        log::error!("{message}");
        self.showing_alert = true;
        self.window.set_title(&format!("{} - {message}", self.title));
    }
}
