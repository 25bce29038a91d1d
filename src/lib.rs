use anyhow::Result;

use crate::app::App;
use crate::args::Args;
use crate::bootstrap::Bootstrap;

mod app;
pub mod args;
pub mod bootstrap;
pub mod camera;
pub mod classify;
pub mod context;
pub mod data;
pub mod dropzone;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod object_url;
pub mod options;
pub mod placement;
pub mod render;
pub mod resolve;
pub mod resource;
pub mod status;
pub mod validate;
pub mod viewer;

pub fn run(args: Args) -> Result<()> {
    env_logger::init();

    if args.headless {
        return bootstrap::run_headless(args);
    }

    let bootstrap = Bootstrap::from_args(args)?;

    let event_loop = App::create_event_loop()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App::new(bootstrap);
    event_loop.run_app(&mut app)?;

    Ok(())
}
