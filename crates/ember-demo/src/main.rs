mod app;

use std::path::Path;

use winit::dpi::LogicalSize;

use ember_engine::device::GpuInit;
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::render::{CompositorConfig, ShaderSet};
use ember_engine::window::{Runtime, RuntimeConfig};

use app::Demo;

/// Shader files live next to the workspace root, independent of the working directory.
const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../shaders");

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(e) = run() {
        eprintln!("ember: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Shader sources are read before the window opens; a missing file is fatal.
    let shaders = ShaderSet::load_dir(Path::new(SHADER_DIR))?;

    let config = RuntimeConfig {
        title: "ember".to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
    };

    Runtime::run(
        config,
        GpuInit::default(),
        Demo::new(shaders, CompositorConfig::default()),
    )
}
