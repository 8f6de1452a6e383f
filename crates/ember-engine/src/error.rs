use std::path::PathBuf;

use crate::render::ShaderStage;

/// Errors surfaced by the engine's render components.
///
/// Everything here is fatal at startup. Framebuffer incompleteness is not an
/// error; see [`crate::render::FramebufferStatus`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No GPU adapter, device or surface could be created for the window.
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// A shader stage failed to parse or validate.
    #[error("{stage} shader failed to compile:\n{diagnostic}")]
    ShaderCompile {
        stage: ShaderStage,
        diagnostic: String,
    },

    /// Both stages compiled but do not form a valid program.
    #[error("shader program failed to link: {diagnostic}")]
    ProgramLink { diagnostic: String },

    /// A shader source file could not be read.
    #[error("failed to read shader source `{}`", path.display())]
    ShaderSourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
