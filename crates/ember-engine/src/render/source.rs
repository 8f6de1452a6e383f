use std::path::Path;

use crate::{Error, Result};

/// WGSL text of one vertex/fragment pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads both stages from disk.
    pub fn load(vertex_path: &Path, fragment_path: &Path) -> Result<Self> {
        Ok(Self {
            vertex: read_source(vertex_path)?,
            fragment: read_source(fragment_path)?,
        })
    }
}

/// The two programs the compositor needs: the scene pass and the blit pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSet {
    pub scene: ShaderSource,
    pub blit: ShaderSource,
}

impl ShaderSet {
    pub const SCENE_VERTEX: &'static str = "scene.vert.wgsl";
    pub const SCENE_FRAGMENT: &'static str = "scene.frag.wgsl";
    pub const BLIT_VERTEX: &'static str = "blit.vert.wgsl";
    pub const BLIT_FRAGMENT: &'static str = "blit.frag.wgsl";

    /// Reads the four shader files from `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let set = Self {
            scene: ShaderSource::load(&dir.join(Self::SCENE_VERTEX), &dir.join(Self::SCENE_FRAGMENT))?,
            blit: ShaderSource::load(&dir.join(Self::BLIT_VERTEX), &dir.join(Self::BLIT_FRAGMENT))?,
        };
        log::info!("loaded shaders from {}", dir.display());
        Ok(set)
    }
}

fn read_source(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ShaderSourceIo {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("read {} ({} bytes)", path.display(), text.len());
    Ok(text)
}
