use crate::rendering::texture::{Texture2D, Texture2DLoadConfig, TextureCube};
use crate::viewer::Error;
use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::rc::Rc;

lazy_static! {
    // Assets ship next to the executable; a plain checkout falls back to
    // the working directory.
    static ref ASSET_ROOT: PathBuf = {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        match exe_dir {
            Some(dir) if dir.join("assets").exists() => dir,
            _ => PathBuf::from("."),
        }
    };
}

pub fn asset_root() -> &'static Path {
    &ASSET_ROOT
}

/// Resolves a configured path against the asset root unless it is already
/// absolute.
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        asset_root().join(path)
    }
}

pub trait Asset {
    type Output;
    type Error;
    type LoadConfig;

    fn load<P: AsRef<Path> + Debug>(
        path: P,
        load_config: Option<Self::LoadConfig>,
    ) -> Result<Self::Output, Self::Error>;
}

/// Caches decoded GPU resources by file stem so repeated loads of the
/// same file are free.
pub struct AssetManager {
    textures: HashMap<String, Rc<Texture2D>>,
    cube_maps: HashMap<String, Rc<TextureCube>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self {
            textures: Default::default(),
            cube_maps: Default::default(),
        }
    }

    pub fn load_texture_2d(
        &mut self,
        path: &Path,
        is_srgb: bool,
        generate_mipmaps: bool,
    ) -> Result<Rc<Texture2D>, Error> {
        let key = Self::cache_key(path)?;

        if let Some(texture) = self.textures.get(&key) {
            return Ok(Rc::clone(texture));
        }

        let texture = Texture2D::load(
            path,
            Some(Texture2DLoadConfig {
                is_srgb,
                generate_mipmaps,
            }),
        )
        .map(Rc::new)
        .map_err(|reason| Error::Asset {
            path: path.to_path_buf(),
            reason,
        })?;

        self.textures.insert(key, Rc::clone(&texture));
        Ok(texture)
    }

    pub fn load_cube_map(&mut self, path: &Path) -> Result<Rc<TextureCube>, Error> {
        let key = Self::cache_key(path)?;

        if let Some(cube_map) = self.cube_maps.get(&key) {
            return Ok(Rc::clone(cube_map));
        }

        let cube_map = TextureCube::load(path, None)
            .map(Rc::new)
            .map_err(|reason| Error::Asset {
                path: path.to_path_buf(),
                reason,
            })?;

        self.cube_maps.insert(key, Rc::clone(&cube_map));
        Ok(cube_map)
    }

    pub fn get_texture_2d(&self, name: &str) -> Option<Rc<Texture2D>> {
        self.textures.get(name).map(Rc::clone)
    }

    fn cache_key(path: &Path) -> Result<String, Error> {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Asset {
                path: path.to_path_buf(),
                reason: String::from("invalid file path"),
            })
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_under_the_asset_root() {
        let resolved = resolve_path(Path::new("models/jet.glb"));
        assert!(resolved.ends_with("models/jet.glb"));

        let absolute = Path::new("/tmp/model.glb");
        assert_eq!(resolve_path(absolute), absolute);
    }
}
