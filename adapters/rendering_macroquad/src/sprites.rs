use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use card_defence_core::{SpriteRect, SpriteSheet};
use card_defence_rendering::RenderingError;
use glam::Vec2;
use macroquad::{
    color::Color,
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Cache of sprite sheets loaded from the manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteSheet, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Draws the `source` frame of `sheet` with its top-left corner at `position`.
    pub(crate) fn draw(
        &self,
        sheet: SpriteSheet,
        source: SpriteRect,
        position: Vec2,
        size: Vec2,
        tint: Color,
    ) -> Result<()> {
        let texture = self
            .texture(sheet)
            .with_context(|| format!("sprite sheet {sheet:?} missing from atlas"))?;

        let draw_params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(size.x, size.y)),
            source: Some(Rect::new(source.x, source.y, source.width, source.height)),
            ..DrawTextureParams::default()
        };
        texture::draw_texture_ex(texture, position.x, position.y, tint, draw_params);
        Ok(())
    }

    /// Pixel dimensions of the sheet, if loaded.
    #[must_use]
    pub(crate) fn dimensions(&self, sheet: SpriteSheet) -> Option<Vec2> {
        self.texture(sheet)
            .map(|texture| Vec2::new(texture.width(), texture.height()))
    }

    fn texture(&self, sheet: SpriteSheet) -> Option<Texture2D> {
        self.textures.get(&sheet).copied()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteSheet, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(SpriteSheet, PathBuf)>,
        loader: &mut impl FnMut(SpriteSheet, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (sheet, path) in entries {
            let texture = loader(sheet, &path).with_context(|| {
                format!("failed to load sprite {sheet:?} from {}", path.display())
            })?;
            if textures.insert(sheet, texture).is_some() {
                bail!("duplicate sprite entry for {sheet:?}");
            }
        }
        Ok(Self { textures })
    }
}

fn default_loader(_sheet: SpriteSheet, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

/// Resolves manifest entries into sheets ordered like [`SpriteSheet::ALL`].
fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteSheet, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        return Err(RenderingError::UnsupportedManifestVersion {
            found: manifest.version,
            expected: SUPPORTED_MANIFEST_VERSION,
        }
        .into());
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let Some(sheet) = SpriteSheet::from_key(&name) else {
            return Err(RenderingError::UnknownSpriteKey { key: name }.into());
        };
        let _ = resolved.insert(sheet, base_path.join(relative_path));
    }

    let mut ordered = Vec::with_capacity(SpriteSheet::ALL.len());
    for sheet in SpriteSheet::ALL {
        let Some(path) = resolved.remove(&sheet) else {
            return Err(RenderingError::MissingSprite { key: sheet.key() }.into());
        };
        ordered.push((sheet, path));
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn full_manifest() -> String {
        let mut manifest = String::from("version = 1\n\n[sprites]\n");
        for sheet in SpriteSheet::ALL.iter().rev() {
            manifest.push_str(&format!("{} = \"{}\"\n", sheet.key(), sheet.asset_path()));
        }
        manifest
    }

    fn rendering_error(error: anyhow::Error) -> RenderingError {
        error
            .downcast::<RenderingError>()
            .expect("manifest errors should be typed")
    }

    #[test]
    fn manifest_rejects_unsupported_versions() {
        let manifest = full_manifest().replace("version = 1", "version = 2");
        let error = parse_manifest(&manifest, Path::new("assets")).expect_err("version 2");
        assert_eq!(
            rendering_error(error),
            RenderingError::UnsupportedManifestVersion {
                found: 2,
                expected: 1
            }
        );
    }

    #[test]
    fn manifest_requires_every_sheet() {
        let manifest = full_manifest().replace("biker2 = \"img/biker2.png\"\n", "");
        let error = parse_manifest(&manifest, Path::new("assets")).expect_err("missing biker2");
        assert_eq!(
            rendering_error(error),
            RenderingError::MissingSprite {
                key: "biker2".to_string()
            }
        );
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = format!("{}dragon = \"img/dragon.png\"\n", full_manifest());
        let error = parse_manifest(&manifest, Path::new("assets")).expect_err("unknown key");
        assert_eq!(
            rendering_error(error),
            RenderingError::UnknownSpriteKey {
                key: "dragon".to_string()
            }
        );
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let parsed =
            parse_manifest(&full_manifest(), Path::new("root")).expect("manifest should parse");
        assert_eq!(parsed.len(), SpriteSheet::ALL.len());
        assert_eq!(
            parsed[0],
            (SpriteSheet::Tower(1), PathBuf::from("root/img/tower1.png"))
        );
        assert_eq!(
            parsed[parsed.len() - 1],
            (SpriteSheet::Terrain, PathBuf::from("root/img/terrain.png"))
        );
    }

    #[test]
    fn atlas_loads_textures_in_canonical_order() {
        let entries =
            parse_manifest(&full_manifest(), Path::new("assets")).expect("manifest should parse");
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |sheet, _| {
            load_order.borrow_mut().push(sheet);
            Ok(Texture2D::empty())
        })
        .expect("atlas should load using provided loader");

        assert_eq!(load_order.borrow().as_slice(), &SpriteSheet::ALL);
        assert_eq!(atlas.textures.len(), SpriteSheet::ALL.len());
    }

    #[test]
    fn loader_failures_carry_sheet_context() {
        let entries = vec![(SpriteSheet::Bullet, PathBuf::from("bullet.png"))];
        let error = SpriteAtlas::from_entries(entries, &mut |_, _| bail!("disk on fire"))
            .expect_err("loader failure must propagate");
        assert!(format!("{error:#}").contains("Bullet"));
        assert!(format!("{error:#}").contains("disk on fire"));
    }
}
