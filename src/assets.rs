//! Directory scans for graphics, fonts and music.

use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::COLORKEY;
use crate::error::{Error, Result};
use crate::sheet::Sheets;

pub const GFX_EXTENSIONS: &[&str] = &["png", "jpg", "bmp"];
pub const MUSIC_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "mdi"];
pub const FONT_EXTENSIONS: &[&str] = &["ttf"];

/// `(base name, path)` of every file in `dir` whose extension is in
/// `accept`, compared case-insensitively. Sorted by name.
pub fn scan_dir(dir: &Path, accept: &[&str]) -> Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let stem = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned);
        if let (Some(ext), Some(stem)) = (ext, stem) {
            if accept.contains(&ext.as_str()) {
                found.push((stem, path));
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Whether any pixel is less than fully opaque.
pub fn has_alpha(image: &Image) -> bool {
    image.get_image_data().iter().any(|px| px[3] < 255)
}

/// Make every pixel of color `key` fully transparent.
pub fn apply_colorkey(image: &mut Image, key: [u8; 3]) {
    for px in image.get_image_data_mut().iter_mut() {
        if px[0] == key[0] && px[1] == key[1] && px[2] == key[2] {
            px[3] = 0;
        }
    }
}

/// Load every accepted image in `dir`, keyed by base filename. Images
/// without transparency get `colorkey` applied.
pub async fn load_all_gfx(dir: &Path, colorkey: [u8; 3], accept: &[&str]) -> Result<Sheets> {
    let mut sheets = Sheets::new();
    for (name, path) in scan_dir(dir, accept)? {
        let path_str = path.to_string_lossy().into_owned();
        let mut image = load_image(&path_str).await.map_err(|e| Error::Image {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if !has_alpha(&image) {
            apply_colorkey(&mut image, colorkey);
        }
        log::debug!("Loaded sheet '{}' ({}x{})", name, image.width(), image.height());
        sheets.insert(name, image);
    }
    Ok(sheets)
}

/// Paths of every accepted music file in `dir`.
pub fn load_all_music(dir: &Path, accept: &[&str]) -> Result<HashMap<String, PathBuf>> {
    Ok(scan_dir(dir, accept)?.into_iter().collect())
}

/// Paths of every accepted font file in `dir`.
pub fn load_all_fonts(dir: &Path, accept: &[&str]) -> Result<HashMap<String, PathBuf>> {
    load_all_music(dir, accept)
}

/// Everything loaded from the resource directory.
pub struct Assets {
    pub sheets: Sheets,
    pub textures: HashMap<String, Texture2D>,
    pub fonts: HashMap<String, PathBuf>,
    pub music: HashMap<String, PathBuf>,
}

impl Assets {
    /// Scan `root/graphics`, `root/fonts` and `root/music`. Missing font
    /// or music folders are treated as empty.
    pub async fn load(root: &Path) -> Result<Self> {
        let sheets = load_all_gfx(&root.join("graphics"), COLORKEY, GFX_EXTENSIONS).await?;
        let mut textures = HashMap::new();
        for name in sheets.names() {
            let tex = Texture2D::from_image(sheets.get(name)?);
            tex.set_filter(FilterMode::Nearest);
            textures.insert(name.to_owned(), tex);
        }
        let fonts = optional_dir(load_all_fonts(&root.join("fonts"), FONT_EXTENSIONS))?;
        let music = optional_dir(load_all_music(&root.join("music"), MUSIC_EXTENSIONS))?;
        log::info!(
            "Loaded {} sheets, {} fonts, {} songs from {}",
            textures.len(),
            fonts.len(),
            music.len(),
            root.display()
        );
        Ok(Self {
            sheets,
            textures,
            fonts,
            music,
        })
    }
}

fn optional_dir(found: Result<HashMap<String, PathBuf>>) -> Result<HashMap<String, PathBuf>> {
    match found {
        Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        other => other,
    }
}
