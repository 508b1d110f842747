//! Desktop/window wallpaper cache (§4.4).
//!
//! Grounded on `examples/original_source/src/amiwb/render/rnd_wallpaper.c`
//! (by name/signature; the detailed tiling blit loop is standard XRender
//! composite-with-repeat and isn't reproduced line-for-line here).

use crate::config::Config;
use crate::icons::Argb;

/// One cached background: the decoded source image plus whether it tiles
/// or scales-to-fit. The actual pixmap/picture pairing is created by
/// `render::surfaces` once a screen size is known; this struct only holds
/// the decode-and-policy half that survives a screen resize.
#[derive(Default)]
pub struct WallpaperCache {
    pub desktop: Option<(Argb, bool)>,
    pub window: Option<(Argb, bool)>,
}

impl WallpaperCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads both backgrounds from the current config. A background
    /// whose path fails to load leaves that slot empty rather than
    /// poisoning the other one.
    pub fn reload(&mut self, config: &Config, load_png: impl Fn(&str) -> Option<Argb>) {
        self.desktop = non_empty(&config.desktop_background)
            .and_then(&load_png)
            .map(|img| (img, config.desktop_tiling));
        self.window = non_empty(&config.window_background)
            .and_then(&load_png)
            .map(|img| (img, config.window_tiling));
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_leaves_slot_empty() {
        let mut cache = WallpaperCache::new();
        let config = Config::default();
        cache.reload(&config, |_| Some(Argb::new(1, 1)));
        assert!(cache.desktop.is_none());
        assert!(cache.window.is_none());
    }

    #[test]
    fn configured_path_is_loaded_with_tiling_flag() {
        let mut cache = WallpaperCache::new();
        let mut config = Config::default();
        config.desktop_background = "/tmp/bg.png".into();
        config.desktop_tiling = true;
        cache.reload(&config, |_| Some(Argb::new(4, 4)));
        let (_, tiling) = cache.desktop.unwrap();
        assert!(tiling);
    }
}
