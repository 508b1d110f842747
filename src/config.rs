//! `amiwbrc` configuration file parser.
//!
//! "Simple, brutal: no defaults, no magic" — the parser itself never
//! applies a default value; an absent or unparseable field is left at its
//! zero value and it is up to the consumer (e.g. the frame scheduler
//! defaulting an unset `target_fps` to 120) to decide what zero means.
//!
//! Grounded on `examples/original_source/src/amiwb/amiwbrc.c`.

use std::path::{Path, PathBuf};

/// Render cadence: on-demand coalesces repaints behind `schedule_frame()`
/// calls, continuous keeps the frame timer always armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    OnDemand,
    Continuous,
}

impl From<i64> for RenderMode {
    fn from(v: i64) -> Self {
        if v == 1 {
            RenderMode::Continuous
        } else {
            RenderMode::OnDemand
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub brightness_up_cmd: String,
    pub brightness_down_cmd: String,
    pub volume_up_cmd: String,
    pub volume_down_cmd: String,
    pub volume_mute_cmd: String,

    pub desktop_background: String,
    pub desktop_tiling: bool,
    pub window_background: String,
    pub window_tiling: bool,

    /// Zero means "unset"; callers default this to 120.
    pub target_fps: u32,
    pub render_mode: RenderMode,
}

impl Config {
    /// Effective FPS target, applying the "unset means 120" default that
    /// belongs to the consumer, not the parser (§6).
    pub fn effective_fps(&self) -> u32 {
        if self.target_fps == 0 { 120 } else { self.target_fps }
    }

    /// Default config file path: `$HOME/.config/amiwb/amiwbrc`.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/amiwb/amiwbrc"))
    }

    /// Load from the given path. A missing file yields an all-zero config,
    /// matching the original's "no file, config stays empty" behavior —
    /// this is not an error.
    pub fn load(path: &Path) -> Config {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(_) => return Config::default(),
        };
        Config::parse(&text)
    }

    /// Load from the default path, or an empty config if `$HOME` is unset.
    pub fn load_default() -> Config {
        match Self::default_path() {
            Some(p) => Self::load(&p),
            None => Config::default(),
        }
    }

    fn parse(text: &str) -> Config {
        let mut cfg = Config::default();
        for line in text.lines() {
            parse_line(&mut cfg, line);
        }
        cfg
    }
}

/// C `atoi` semantics: trims leading whitespace, reads an optional sign and
/// a run of decimal digits, stops at the first non-digit; anything that
/// parses no digits at all yields zero. Never an error.
fn atoi(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let mut chars = trimmed.chars().peekable();
    let mut sign = 1i64;
    if let Some(&c) = chars.peek() {
        if c == '+' || c == '-' {
            if c == '-' {
                sign = -1;
            }
            chars.next();
        }
    }
    let mut out: i64 = 0;
    let mut saw_digit = false;
    for c in chars {
        match c.to_digit(10) {
            Some(d) => {
                saw_digit = true;
                out = out.saturating_mul(10).saturating_add(d as i64);
            }
            None => break,
        }
    }
    if !saw_digit {
        0
    } else {
        out * sign
    }
}

fn parse_line(cfg: &mut Config, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return;
    }
    let Some(eq) = trimmed.find('=') else {
        return;
    };
    let key = trimmed[..eq].trim();
    let value = trimmed[eq + 1..].trim();
    if key.is_empty() || value.is_empty() {
        return;
    }

    match key {
        "brightness_up_cmd" => cfg.brightness_up_cmd = value.to_string(),
        "brightness_down_cmd" => cfg.brightness_down_cmd = value.to_string(),
        "volume_up_cmd" => cfg.volume_up_cmd = value.to_string(),
        "volume_down_cmd" => cfg.volume_down_cmd = value.to_string(),
        "volume_mute_cmd" => cfg.volume_mute_cmd = value.to_string(),
        "desktop_background" => cfg.desktop_background = value.to_string(),
        "desktop_tiling" => cfg.desktop_tiling = atoi(value) != 0,
        "window_background" => cfg.window_background = value.to_string(),
        "window_tiling" => cfg.window_tiling = atoi(value) != 0,
        "target_fps" => cfg.target_fps = atoi(value).max(0) as u32,
        "render_mode" => cfg.render_mode = RenderMode::from(atoi(value)),
        _ => {} // unknown key, silently ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_comments_and_whitespace_are_ignored() {
        let cfg = Config::parse(
            "\n  # a comment\n   \ntarget_fps = 144 \n#render_mode=1\nrender_mode=0\n",
        );
        assert_eq!(cfg.target_fps, 144);
        assert_eq!(cfg.render_mode, RenderMode::OnDemand);
    }

    #[test]
    fn unknown_keys_are_silently_ignored() {
        let cfg = Config::parse("made_up_key=value\ntarget_fps=60\n");
        assert_eq!(cfg.target_fps, 60);
    }

    #[test]
    fn non_numeric_values_parse_to_zero() {
        let cfg = Config::parse("target_fps=banana\ndesktop_tiling=no\n");
        assert_eq!(cfg.target_fps, 0);
        assert_eq!(cfg.effective_fps(), 120);
        assert!(!cfg.desktop_tiling);
    }

    #[test]
    fn missing_equals_or_empty_sides_are_skipped() {
        let cfg = Config::parse("no_equals_here\n=value\nkey=\n");
        assert_eq!(cfg.desktop_background, "");
    }

    #[test]
    fn strings_are_trimmed_but_preserve_internal_spacing() {
        let cfg = Config::parse("brightness_up_cmd =  light -A 5  \n");
        assert_eq!(cfg.brightness_up_cmd, "light -A 5");
    }

    #[test]
    fn missing_file_yields_empty_config() {
        let cfg = Config::load(Path::new("/nonexistent/amiwbrc/path"));
        assert_eq!(cfg.target_fps, 0);
        assert_eq!(cfg.effective_fps(), 120);
    }
}
