use std::sync::OnceLock;

use crate::tess::StrokeMode;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "VGMESH_CONFIG";

/// Tessellation knobs shared by every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessConfig {
    pub fill_iterations: u32,
    pub stroke_iterations: u32,
    /// Fixed-point multiplier used to quantize device positions.
    pub precision: f32,
    pub stroke_mode: StrokeMode,
    pub cull_overlaps: bool,
    pub log_level: log::LevelFilter,
}

impl Default for TessConfig {
    fn default() -> Self {
        Self {
            fill_iterations: 16,
            stroke_iterations: 4,
            precision: 100.0,
            stroke_mode: StrokeMode::Full,
            cull_overlaps: false,
            log_level: log::LevelFilter::Info,
        }
    }
}

impl TessConfig {
    /// Parse `key = value` lines over the defaults. Unknown keys and bad values are ignored.
    pub fn parse(text: &str) -> Self {
        let mut cfg = Self::default();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();

            if key.eq_ignore_ascii_case("fill_iterations") {
                if let Ok(n) = value.parse::<u32>() {
                    cfg.fill_iterations = n;
                }
            } else if key.eq_ignore_ascii_case("stroke_iterations") {
                if let Ok(n) = value.parse::<u32>() {
                    cfg.stroke_iterations = n;
                }
            } else if key.eq_ignore_ascii_case("precision") {
                if let Ok(p) = value.parse::<f32>() {
                    cfg.precision = p;
                }
            } else if key.eq_ignore_ascii_case("stroke_mode") {
                if value.eq_ignore_ascii_case("simple") {
                    cfg.stroke_mode = StrokeMode::Simple;
                } else if value.eq_ignore_ascii_case("full") {
                    cfg.stroke_mode = StrokeMode::Full;
                }
            } else if key.eq_ignore_ascii_case("cull_overlaps") {
                cfg.cull_overlaps = parse_bool(value);
            } else if key.eq_ignore_ascii_case("log_level") {
                if let Ok(level) = value.parse::<log::LevelFilter>() {
                    cfg.log_level = level;
                }
            }
        }

        cfg.sanitized()
    }

    /// Clamp iteration counts to at least 1 and fall back on a non-positive precision.
    pub fn sanitized(mut self) -> Self {
        self.fill_iterations = self.fill_iterations.max(1);
        self.stroke_iterations = self.stroke_iterations.max(1);
        if !(self.precision.is_finite() && self.precision > 0.0) {
            self.precision = Self::default().precision;
        }
        self
    }
}

static CONFIG: OnceLock<TessConfig> = OnceLock::new();

/// Process-wide config, read once from `$VGMESH_CONFIG`.
pub fn tess_config() -> &'static TessConfig {
    CONFIG.get_or_init(read_config)
}

fn read_config() -> TessConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV) else {
        return TessConfig::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => TessConfig::parse(&text),
        Err(_) => TessConfig::default(),
    }
}

fn parse_bool(value: &str) -> bool {
    ["1", "true", "on", "yes"].iter().any(|v| value.eq_ignore_ascii_case(v))
}
