//! Scene configuration files.
//!
//! A configuration names the model to load, the output image, the camera and
//! the lights. Two encodings are supported: the line-oriented text format
//!
//! ```text
//! comment
//! path/to/model.obj
//! path/to/output
//! k
//! xres yres
//! eye_x eye_y eye_z
//! look_x look_y look_z
//! [up_x up_y up_z]              (default 0 1 0)
//! [yview]                       (default 1)
//! [L px py pz r g b intensity]  (zero or more)
//! ```
//!
//! where light colors are 0-255 and intensities are percentages, and a JSON
//! form of [`SceneConfig`] selected by a `.json` extension.
//!
//! Relative model and output paths are kept exactly as written and are
//! relative to the directory of the configuration file.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use whitted_math::Vec3;

use crate::scene::{Color, Light, MAX_LIGHTS};

/// Errors that can occur while reading or writing a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Missing {0}: configuration ended early")]
    MissingField(&'static str),

    #[error("Invalid recursion depth {0} (must be >= 0)")]
    InvalidDepth(i64),

    #[error("Invalid resolution {xres}x{yres}")]
    InvalidResolution { xres: u32, yres: u32 },

    #[error("Invalid vertical view extent {0} (must be > 0)")]
    InvalidYView(f32),

    #[error("Too many lights: {0} (at most {max} are supported)", max = MAX_LIGHTS)]
    TooManyLights(usize),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_yview() -> f32 {
    1.0
}

/// Everything needed to render one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub comment: String,
    pub obj_path: PathBuf,
    pub output_path: PathBuf,
    /// Recursion depth `k`
    pub depth: u32,
    pub xres: u32,
    pub yres: u32,
    /// Camera position, in model units
    pub eye: Vec3,
    /// Point the camera looks at, in model units
    pub look_at: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Vertical extent of the view at unit distance
    #[serde(default = "default_yview")]
    pub yview: f32,
    /// Lights, in model units with colors in [0, 1]
    #[serde(default)]
    pub lights: Vec<Light>,
}

impl SceneConfig {
    /// Read a configuration, choosing the encoding from the extension.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = if is_json(path) {
            Self::from_json(&content)?
        } else {
            Self::from_text(&content)?
        };

        log::debug!(
            "Loaded configuration {}: {}x{}, depth {}, {} lights",
            path.display(),
            config.xres,
            config.yres,
            config.depth,
            config.lights.len()
        );
        Ok(config)
    }

    /// Write the configuration, choosing the encoding from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            self.to_text()
        };
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the line-oriented text format.
    pub fn from_text(content: &str) -> ConfigResult<Self> {
        ConfigParser::new(content).parse()
    }

    /// Parse the JSON encoding.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration in the text format.
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            self.comment.clone(),
            self.obj_path.display().to_string(),
            self.output_path.display().to_string(),
            self.depth.to_string(),
            format!("{} {}", self.xres, self.yres),
            fmt_vec3(self.eye),
            fmt_vec3(self.look_at),
            fmt_vec3(self.up),
            self.yview.to_string(),
        ];
        lines.extend(self.lights.iter().map(|light| {
            let color = (light.color * 255.0).round();
            format!(
                "L {} {} {} {} {}",
                fmt_vec3(light.position),
                color.x as i32,
                color.y as i32,
                color.z as i32,
                light.intensity * 100.0
            )
        }));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Model path for a configuration file stored in `dir`.
    pub fn obj_path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.obj_path)
    }

    /// Output path for a configuration file stored in `dir`.
    pub fn output_path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.output_path)
    }

    /// Copy of a configuration read from directory `from` whose paths still
    /// name the same files when it is stored in directory `to`.
    pub fn rebased(&self, from: &Path, to: &Path) -> Self {
        Self {
            obj_path: rebase_path(&self.obj_path, from, to),
            output_path: rebase_path(&self.output_path, from, to),
            ..self.clone()
        }
    }

    /// Focal length in pixel units, `yres / yview`.
    pub fn focal_length(&self) -> f32 {
        self.yres as f32 / self.yview
    }

    /// Check the invariants the text parser enforces line by line.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.xres == 0 || self.yres == 0 {
            return Err(ConfigError::InvalidResolution {
                xres: self.xres,
                yres: self.yres,
            });
        }
        if !(self.yview > 0.0 && self.yview.is_finite()) {
            return Err(ConfigError::InvalidYView(self.yview));
        }
        if self.lights.len() > MAX_LIGHTS {
            return Err(ConfigError::TooManyLights(self.lights.len()));
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn rebase_path(path: &Path, from: &Path, to: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let joined = from.join(path);
    if let Ok(relative) = joined.strip_prefix(to) {
        return relative.to_path_buf();
    }
    if joined.is_absolute() {
        return joined;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&joined))
        .unwrap_or(joined)
}

fn fmt_vec3(v: Vec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

/// Line-oriented parser for the text format.
struct ConfigParser<'a> {
    lines: VecDeque<(usize, &'a str)>,
}

impl<'a> ConfigParser<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().enumerate().map(|(i, s)| (i + 1, s)).collect(),
        }
    }

    fn parse(&mut self) -> ConfigResult<SceneConfig> {
        let comment = self.next_line("comment")?.1.to_string();
        let obj_path = PathBuf::from(self.next_line("model path")?.1.trim());
        let output_path = PathBuf::from(self.next_line("output path")?.1.trim());

        let (line, depth_text) = self.next_line("recursion depth")?;
        let depth: i64 = parse_number(line, depth_text.trim())?;
        if depth < 0 {
            return Err(ConfigError::InvalidDepth(depth));
        }
        let depth = u32::try_from(depth).map_err(|_| ConfigError::Parse {
            line,
            message: format!("recursion depth {} is too large", depth),
        })?;

        let (line, res_text) = self.next_line("resolution")?;
        let [xres, yres] = parse_fields::<u32, 2>(line, res_text)?;

        let (line, text) = self.next_line("eye position")?;
        let eye = Vec3::from_array(parse_fields(line, text)?);
        let (line, text) = self.next_line("look-at point")?;
        let look_at = Vec3::from_array(parse_fields(line, text)?);

        let mut up = default_up();
        if let Some((line, text)) = self.next_setting() {
            up = Vec3::from_array(parse_fields(line, text)?);
        }
        let mut yview = default_yview();
        if let Some((line, text)) = self.next_setting() {
            yview = parse_number(line, text.trim())?;
        }

        let mut lights = Vec::new();
        while let Some((line, text)) = self.lines.pop_front() {
            let mut tokens = text.split_whitespace();
            if tokens.next() != Some("L") {
                break;
            }
            let rest: Vec<&str> = tokens.collect();
            let [px, py, pz, r, g, b, intensity] = parse_tokens::<f32, 7>(line, &rest)?;
            if intensity < 0.0 {
                return Err(ConfigError::Parse {
                    line,
                    message: format!("negative light intensity {}", intensity),
                });
            }
            lights.push(Light::new(
                Vec3::new(px, py, pz),
                Color::new(r, g, b) / 255.0,
                intensity * 0.01,
            ));
        }

        let config = SceneConfig {
            comment,
            obj_path,
            output_path,
            depth,
            xres,
            yres,
            eye,
            look_at,
            up,
            yview,
            lights,
        };
        config.validate()?;
        Ok(config)
    }

    fn next_line(&mut self, field: &'static str) -> ConfigResult<(usize, &'a str)> {
        self.lines.pop_front().ok_or(ConfigError::MissingField(field))
    }

    /// Next optional setting line; light lines and blank lines are not settings.
    fn next_setting(&mut self) -> Option<(usize, &'a str)> {
        let (_, text) = self.lines.front()?;
        if text.trim().is_empty() {
            self.lines.pop_front();
            return None;
        }
        if text.trim_start().starts_with('L') {
            return None;
        }
        self.lines.pop_front()
    }
}

fn parse_number<T: std::str::FromStr>(line: usize, token: &str) -> ConfigResult<T> {
    token.parse().map_err(|_| ConfigError::Parse {
        line,
        message: format!("invalid number '{}'", token),
    })
}

fn parse_fields<T: std::str::FromStr + Copy + Default, const N: usize>(
    line: usize,
    text: &str,
) -> ConfigResult<[T; N]> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    parse_tokens(line, &tokens)
}

fn parse_tokens<T: std::str::FromStr + Copy + Default, const N: usize>(
    line: usize,
    tokens: &[&str],
) -> ConfigResult<[T; N]> {
    if tokens.len() < N {
        return Err(ConfigError::Parse {
            line,
            message: format!("expected {} values, found {}", N, tokens.len()),
        });
    }
    let mut values = [T::default(); N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = parse_number(line, token)?;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Cornell box, two lights
models/cornell.obj
renders/cornell
3
640 480
0 1 4
0 1 0
0 1 0
1.5
L 0 1.9 0 255 255 255 80
L 1 1 1 255 0 128 100
";

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("whitted_config_{}_{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_text() {
        let config = SceneConfig::from_text(SAMPLE).unwrap();

        assert_eq!(config.comment, "Cornell box, two lights");
        assert_eq!(config.obj_path, PathBuf::from("models/cornell.obj"));
        assert_eq!(config.depth, 3);
        assert_eq!((config.xres, config.yres), (640, 480));
        assert_eq!(config.eye, Vec3::new(0.0, 1.0, 4.0));
        assert_eq!(config.up, Vec3::Y);
        assert_eq!(config.yview, 1.5);
        assert_eq!(config.focal_length(), 320.0);

        assert_eq!(config.lights.len(), 2);
        let light = config.lights[1];
        assert_eq!(light.position, Vec3::ONE);
        assert_eq!(light.color.x, 1.0);
        assert!((light.color.z - 128.0 / 255.0).abs() < 1e-6);
        assert!((light.intensity - 1.0).abs() < 1e-6);
        assert!((config.lights[0].intensity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_optional_lines_default() {
        let text = "comment\nscene.obj\nout\n1\n4 3\n0 0 5\n0 0 0\n";
        let config = SceneConfig::from_text(text).unwrap();

        assert_eq!(config.up, Vec3::Y);
        assert_eq!(config.yview, 1.0);
        assert!(config.lights.is_empty());
    }

    #[test]
    fn test_lights_without_up_or_yview() {
        let text = "c\nscene.obj\nout\n1\n4 3\n0 0 5\n0 0 0\nL 0 0 5 255 255 255 100\n";
        let config = SceneConfig::from_text(text).unwrap();

        assert_eq!(config.up, Vec3::Y);
        assert_eq!(config.lights.len(), 1);
    }

    #[test]
    fn test_light_parsing_stops_at_non_light_line() {
        let text = format!("{}# trailing notes\nL 0 0 0 1 1 1 1\n", SAMPLE);
        let config = SceneConfig::from_text(&text).unwrap();
        assert_eq!(config.lights.len(), 2);
    }

    #[test]
    fn test_negative_depth_rejected() {
        let text = "c\nscene.obj\nout\n-1\n4 3\n0 0 5\n0 0 0\n";
        let err = SceneConfig::from_text(text).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDepth(-1)));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let text = "c\nscene.obj\nout\n1\n0 3\n0 0 5\n0 0 0\n";
        let err = SceneConfig::from_text(text).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidResolution { xres: 0, yres: 3 }));
    }

    #[test]
    fn test_malformed_number_reports_line() {
        let text = "c\nscene.obj\nout\n1\n4 3\n0 zero 5\n0 0 0\n";
        let err = SceneConfig::from_text(text).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 6, .. }), "{:?}", err);
    }

    #[test]
    fn test_truncated_file() {
        let err = SceneConfig::from_text("c\nscene.obj\nout\n1\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("resolution")));
    }

    #[test]
    fn test_too_many_lights() {
        let mut text = String::from("c\nscene.obj\nout\n1\n4 3\n0 0 5\n0 0 0\n0 1 0\n1\n");
        for _ in 0..=MAX_LIGHTS {
            text.push_str("L 0 0 0 255 255 255 100\n");
        }
        let err = SceneConfig::from_text(&text).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyLights(21)));
    }

    #[test]
    fn test_text_round_trip() {
        let config = SceneConfig::from_text(SAMPLE).unwrap();
        let reparsed = SceneConfig::from_text(&config.to_text()).unwrap();

        assert_eq!(reparsed.comment, config.comment);
        assert_eq!(reparsed.obj_path, config.obj_path);
        assert_eq!(reparsed.eye, config.eye);
        assert_eq!(reparsed.yview, config.yview);
        assert_eq!(reparsed.lights.len(), config.lights.len());
        for (a, b) in reparsed.lights.iter().zip(&config.lights) {
            assert!((a.color - b.color).length() < 1e-6);
            assert!((a.intensity - b.intensity).abs() < 1e-6);
        }
    }

    #[test]
    fn test_save_and_load_keep_paths() {
        let dir = scratch_dir("save");
        let config = SceneConfig::from_text(SAMPLE).unwrap();

        let text_path = dir.join("scene.cfg");
        let json_path = dir.join("scene.json");
        config.save(&text_path).unwrap();
        config.save(&json_path).unwrap();

        let from_text = SceneConfig::load(&text_path).unwrap();
        let from_json = SceneConfig::load(&json_path).unwrap();

        assert_eq!(from_text.obj_path, PathBuf::from("models/cornell.obj"));
        assert_eq!(from_json.output_path, PathBuf::from("renders/cornell"));
        assert_eq!(from_text.obj_path_in(&dir), dir.join("models/cornell.obj"));
        assert_eq!(from_json.lights, config.lights);
        assert_eq!(from_text.depth, from_json.depth);

        // Saving what was loaded and loading it again changes nothing
        from_text.save(&text_path).unwrap();
        let reloaded = SceneConfig::load(&text_path).unwrap();
        assert_eq!(reloaded.obj_path, from_text.obj_path);
        assert_eq!(reloaded.output_path, from_text.output_path);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_relative_config_dir_resolution() {
        let config = SceneConfig::from_text(SAMPLE).unwrap();
        let scenes = Path::new("scenes");

        assert_eq!(config.obj_path_in(scenes), PathBuf::from("scenes/models/cornell.obj"));
        assert_eq!(config.output_path_in(scenes), PathBuf::from("scenes/renders/cornell"));

        // A file in the current directory has an empty parent
        let here = Path::new("a.cfg").parent().unwrap();
        assert_eq!(config.obj_path_in(here), PathBuf::from("models/cornell.obj"));
    }

    #[test]
    fn test_rebased_paths_name_same_files() {
        let config = SceneConfig::from_text(SAMPLE).unwrap();

        let same = config.rebased(Path::new("scenes"), Path::new("scenes"));
        assert_eq!(same.obj_path, config.obj_path);

        let up = config.rebased(Path::new("scenes/deep"), Path::new("scenes"));
        assert_eq!(up.obj_path, PathBuf::from("deep/models/cornell.obj"));
        assert_eq!(up.obj_path_in(Path::new("scenes")), config.obj_path_in(Path::new("scenes/deep")));

        let elsewhere = config.rebased(Path::new("scenes"), Path::new("renders"));
        assert!(elsewhere.obj_path.is_absolute());
        assert!(elsewhere.obj_path.ends_with("scenes/models/cornell.obj"));

        let mut absolute = config.clone();
        absolute.obj_path = PathBuf::from("/data/room.obj");
        let kept = absolute.rebased(Path::new("scenes"), Path::new("renders"));
        assert_eq!(kept.obj_path, PathBuf::from("/data/room.obj"));
    }

    #[test]
    fn test_json_validation() {
        let json = r#"{
            "obj_path": "a.obj",
            "output_path": "out",
            "depth": 2,
            "xres": 8,
            "yres": 6,
            "eye": [0.0, 0.0, 3.0],
            "look_at": [0.0, 0.0, 0.0],
            "yview": 0.0
        }"#;
        let err = SceneConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYView(_)));

        let json = json.replace("\"yview\": 0.0", "\"yview\": 2.0");
        let config = SceneConfig::from_json(&json).unwrap();
        assert_eq!(config.up, Vec3::Y);
        assert_eq!(config.comment, "");
    }

    #[test]
    fn test_missing_file() {
        let err = SceneConfig::load("/nonexistent/scene.cfg").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
