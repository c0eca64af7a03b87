use serde::Deserialize;
use std::path::PathBuf;

use crate::mesh::EpsFlags;

/// Default name of the gmsh input for the first tour step
pub const DEFAULT_INPUT: &str = "untitled.msh";

fn default_verbose() -> bool {
    false
}
fn default_factor() -> f64 {
    0.3
}
fn default_keep_boundary() -> bool {
    true
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub eps: Option<EpsFlags>,
    #[serde(default)]
    pub distortion: Option<DistortionConfig>,
}

/// Settings for the random distortion step
#[derive(Debug, Deserialize, Clone)]
pub struct DistortionConfig {
    /// Maximal displacement as a fraction of the shortest adjacent edge
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default = "default_keep_boundary")]
    pub keep_boundary: bool,
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            factor: default_factor(),
            keep_boundary: default_keep_boundary(),
        }
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("meshtour.toml"));
    paths.push(PathBuf::from(".meshtour.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("meshtour").join("config.toml"));
        paths.push(config_dir.join("meshtour.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".meshtour.toml"));
    }

    paths
}

/// Fully resolved settings for a tour run
#[derive(Debug, Clone)]
pub struct TourConfig {
    /// gmsh file read by the first step
    pub input: PathBuf,
    /// Directory receiving the EPS pictures
    pub output_dir: PathBuf,
    /// Seed for the random distortion; `None` draws from the OS
    pub seed: Option<u64>,
    pub eps: EpsFlags,
    pub distortion: DistortionConfig,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            seed: None,
            eps: EpsFlags::default(),
            distortion: DistortionConfig::default(),
        }
    }
}

impl TourConfig {
    /// Take every setting present in the file, defaults for the rest
    pub fn from_file(file: &FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            input: file.input.clone().unwrap_or(defaults.input),
            output_dir: file.output_dir.clone().unwrap_or(defaults.output_dir),
            seed: file.seed,
            eps: file.eps.clone().unwrap_or(defaults.eps),
            distortion: file.distortion.clone().unwrap_or(defaults.distortion),
        }
    }

    /// Path of the picture for tour step `step`
    pub fn output_path(&self, step: usize) -> PathBuf {
        self.output_dir.join(format!("grid-{}.eps", step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            input = "meshes/annulus.msh"
            output_dir = "out"
            seed = 42
            verbose = true

            [eps]
            size = 500.0
            size_type = "height"
            color_boundary = true

            [distortion]
            factor = 0.1
        "#;
        let file: FileConfig = toml::from_str(toml).unwrap();
        let config = TourConfig::from_file(&file);

        assert!(file.verbose);
        assert_eq!(config.input, PathBuf::from("meshes/annulus.msh"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.eps.size, 500.0);
        assert_eq!(config.eps.size_type, crate::geometry::SizeType::Height);
        assert_eq!(config.eps.line_width, 0.5);
        assert!(config.eps.color_boundary);
        assert_eq!(config.distortion.factor, 0.1);
        assert!(config.distortion.keep_boundary);
        assert_eq!(config.output_path(3), PathBuf::from("out").join("grid-3.eps"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file: FileConfig = toml::from_str("").unwrap();
        let config = TourConfig::from_file(&file);

        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.seed, None);
        assert_eq!(config.eps.size, 300.0);
        assert_eq!(config.distortion.factor, 0.3);
    }

    #[test]
    fn test_rejects_unknown_size_type() {
        let result: Result<FileConfig, _> = toml::from_str("[eps]\nsize_type = \"diagonal\"");
        assert!(result.is_err());
    }
}
