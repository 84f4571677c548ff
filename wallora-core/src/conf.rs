use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
#[cfg(not(target_os = "android"))]
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::platform::Dimensions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub desired_width: i32,
    pub desired_height: i32,
    pub staged_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            desired_width: 1080,
            desired_height: 1920,
            staged_file_name: "wallpaper.png".to_string(),
        }
    }
}

impl Settings {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.desired_width,
            height: self.desired_height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conf {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub settings_file: PathBuf,
    pub settings: Settings,
}

impl Conf {
    pub fn new() -> Result<Self> {
        let (config_dir, cache_dir) = {
            #[cfg(target_os = "android")]
            {
                (
                    PathBuf::from("/data/data/com.lunexo.app.wallora/files"),
                    PathBuf::from("/data/data/com.lunexo.app.wallora/cache"),
                )
            }

            #[cfg(not(target_os = "android"))]
            {
                let proj_dirs = ProjectDirs::from("com", "lunexo", "wallora")
                    .context("Failed to get project directories")?;
                (
                    proj_dirs.config_dir().to_path_buf(),
                    proj_dirs.cache_dir().to_path_buf(),
                )
            }
        };

        Self::with_dirs(config_dir, cache_dir)
    }

    pub fn with_dirs(config_dir: PathBuf, cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

        let settings_file = config_dir.join("settings.json");
        let settings = load_settings(&settings_file)?;

        Ok(Conf {
            config_dir,
            cache_dir,
            settings_file,
            settings,
        })
    }

    pub fn staged_wallpaper_file(&self) -> PathBuf {
        self.cache_dir.join(&self.settings.staged_file_name)
    }

    pub fn fallback_dimensions(&self) -> Dimensions {
        self.settings.dimensions()
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid settings in {}", path.display()))
}
