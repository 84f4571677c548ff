use serde::Deserialize;

use crate::error::{BridgeError, Result};

pub const CONTENT_URI_SCHEME: &str = "content://";

/// Display surface that receives the new background image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScreenTarget {
    Lock = 1,
    Home = 2,
    #[default]
    Both = 3,
}

impl TryFrom<i64> for ScreenTarget {
    type Error = BridgeError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(ScreenTarget::Lock),
            2 => Ok(ScreenTarget::Home),
            3 => Ok(ScreenTarget::Both),
            other => Err(BridgeError::InvalidTarget(other)),
        }
    }
}

impl std::str::FromStr for ScreenTarget {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lock" => Ok(ScreenTarget::Lock),
            "home" => Ok(ScreenTarget::Home),
            "both" => Ok(ScreenTarget::Both),
            other => other
                .parse::<i64>()
                .map_err(|_| BridgeError::InvalidArguments(format!("unknown screen '{}'", s)))
                .and_then(ScreenTarget::try_from),
        }
    }
}

/// One wallpaper-set call. Built per call and dropped when it completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallpaperRequest {
    pub source_path: Option<String>,
    pub image_bytes: Option<Vec<i8>>,
    pub screen_target: ScreenTarget,
}

impl WallpaperRequest {
    pub fn from_path(path: impl Into<String>, screen_target: ScreenTarget) -> Self {
        Self {
            source_path: Some(path.into()),
            image_bytes: None,
            screen_target,
        }
    }

    pub fn from_bytes(bytes: &[u8], screen_target: ScreenTarget) -> Self {
        Self {
            source_path: None,
            image_bytes: Some(bytes.iter().map(|&b| b as i8).collect()),
            screen_target,
        }
    }
}

/// Raw `setWallpaper` arguments as they arrive over the channel.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWallpaperArgs {
    pub path: Option<String>,
    pub image_bytes: Option<Vec<i64>>,
    pub screen: Option<i64>,
}

impl TryFrom<SetWallpaperArgs> for WallpaperRequest {
    type Error = BridgeError;

    fn try_from(args: SetWallpaperArgs) -> Result<Self> {
        let screen_target = match args.screen {
            Some(value) => ScreenTarget::try_from(value)?,
            None => ScreenTarget::default(),
        };

        Ok(WallpaperRequest {
            source_path: args.path,
            image_bytes: args.image_bytes.as_deref().map(to_signed_bytes),
            screen_target,
        })
    }
}

/// The channel only carries non-negative integers, so 200 arrives as 200 and
/// has to become -56 again. Values are truncated to their low byte first.
pub fn to_signed_bytes(values: &[i64]) -> Vec<i8> {
    values
        .iter()
        .map(|&value| {
            let low = (value & 0xff) as i16;
            if low > 127 {
                (low - 256) as i8
            } else {
                low as i8
            }
        })
        .collect()
}

pub fn is_content_uri(path: &str) -> bool {
    path.starts_with(CONTENT_URI_SCHEME)
}
