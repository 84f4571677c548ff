use std::path::Path;
#[cfg(target_os = "linux")]
use std::process::Command;

use log::{info, warn};

use crate::conf::Conf;
use crate::decode::{self, DecodedImage};
use crate::error::{BridgeError, Result};
use crate::platform::{Capabilities, ContentStream, Dimensions, Placement, WallpaperPlatform};

/// Desktop backend: stages the bitmap as PNG and hands the file to the
/// `wallpaper` crate, falling back to desktop-environment tools on Linux.
pub struct DesktopPlatform {
    conf: Conf,
}

impl DesktopPlatform {
    pub fn new(conf: Conf) -> Self {
        Self { conf }
    }
}

impl WallpaperPlatform for DesktopPlatform {
    type Image = DecodedImage;

    fn capabilities(&self) -> Capabilities {
        // no Android API level here, and no separate lock screen
        Capabilities {
            sdk_version: 0,
            per_screen_targets: false,
        }
    }

    fn open_content(&self, uri: &str) -> Result<Box<dyn ContentStream + '_>> {
        Err(BridgeError::decode(
            format!("content URI {}", uri),
            "Unable to open input stream: no content resolver on this platform",
        ))
    }

    fn decode(&self, bytes: &[u8], origin: &str) -> Result<DecodedImage> {
        decode::from_bytes(bytes, origin)
    }

    fn apply(&self, image: &DecodedImage, placement: Placement) -> Result<()> {
        if placement != Placement::Whole {
            warn!("Placement {:?} not supported on desktop, setting whole wallpaper", placement);
        }

        let staged = self.conf.staged_wallpaper_file();
        image.save_png(&staged)?;
        let file_loc = staged.to_string_lossy();

        match wallpaper::set_from_path(&file_loc) {
            Ok(()) => {
                info!("Wallpaper set successfully to: {}", file_loc);
                Ok(())
            }
            Err(e) => {
                warn!("wallpaper crate failed ({}), trying desktop fallback", e);
                if set_wallpaper_fallback(&staged) {
                    Ok(())
                } else {
                    Err(BridgeError::platform("Failed to set wallpaper", e))
                }
            }
        }
    }

    fn desired_dimensions(&self) -> Dimensions {
        self.conf.fallback_dimensions()
    }
}

#[cfg(target_os = "linux")]
fn get_desktop_environment() -> String {
    let known = ["gnome", "unity", "cinnamon", "mate", "xfce4", "lxde", "fluxbox", "openbox", "jwm"];
    if let Ok(session) = std::env::var("DESKTOP_SESSION") {
        let session = session.to_lowercase();
        if known.contains(&session.as_str()) {
            return session;
        }
        let derived = if session.contains("xfce") || session.starts_with("xubuntu") {
            Some("xfce4")
        } else if session.starts_with("lubuntu") {
            Some("lxde")
        } else if session.starts_with("ubuntu") {
            Some("gnome")
        } else {
            None
        };
        if let Some(env) = derived {
            return env.to_string();
        }
    }

    if std::env::var_os("GNOME_DESKTOP_SESSION_ID").is_some() {
        return "gnome".to_string();
    }
    "unknown".to_string()
}

/// Runs one desktop tool. A tool that is missing or exits non-zero counts as
/// "did not set", so the caller can still report the original setter error.
#[cfg(target_os = "linux")]
fn run_tool(program: &str, args: &[&str]) -> bool {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            warn!("{} exited with {}", program, output.status);
            false
        }
        Err(e) => {
            warn!("Failed to run {}: {}", program, e);
            false
        }
    }
}

#[cfg(target_os = "linux")]
fn set_wallpaper_fallback(file_path: &Path) -> bool {
    set_wallpaper_with_tools(&get_desktop_environment(), &file_path.to_string_lossy())
}

#[cfg(target_os = "linux")]
fn set_wallpaper_with_tools(desktop_env: &str, file_loc: &str) -> bool {
    match desktop_env {
        "gnome" | "unity" | "cinnamon" => {
            let uri = format!("file://{}", file_loc);
            let light = run_tool("gsettings", &["set", "org.gnome.desktop.background", "picture-uri", &uri]);
            let dark = run_tool("gsettings", &["set", "org.gnome.desktop.background", "picture-uri-dark", &uri]);
            light || dark
        }
        "mate" => run_tool("gsettings", &["set", "org.mate.background", "picture-filename", file_loc]),
        "xfce4" => {
            let set = run_tool(
                "xfconf-query",
                &["-c", "xfce4-desktop", "-p", "/backdrop/screen0/monitor0/image-path", "-s", file_loc],
            );
            set && run_tool("xfdesktop", &["--reload"])
        }
        "lxde" => run_tool("pcmanfm", &["--set-wallpaper", file_loc, "--wallpaper-mode=scaled"]),
        "fluxbox" | "jwm" | "openbox" => run_tool("fbsetbg", &[file_loc]),
        other => {
            warn!("Desktop environment '{}' not supported", other);
            false
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn set_wallpaper_fallback(_file_path: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::WallpaperBridge;
    use crate::error::ErrorKind;
    use crate::request::{ScreenTarget, WallpaperRequest};

    fn platform(dir: &Path) -> DesktopPlatform {
        DesktopPlatform::new(Conf::with_dirs(dir.join("config"), dir.join("cache")).unwrap())
    }

    #[test]
    fn desktop_has_no_per_screen_targets() {
        let dir = tempfile::tempdir().unwrap();
        let caps = platform(dir.path()).capabilities();
        assert_eq!(caps.sdk_version, 0);
        assert!(!caps.per_screen_targets);
    }

    #[test]
    fn content_uris_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = WallpaperBridge::new(platform(dir.path()));
        let request = WallpaperRequest::from_path("content://media/7", ScreenTarget::Lock);
        let err = bridge.set_wallpaper(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailed);
    }

    #[test]
    fn dimensions_come_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = WallpaperBridge::new(platform(dir.path()));
        let dims = bridge.wallpaper_dimensions();
        assert_eq!((dims.width, dims.height), (1080, 1920));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_desktop_tool_is_not_an_error() {
        assert!(!run_tool("wallora-no-such-tool", &["--version"]));
        assert!(!set_wallpaper_with_tools("unknown", "/tmp/wall.png"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failing_desktop_tool_reports_not_set() {
        assert!(!run_tool("false", &[]));
        assert!(run_tool("true", &[]));
    }
}
