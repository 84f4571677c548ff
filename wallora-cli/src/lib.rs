pub use crate::app::WalloraCliApp;

mod app {
    use anyhow::{Context, Result};
    use log::{info, warn};
    use std::io::{BufRead, Write};
    use std::path::Path;
    use wallora_core::*;

    pub struct WalloraCliApp<P> {
        bridge: WallpaperBridge<P>,
    }

    impl WalloraCliApp<DesktopPlatform> {
        pub fn new() -> Result<Self> {
            let conf = Conf::new()?;
            info!("Using cache directory {}", conf.cache_dir.display());
            Ok(Self::with_platform(DesktopPlatform::new(conf)))
        }
    }

    impl<P: WallpaperPlatform> WalloraCliApp<P> {
        pub fn with_platform(platform: P) -> Self {
            Self {
                bridge: WallpaperBridge::new(platform),
            }
        }

        pub fn bridge(&self) -> &WallpaperBridge<P> {
            &self.bridge
        }

        pub fn set_wallpaper(
            &self,
            path: Option<&str>,
            bytes_file: Option<&Path>,
            screen: ScreenTarget,
        ) -> Result<()> {
            let image_bytes = match bytes_file {
                Some(file) => {
                    let raw = std::fs::read(file)
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    Some(raw.iter().map(|&b| b as i8).collect())
                }
                None => None,
            };

            let request = WallpaperRequest {
                source_path: path.map(str::to_string),
                image_bytes,
                screen_target: screen,
            };
            self.bridge.set_wallpaper(&request)?;
            Ok(())
        }

        /// Reads one JSON method call per line and answers each with one
        /// JSON line. Returns the number of calls handled.
        pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<usize> {
            let mut handled = 0;
            for line in input.lines() {
                let line = line.context("Failed to read method call")?;
                if line.trim().is_empty() {
                    continue;
                }

                let response = dispatch_json(&self.bridge, &line);
                writeln!(output, "{}", response).context("Failed to write method result")?;
                output.flush()?;
                handled += 1;
            }

            if handled == 0 {
                warn!("No method calls received");
            }
            Ok(handled)
        }
    }
}
