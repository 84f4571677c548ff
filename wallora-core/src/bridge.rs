use std::io::Read;
use std::path::Path;

use log::{info, warn};

use crate::decode::to_raw_bytes;
use crate::error::{BridgeError, Result};
use crate::platform::{Bitmap, Capabilities, Dimensions, Placement, WallpaperPlatform};
use crate::request::{is_content_uri, ScreenTarget, WallpaperRequest};

/// Resolves wallpaper requests to encoded bytes, has the platform codec
/// decode them and hands the bitmap back to the platform.
pub struct WallpaperBridge<P> {
    platform: P,
    capabilities: Capabilities,
}

impl<P: WallpaperPlatform> WallpaperBridge<P> {
    pub fn new(platform: P) -> Self {
        let capabilities = platform.capabilities();
        info!(
            "Wallpaper bridge ready: sdk {}, per-screen targets {}",
            capabilities.sdk_version, capabilities.per_screen_targets
        );
        Self {
            platform,
            capabilities,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn set_wallpaper(&self, request: &WallpaperRequest) -> Result<()> {
        let image = self.resolve_image(request)?;

        let placement = Placement::resolve(request.screen_target, &self.capabilities);
        if placement == Placement::Whole && request.screen_target != ScreenTarget::Both {
            warn!(
                "Per-screen wallpapers unsupported on sdk {}, setting {:?} as whole-device wallpaper",
                self.capabilities.sdk_version, request.screen_target
            );
        }

        self.platform.apply(&image, placement)?;
        info!(
            "Wallpaper set ({}x{}, {:?})",
            image.width(),
            image.height(),
            placement
        );
        Ok(())
    }

    pub fn sdk_version(&self) -> i32 {
        self.capabilities.sdk_version
    }

    pub fn wallpaper_dimensions(&self) -> Dimensions {
        self.platform.desired_dimensions()
    }

    // Path takes priority over bytes when both are supplied.
    fn resolve_image(&self, request: &WallpaperRequest) -> Result<P::Image> {
        match (&request.source_path, &request.image_bytes) {
            (Some(path), _) => self.decode_path(path),
            (None, Some(bytes)) => self.platform.decode(&to_raw_bytes(bytes), "image from bytes"),
            (None, None) => Err(BridgeError::MissingInput),
        }
    }

    fn decode_path(&self, path: &str) -> Result<P::Image> {
        if is_content_uri(path) {
            info!("Decoding wallpaper from content URI {}", path);
            let origin = format!("content URI {}", path);
            let bytes = self.read_content(path, &origin)?;
            self.platform.decode(&bytes, &origin)
        } else {
            let file = Path::new(path);
            if !file.exists() {
                return Err(BridgeError::FileNotFound(file.to_path_buf()));
            }
            info!("Decoding wallpaper from file {}", path);
            let origin = format!("image file {}", path);
            let bytes = std::fs::read(file).map_err(|e| BridgeError::decode(origin.clone(), e))?;
            self.platform.decode(&bytes, &origin)
        }
    }

    fn read_content(&self, uri: &str, origin: &str) -> Result<Vec<u8>> {
        let mut stream = self.platform.open_content(uri).map_err(|e| match e {
            failed @ BridgeError::DecodeFailed { .. } => failed,
            other => BridgeError::decode(origin, format!("Unable to open input stream: {}", other)),
        })?;

        let mut bytes = Vec::new();
        stream
            .read_to_end(&mut bytes)
            .map_err(|e| BridgeError::decode(origin, e))?;
        // stream is dropped, and so closed, when this returns
        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::decode::{self, tests::png_bytes, DecodedImage};
    use crate::error::ErrorKind;
    use crate::platform::ContentStream;
    use image::DynamicImage;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::rc::Rc;

    /// Magic prefix only the fake platform codec understands, standing in
    /// for formats such as HEIC that the OS decodes but `image` does not.
    pub(crate) const PLATFORM_ONLY_MAGIC: &[u8] = b"\0\0\0\x18ftypheic";

    /// Records every apply call instead of touching the OS.
    pub(crate) struct FakePlatform {
        pub capabilities: Capabilities,
        pub dimensions: Dimensions,
        pub content: HashMap<String, Vec<u8>>,
        pub applied: RefCell<Vec<(Placement, u32, u32)>>,
        pub open_streams: Rc<Cell<i32>>,
        pub fail_apply: bool,
    }

    impl FakePlatform {
        pub(crate) fn new(sdk_version: i32) -> Self {
            Self {
                capabilities: Capabilities::for_android_sdk(sdk_version),
                dimensions: Dimensions {
                    width: 1440,
                    height: 3120,
                },
                content: HashMap::new(),
                applied: RefCell::new(Vec::new()),
                open_streams: Rc::new(Cell::new(0)),
                fail_apply: false,
            }
        }
    }

    struct TrackedStream {
        inner: Cursor<Vec<u8>>,
        open: Rc<Cell<i32>>,
    }

    impl Read for TrackedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for TrackedStream {
        fn drop(&mut self) {
            self.open.set(self.open.get() - 1);
        }
    }

    impl WallpaperPlatform for FakePlatform {
        type Image = DecodedImage;

        fn capabilities(&self) -> Capabilities {
            self.capabilities
        }

        fn open_content(&self, uri: &str) -> Result<Box<dyn ContentStream + '_>> {
            let bytes = self
                .content
                .get(uri)
                .ok_or_else(|| BridgeError::platform("openInputStream", "no such content"))?;
            self.open_streams.set(self.open_streams.get() + 1);
            Ok(Box::new(TrackedStream {
                inner: Cursor::new(bytes.clone()),
                open: Rc::clone(&self.open_streams),
            }))
        }

        fn decode(&self, bytes: &[u8], origin: &str) -> Result<DecodedImage> {
            if bytes.starts_with(PLATFORM_ONLY_MAGIC) {
                return Ok(DecodedImage::from(DynamicImage::new_rgba8(6, 8)));
            }
            decode::from_bytes(bytes, origin)
        }

        fn apply(&self, image: &DecodedImage, placement: Placement) -> Result<()> {
            if self.fail_apply {
                return Err(BridgeError::platform("Failed to set wallpaper bitmap", "denied"));
            }
            self.applied
                .borrow_mut()
                .push((placement, image.width(), image.height()));
            Ok(())
        }

        fn desired_dimensions(&self) -> Dimensions {
            self.dimensions
        }
    }

    fn signed(bytes: &[u8]) -> Vec<i8> {
        bytes.iter().map(|&b| b as i8).collect()
    }

    #[test]
    fn every_valid_screen_succeeds_with_bytes() {
        let bridge = WallpaperBridge::new(FakePlatform::new(34));
        for target in [ScreenTarget::Lock, ScreenTarget::Home, ScreenTarget::Both] {
            let request = WallpaperRequest::from_bytes(&png_bytes(2, 2), target);
            bridge.set_wallpaper(&request).unwrap();
        }
        let applied = bridge.platform().applied.borrow();
        let placements: Vec<Placement> = applied.iter().map(|a| a.0).collect();
        assert_eq!(placements, vec![Placement::Lock, Placement::Home, Placement::Whole]);
    }

    #[test]
    fn old_sdk_sets_whole_device_for_lock() {
        let bridge = WallpaperBridge::new(FakePlatform::new(23));
        let request = WallpaperRequest::from_bytes(&png_bytes(2, 2), ScreenTarget::Lock);
        bridge.set_wallpaper(&request).unwrap();
        assert_eq!(bridge.platform().applied.borrow()[0].0, Placement::Whole);
    }

    #[test]
    fn missing_input_is_reported() {
        let bridge = WallpaperBridge::new(FakePlatform::new(34));
        let err = bridge.set_wallpaper(&WallpaperRequest::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
        assert!(bridge.platform().applied.borrow().is_empty());
    }

    #[test]
    fn nonexistent_file_is_reported() {
        let bridge = WallpaperBridge::new(FakePlatform::new(34));
        let request = WallpaperRequest::from_path("/definitely/not/here.png", ScreenTarget::Home);
        let err = bridge.set_wallpaper(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn file_path_is_decoded_and_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.png");
        std::fs::write(&path, png_bytes(5, 3)).unwrap();

        let bridge = WallpaperBridge::new(FakePlatform::new(34));
        let request = WallpaperRequest::from_path(path.to_string_lossy(), ScreenTarget::Both);
        bridge.set_wallpaper(&request).unwrap();
        assert_eq!(bridge.platform().applied.borrow()[0], (Placement::Whole, 5, 3));
    }

    #[test]
    fn path_wins_over_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.png");
        std::fs::write(&path, png_bytes(7, 1)).unwrap();
        let bridge = WallpaperBridge::new(FakePlatform::new(34));

        // valid path, garbage bytes
        let request = WallpaperRequest {
            source_path: Some(path.to_string_lossy().into_owned()),
            image_bytes: Some(vec![1, 2, 3]),
            screen_target: ScreenTarget::Both,
        };
        bridge.set_wallpaper(&request).unwrap();
        assert_eq!(bridge.platform().applied.borrow()[0].1, 7);

        // missing path, valid bytes
        let request = WallpaperRequest {
            source_path: Some("/missing/wall.png".to_string()),
            image_bytes: Some(signed(&png_bytes(2, 2))),
            screen_target: ScreenTarget::Both,
        };
        let err = bridge.set_wallpaper(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(bridge.platform().applied.borrow().len(), 1);
    }

    #[test]
    fn content_uri_stream_is_closed_on_success_and_failure() {
        let mut platform = FakePlatform::new(34);
        platform
            .content
            .insert("content://media/1".to_string(), png_bytes(3, 3));
        platform
            .content
            .insert("content://media/2".to_string(), b"garbage".to_vec());
        let bridge = WallpaperBridge::new(platform);

        let ok = WallpaperRequest::from_path("content://media/1", ScreenTarget::Home);
        bridge.set_wallpaper(&ok).unwrap();
        assert_eq!(bridge.platform().open_streams.get(), 0);

        let bad = WallpaperRequest::from_path("content://media/2", ScreenTarget::Home);
        let err = bridge.set_wallpaper(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailed);
        assert_eq!(bridge.platform().open_streams.get(), 0);
    }

    #[test]
    fn unopenable_content_uri_is_a_decode_failure() {
        let bridge = WallpaperBridge::new(FakePlatform::new(34));
        let request = WallpaperRequest::from_path("content://media/404", ScreenTarget::Both);
        let err = bridge.set_wallpaper(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailed);
        assert!(err.to_string().contains("Unable to open input stream"));
    }

    #[test]
    fn platform_failure_is_surfaced() {
        let mut platform = FakePlatform::new(34);
        platform.fail_apply = true;
        let bridge = WallpaperBridge::new(platform);
        let request = WallpaperRequest::from_bytes(&png_bytes(1, 1), ScreenTarget::Both);
        let err = bridge.set_wallpaper(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Platform);
    }

    #[test]
    fn system_queries_are_stable() {
        let bridge = WallpaperBridge::new(FakePlatform::new(31));
        assert_eq!(bridge.sdk_version(), 31);
        assert_eq!(bridge.sdk_version(), 31);
        let dims = bridge.wallpaper_dimensions();
        assert_eq!(dims, bridge.wallpaper_dimensions());
        assert_eq!((dims.width, dims.height), (1440, 3120));
    }

    #[test]
    fn formats_only_the_platform_decodes_are_accepted() {
        let mut heic = PLATFORM_ONLY_MAGIC.to_vec();
        heic.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

        let mut platform = FakePlatform::new(34);
        platform
            .content
            .insert("content://media/heic".to_string(), heic.clone());
        let bridge = WallpaperBridge::new(platform);

        let from_uri = WallpaperRequest::from_path("content://media/heic", ScreenTarget::Lock);
        bridge.set_wallpaper(&from_uri).unwrap();

        let from_bytes = WallpaperRequest::from_bytes(&heic, ScreenTarget::Home);
        bridge.set_wallpaper(&from_bytes).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.heic");
        std::fs::write(&path, &heic).unwrap();
        let from_file = WallpaperRequest::from_path(path.to_string_lossy(), ScreenTarget::Both);
        bridge.set_wallpaper(&from_file).unwrap();

        let applied = bridge.platform().applied.borrow();
        assert_eq!(
            *applied,
            vec![
                (Placement::Lock, 6, 8),
                (Placement::Home, 6, 8),
                (Placement::Whole, 6, 8)
            ]
        );
    }
}
