// Service seam between the bridge and the OS wallpaper facility
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::ScreenTarget;

/// First Android API level (N) with per-screen `setBitmap` flags.
pub const PER_SCREEN_MIN_SDK: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

/// What the running OS supports, resolved once when the bridge is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub sdk_version: i32,
    pub per_screen_targets: bool,
}

impl Capabilities {
    pub fn for_android_sdk(sdk_version: i32) -> Self {
        Self {
            sdk_version,
            per_screen_targets: sdk_version >= PER_SCREEN_MIN_SDK,
        }
    }
}

/// Where the platform actually writes the bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Lock,
    Home,
    Whole,
}

impl Placement {
    pub fn resolve(target: ScreenTarget, capabilities: &Capabilities) -> Self {
        match target {
            ScreenTarget::Lock if capabilities.per_screen_targets => Placement::Lock,
            ScreenTarget::Home if capabilities.per_screen_targets => Placement::Home,
            ScreenTarget::Lock | ScreenTarget::Home | ScreenTarget::Both => Placement::Whole,
        }
    }
}

/// Readable handle for a content-reference URI. Dropping it closes it.
pub trait ContentStream: Read {}

impl<T: Read> ContentStream for T {}

/// A decoded bitmap, whatever the platform codec produced.
pub trait Bitmap {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

pub trait WallpaperPlatform {
    type Image: Bitmap;

    fn capabilities(&self) -> Capabilities;

    fn open_content(&self, uri: &str) -> Result<Box<dyn ContentStream + '_>>;

    /// Decodes encoded image bytes with the platform codec. `origin` names
    /// the source in error messages.
    fn decode(&self, bytes: &[u8], origin: &str) -> Result<Self::Image>;

    fn apply(&self, image: &Self::Image, placement: Placement) -> Result<()>;

    /// Must not fail; backends fall back to configured dimensions.
    fn desired_dimensions(&self) -> Dimensions;
}
