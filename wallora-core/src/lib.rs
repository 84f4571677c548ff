//! Wallpaper bridge between a cross-platform UI layer and the OS wallpaper
//! facility: decode an image from a file, content URI or byte list and set
//! it on the lock screen, home screen or both.

pub mod bridge;
pub mod channel;
pub mod conf;
pub mod decode;
pub mod error;
pub mod guard;
pub mod platform;
pub mod request;

#[cfg(not(target_os = "android"))]
pub mod desktop;

// Android wallpaper management modules
#[cfg(target_os = "android")]
mod android_system;
#[cfg(target_os = "android")]
mod android_wallpaper;
#[cfg(target_os = "android")]
mod jni_bridge;

pub use bridge::WallpaperBridge;
pub use channel::{dispatch, dispatch_json, MethodCall, MethodResult, SYSTEM_CHANNEL, WALLPAPER_CHANNEL};
pub use conf::{Conf, Settings};
pub use decode::DecodedImage;
pub use error::{BridgeError, ErrorKind};
pub use platform::{Bitmap, Capabilities, Dimensions, Placement, WallpaperPlatform};
pub use request::{ScreenTarget, WallpaperRequest};

#[cfg(not(target_os = "android"))]
pub use desktop::DesktopPlatform;

#[cfg(target_os = "android")]
pub use android_wallpaper::{AndroidBitmap, AndroidPlatform};
