use jni::objects::{JObject, JValue};
use jni::JNIEnv;

use crate::error::{BridgeError, Result};
use crate::platform::Dimensions;

pub(crate) trait JniResultExt<T> {
    fn step(self, step: &str) -> Result<T>;
}

impl<T> JniResultExt<T> for jni::errors::Result<T> {
    fn step(self, step: &str) -> Result<T> {
        self.map_err(|e| BridgeError::platform(step, e))
    }
}

/// `Build.VERSION.SDK_INT`
pub(crate) fn read_sdk_version(env: &mut JNIEnv) -> Result<i32> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .step("Failed to read Build.VERSION.SDK_INT")?
        .i()
        .step("Failed to convert SDK_INT to int")
}

pub(crate) fn wallpaper_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
) -> Result<JObject<'local>> {
    env.call_static_method(
        "android/app/WallpaperManager",
        "getInstance",
        "(Landroid/content/Context;)Landroid/app/WallpaperManager;",
        &[JValue::Object(context)],
    )
    .step("Failed to get WallpaperManager instance")?
    .l()
    .step("Failed to get wallpaper manager object")
}

/// Desired minimum wallpaper size as reported by `WallpaperManager`.
/// Either value may be zero or negative when the launcher never set a hint.
pub(crate) fn desired_minimum_size(env: &mut JNIEnv, context: &JObject) -> Result<Dimensions> {
    let manager = wallpaper_manager(env, context)?;

    let width = env
        .call_method(&manager, "getDesiredMinimumWidth", "()I", &[])
        .step("Failed to get desired minimum width")?
        .i()
        .step("Failed to convert width to int")?;
    let height = env
        .call_method(&manager, "getDesiredMinimumHeight", "()I", &[])
        .step("Failed to get desired minimum height")?
        .i()
        .step("Failed to convert height to int")?;

    Ok(Dimensions { width, height })
}

/// Physical display size from `Resources.getDisplayMetrics()`.
pub(crate) fn display_size(env: &mut JNIEnv, context: &JObject) -> Result<Dimensions> {
    let resources = env
        .call_method(context, "getResources", "()Landroid/content/res/Resources;", &[])
        .step("Failed to get Resources")?
        .l()
        .step("Failed to get Resources object")?;

    let metrics = env
        .call_method(
            &resources,
            "getDisplayMetrics",
            "()Landroid/util/DisplayMetrics;",
            &[],
        )
        .step("Failed to get display metrics")?
        .l()
        .step("Failed to get DisplayMetrics object")?;

    let width = env
        .get_field(&metrics, "widthPixels", "I")
        .step("Failed to get width pixels")?
        .i()
        .step("Failed to convert width to int")?;
    let height = env
        .get_field(&metrics, "heightPixels", "I")
        .step("Failed to get height pixels")?
        .i()
        .step("Failed to convert height to int")?;

    Ok(Dimensions { width, height })
}
