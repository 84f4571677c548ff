//! JNI entry points for `com.lunexo.app.wallora.WalloraBridge`.
//!
//! ```kotlin
//! object WalloraBridge {
//!     external fun nativeInit(context: Context): Boolean
//!     external fun nativeHandle(channel: String, method: String, arguments: String?): String
//! }
//! ```
//!
//! `nativeHandle` returns a JSON `MethodResult` that the activity forwards
//! to the Flutter `MethodChannel.Result`. `nativeInit` returns false for a
//! null context. Panics in either export are caught and reported as errors.

use std::sync::OnceLock;

use jni::objects::{JClass, JObject, JString};
use jni::sys::{jboolean, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::{error, info};
use serde_json::Value;

use crate::android_wallpaper::AndroidPlatform;
use crate::bridge::WallpaperBridge;
use crate::channel::{self, MethodCall, MethodResult};
use crate::conf::{Conf, Settings};
use crate::error::{BridgeError, Result};
use crate::guard;

static BRIDGE: OnceLock<WallpaperBridge<AndroidPlatform>> = OnceLock::new();

#[no_mangle]
pub extern "system" fn Java_com_lunexo_app_wallora_WalloraBridge_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
) -> jboolean {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("Wallora"),
    );

    if BRIDGE.get().is_some() {
        return JNI_TRUE;
    }

    let initialized = guard::catch_panic("nativeInit", || {
        guard::require_context(context.is_null())?;

        let fallback = match Conf::new() {
            Ok(conf) => conf.fallback_dimensions(),
            Err(e) => {
                error!("Failed to load configuration, using defaults: {:#}", e);
                Settings::default().dimensions()
            }
        };
        let platform = AndroidPlatform::new(&mut env, &context, fallback)?;
        let _ = BRIDGE.set(WallpaperBridge::new(platform));
        Ok(())
    });

    match initialized {
        Ok(()) => {
            info!("Wallora bridge initialized");
            JNI_TRUE
        }
        Err(e) => {
            error!("Failed to initialize wallpaper bridge: {}", e);
            JNI_FALSE
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_lunexo_app_wallora_WalloraBridge_nativeHandle<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    channel: JString<'local>,
    method: JString<'local>,
    arguments: JString<'local>,
) -> jstring {
    let result = guard::catch_panic("nativeHandle", || {
        let bridge = match BRIDGE.get() {
            Some(bridge) => bridge,
            None => return Ok(MethodResult::error("WalloraBridge.nativeInit has not been called")),
        };
        let call = read_call(&mut env, &channel, &method, &arguments)?;
        Ok(channel::dispatch(bridge, &call))
    })
    .unwrap_or_else(MethodResult::from);

    let json = match serde_json::to_string(&result) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to encode method result: {}", e);
            return std::ptr::null_mut();
        }
    };

    match env.new_string(json) {
        Ok(output) => JObject::from(output).into_raw(),
        Err(e) => {
            error!("Failed to create result string: {}", e);
            std::ptr::null_mut()
        }
    }
}

fn read_call(
    env: &mut JNIEnv,
    channel: &JString,
    method: &JString,
    arguments: &JString,
) -> Result<MethodCall> {
    let channel: String = read_string(env, channel)?;
    let method: String = read_string(env, method)?;
    let arguments = if arguments.is_null() {
        Value::Null
    } else {
        let raw = read_string(env, arguments)?;
        serde_json::from_str(&raw).map_err(|e| BridgeError::InvalidArguments(e.to_string()))?
    };

    Ok(MethodCall {
        channel,
        method,
        arguments,
    })
}

fn read_string(env: &mut JNIEnv, value: &JString) -> Result<String> {
    env.get_string(value)
        .map(String::from)
        .map_err(|e| BridgeError::InvalidArguments(format!("unreadable string: {}", e)))
}
