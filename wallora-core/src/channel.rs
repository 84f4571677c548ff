//! Method-channel dispatch: maps a `(channel, method, arguments)` call from
//! the UI layer onto the bridge and answers with a [`MethodResult`].
//!
//! Two channels exist. `com.lunexo.app.wallpaper` carries `setWallpaper`,
//! `com.lunexo.app.system` carries `getAndroidSdkVersion` and
//! `getWallpaperDimensions`. Anything else is `not_implemented`.

use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::WallpaperBridge;
use crate::error::BridgeError;
use crate::platform::WallpaperPlatform;
use crate::request::{SetWallpaperArgs, WallpaperRequest};

pub const WALLPAPER_CHANNEL: &str = "com.lunexo.app.wallpaper";
pub const SYSTEM_CHANNEL: &str = "com.lunexo.app.system";

pub const ERROR_CODE: &str = "ERROR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub channel: String,
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(channel: &str, method: &str, arguments: Value) -> Self {
        Self {
            channel: channel.to_string(),
            method: method.to_string(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResult {
    Success {
        value: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default)]
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResult::Success {
            value: value.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        MethodResult::Error {
            code: ERROR_CODE.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<BridgeError> for MethodResult {
    fn from(err: BridgeError) -> Self {
        MethodResult::error(err.to_string())
    }
}

pub fn dispatch<P: WallpaperPlatform>(bridge: &WallpaperBridge<P>, call: &MethodCall) -> MethodResult {
    match (call.channel.as_str(), call.method.as_str()) {
        (WALLPAPER_CHANNEL, "setWallpaper") => set_wallpaper(bridge, &call.arguments),
        (SYSTEM_CHANNEL, "getAndroidSdkVersion") => MethodResult::success(bridge.sdk_version()),
        (SYSTEM_CHANNEL, "getWallpaperDimensions") => {
            match serde_json::to_value(bridge.wallpaper_dimensions()) {
                Ok(value) => MethodResult::success(value),
                Err(e) => MethodResult::error(e.to_string()),
            }
        }
        (channel, method) => {
            warn!("No handler for {}#{}", channel, method);
            MethodResult::NotImplemented
        }
    }
}

fn set_wallpaper<P: WallpaperPlatform>(bridge: &WallpaperBridge<P>, arguments: &Value) -> MethodResult {
    let result = parse_set_wallpaper(arguments).and_then(|request| bridge.set_wallpaper(&request));
    match result {
        Ok(()) => MethodResult::success(true),
        Err(e) => {
            error!("setWallpaper failed: {}", e);
            e.into()
        }
    }
}

fn parse_set_wallpaper(arguments: &Value) -> Result<WallpaperRequest, BridgeError> {
    let args = if arguments.is_null() {
        SetWallpaperArgs::default()
    } else {
        SetWallpaperArgs::deserialize(arguments)
            .map_err(|e| BridgeError::InvalidArguments(e.to_string()))?
    };
    WallpaperRequest::try_from(args)
}

/// Handles one JSON-encoded call and always returns a JSON-encoded result.
pub fn dispatch_json<P: WallpaperPlatform>(bridge: &WallpaperBridge<P>, call_json: &str) -> String {
    let result = match serde_json::from_str::<MethodCall>(call_json) {
        Ok(call) => dispatch(bridge, &call),
        Err(e) => MethodResult::error(format!("Malformed method call: {}", e)),
    };
    serde_json::to_string(&result).unwrap_or_else(|e| {
        format!(
            r#"{{"status":"error","code":"{}","message":"{}"}}"#,
            ERROR_CODE,
            e.to_string().replace('"', "'")
        )
    })
}
