// Checks run at the native boundary before anything touches the bridge
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{BridgeError, Result};

/// Runs `f`, turning a panic into a `Platform` error. A panic must never
/// unwind out of an `extern "system"` export, the process would abort.
pub fn catch_panic<T>(step: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(BridgeError::platform(
            step,
            format!("panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

/// `nativeInit` needs the application `Context`; there is no other source
/// for it in a plain JNI library.
pub fn require_context(context_is_null: bool) -> Result<()> {
    if context_is_null {
        return Err(BridgeError::Platform(
            "nativeInit called without a Context".to_string(),
        ));
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
