use std::io::Cursor;

use jni::objects::{GlobalRef, JObject, JValue};
use jni::{JNIEnv, JavaVM};
use log::{info, warn};

use crate::android_system::{
    desired_minimum_size, display_size, read_sdk_version, wallpaper_manager, JniResultExt,
};
use crate::error::{BridgeError, Result};
use crate::platform::{
    Bitmap, Capabilities, ContentStream, Dimensions, Placement, WallpaperPlatform,
};

// WallpaperManager.FLAG_SYSTEM / FLAG_LOCK
const FLAG_SYSTEM: i32 = 1;
const FLAG_LOCK: i32 = 2;

const READ_CHUNK: usize = 16 * 1024;

/// `android.graphics.Bitmap` produced by `BitmapFactory`, held as a global
/// reference until it is applied and recycled.
pub struct AndroidBitmap {
    bitmap: GlobalRef,
    width: u32,
    height: u32,
}

impl Bitmap for AndroidBitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Android backend talking to `WallpaperManager` and `ContentResolver` over JNI.
pub struct AndroidPlatform {
    vm: JavaVM,
    context: GlobalRef,
    capabilities: Capabilities,
    fallback: Dimensions,
}

impl AndroidPlatform {
    pub fn new(env: &mut JNIEnv, context: &JObject, fallback: Dimensions) -> Result<Self> {
        let vm = env
            .get_java_vm()
            .step("Expected to find JVM from JNI environment")?;
        let context = env
            .new_global_ref(context)
            .step("Failed to keep a reference to the application context")?;
        let sdk_version = read_sdk_version(env)?;

        Ok(Self {
            vm,
            context,
            capabilities: Capabilities::for_android_sdk(sdk_version),
            fallback,
        })
    }

    fn with_env<T>(&self, f: impl FnOnce(&mut JNIEnv) -> Result<T>) -> Result<T> {
        let mut env = self
            .vm
            .attach_current_thread()
            .step("Failed to attach current thread")?;

        let result = f(&mut env);
        if result.is_err() {
            clear_exception(&mut env);
        }
        result
    }
}

impl WallpaperPlatform for AndroidPlatform {
    type Image = AndroidBitmap;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn open_content(&self, uri: &str) -> Result<Box<dyn ContentStream + '_>> {
        let bytes = self.with_env(|env| read_content_uri(env, self.context.as_obj(), uri))?;
        info!("Read {} bytes from {}", bytes.len(), uri);
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn decode(&self, bytes: &[u8], origin: &str) -> Result<AndroidBitmap> {
        self.with_env(|env| decode_bitmap(env, bytes, origin))
    }

    fn apply(&self, image: &AndroidBitmap, placement: Placement) -> Result<()> {
        self.with_env(|env| {
            let manager = wallpaper_manager(env, self.context.as_obj())?;
            let bitmap = image.bitmap.as_obj();

            let result = set_bitmap(env, &manager, bitmap, placement);
            if result.is_err() {
                clear_exception(env);
            }
            if env.call_method(bitmap, "recycle", "()V", &[]).is_err() {
                clear_exception(env);
                warn!("Failed to recycle wallpaper bitmap");
            }
            result
        })
    }

    fn desired_dimensions(&self) -> Dimensions {
        let context = self.context.as_obj();
        let queried = self.with_env(|env| {
            let desired = desired_minimum_size(env, context)?;
            if desired.width > 0 && desired.height > 0 {
                return Ok(desired);
            }
            display_size(env, context)
        });

        match queried {
            Ok(dims) => dims,
            Err(e) => {
                warn!("Wallpaper dimensions unavailable ({}), using {:?}", e, self.fallback);
                self.fallback
            }
        }
    }
}

fn clear_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

fn read_content_uri(env: &mut JNIEnv, context: &JObject, uri: &str) -> Result<Vec<u8>> {
    let uri_string = JObject::from(env.new_string(uri).step("Failed to create URI string")?);
    let parsed = env
        .call_static_method(
            "android/net/Uri",
            "parse",
            "(Ljava/lang/String;)Landroid/net/Uri;",
            &[JValue::Object(&uri_string)],
        )
        .step("Failed to parse content URI")?
        .l()
        .step("Failed to get Uri object")?;

    let resolver = env
        .call_method(
            context,
            "getContentResolver",
            "()Landroid/content/ContentResolver;",
            &[],
        )
        .step("Failed to get ContentResolver")?
        .l()
        .step("Failed to get ContentResolver object")?;

    let stream = env
        .call_method(
            &resolver,
            "openInputStream",
            "(Landroid/net/Uri;)Ljava/io/InputStream;",
            &[JValue::Object(&parsed)],
        )
        .step("Unable to open input stream")?
        .l()
        .step("Failed to get InputStream object")?;
    if stream.is_null() {
        return Err(BridgeError::decode(
            format!("content URI {}", uri),
            "Unable to open input stream",
        ));
    }

    let result = drain_stream(env, &stream);
    if result.is_err() {
        clear_exception(env);
    }
    if env.call_method(&stream, "close", "()V", &[]).is_err() {
        clear_exception(env);
        warn!("Failed to close input stream for {}", uri);
    }
    result
}

fn drain_stream(env: &mut JNIEnv, stream: &JObject) -> Result<Vec<u8>> {
    let chunk = env
        .new_byte_array(READ_CHUNK as i32)
        .step("Failed to create Java byte array")?;
    let chunk_obj: &JObject = &chunk;
    let mut buf = vec![0i8; READ_CHUNK];
    let mut out = Vec::new();

    loop {
        let read = env
            .call_method(stream, "read", "([B)I", &[JValue::Object(chunk_obj)])
            .step("Failed to read content stream")?
            .i()
            .step("Failed to convert read count to int")?;
        if read < 0 {
            break;
        }
        let read = read as usize;
        env.get_byte_array_region(&chunk, 0, &mut buf[..read])
            .step("Failed to copy stream bytes")?;
        out.extend(buf[..read].iter().map(|&b| b as u8));
    }

    Ok(out)
}

fn decode_bitmap(env: &mut JNIEnv, bytes: &[u8], origin: &str) -> Result<AndroidBitmap> {
    let length = i32::try_from(bytes.len())
        .map_err(|_| BridgeError::decode(origin, "image data too large"))?;
    let data = env
        .byte_array_from_slice(bytes)
        .step("Failed to create Java byte array")?;
    let data_obj: &JObject = &data;

    let bitmap = env
        .call_static_method(
            "android/graphics/BitmapFactory",
            "decodeByteArray",
            "([BII)Landroid/graphics/Bitmap;",
            &[JValue::Object(data_obj), JValue::Int(0), JValue::Int(length)],
        )
        .step("Failed to decode bitmap")?
        .l()
        .step("Failed to get bitmap object")?;
    if bitmap.is_null() {
        return Err(BridgeError::decode(origin, "Failed to create bitmap from image data"));
    }

    let width = bitmap_dimension(env, &bitmap, "getWidth")?;
    let height = bitmap_dimension(env, &bitmap, "getHeight")?;
    let bitmap = env
        .new_global_ref(bitmap)
        .step("Failed to keep a reference to the decoded bitmap")?;
    info!("Decoded {}x{} bitmap from {} ({} bytes)", width, height, origin, bytes.len());

    Ok(AndroidBitmap {
        bitmap,
        width,
        height,
    })
}

fn bitmap_dimension(env: &mut JNIEnv, bitmap: &JObject, getter: &str) -> Result<u32> {
    let value = env
        .call_method(bitmap, getter, "()I", &[])
        .step("Failed to read bitmap size")?
        .i()
        .step("Failed to convert bitmap size to int")?;
    Ok(u32::try_from(value).unwrap_or(0))
}

fn set_bitmap(env: &mut JNIEnv, manager: &JObject, bitmap: &JObject, placement: Placement) -> Result<()> {
    let flag = match placement {
        Placement::Whole => {
            env.call_method(
                manager,
                "setBitmap",
                "(Landroid/graphics/Bitmap;)V",
                &[JValue::Object(bitmap)],
            )
            .step("Failed to set wallpaper bitmap")?;
            info!("Setting whole-device wallpaper from bitmap has done.");
            return Ok(());
        }
        Placement::Lock => FLAG_LOCK,
        Placement::Home => FLAG_SYSTEM,
    };

    let no_crop = JObject::null();
    let id = env
        .call_method(
            manager,
            "setBitmap",
            "(Landroid/graphics/Bitmap;Landroid/graphics/Rect;ZI)I",
            &[
                JValue::Object(bitmap),
                JValue::Object(&no_crop),
                JValue::Bool(1),
                JValue::Int(flag),
            ],
        )
        .step("Failed to set wallpaper bitmap")?
        .i()
        .step("Failed to convert wallpaper id to int")?;

    if id == 0 {
        warn!("WallpaperManager returned id 0 for {:?}", placement);
    } else {
        info!("Setting {:?} wallpaper from bitmap has done (id {}).", placement, id);
    }
    Ok(())
}
