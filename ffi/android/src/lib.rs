#![allow(clippy::missing_safety_doc)]

#[macro_use]
extern crate log;
#[cfg(target_os = "android")]
extern crate android_log;

use std::ptr::null_mut;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jni::objects::{GlobalRef, JClass, JObject, JString};
use jni::sys::{jboolean, jbyteArray, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::{JNIEnv, JavaVM};

use hce::apdu::{Handler, StatusWord};
use hce::manager::{self, Arguments};
use hce::{LifecycleEvent, Manager, Platform, Responder, Session};

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("Management Error: {0}")]
    Manager(#[from] manager::Error),

    #[error("JNI Error: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Asks the app layer about the device capabilities through the delegate.
/// The delegate must implement `boolean isHceSupported()` and `boolean isHceEnabled()`.
struct JniPlatform {
    vm: JavaVM,
    delegate: GlobalRef,
}

impl JniPlatform {
    fn query(&self, method: &str) -> bool {
        let result = (|| -> Result<bool, Error> {
            let env = self.vm.attach_current_thread()?;
            let value = env.call_method(self.delegate.as_obj(), method, "()Z", &[])?;

            Ok(value.z()?)
        })();

        result.unwrap_or_else(|e| {
            error!("{} Error: {}", method, e);
            false
        })
    }
}

impl Platform for JniPlatform {
    fn is_supported(&self) -> bool {
        self.query("isHceSupported")
    }

    fn is_enabled(&self) -> bool {
        self.query("isHceEnabled")
    }
}

/// Everything the Java side holds through an opaque handle.
struct Bridge {
    responder: Responder,
    manager: Manager<JniPlatform>,
    events: Mutex<Option<Receiver<LifecycleEvent>>>,
    last_error: Mutex<Option<String>>,
}

impl Bridge {
    fn new(platform: JniPlatform) -> Self {
        let session = Arc::new(Session::new());

        Self {
            responder: Responder::new(Arc::clone(&session)),
            manager: Manager::new(session, platform),
            events: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    fn session(&self) -> &Session {
        self.responder.session()
    }

    fn events(&self) -> MutexGuard<'_, Option<Receiver<LifecycleEvent>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the closure, records its error as the last error, and falls back to the default.
    fn wrap<T>(&self, default: T, inner: impl FnOnce() -> Result<T, Error>) -> T {
        let result = inner();

        // Clears the last error on success.
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = result.as_ref().err().map(|e| e.to_string());

        match result {
            Ok(value) => value,
            Err(e) => {
                error!("{}", e);
                default
            }
        }
    }
}

/// Resolves the handle returned by `newSession`, which is zero when the creation failed.
unsafe fn bridge<'a>(handle: jlong) -> Option<&'a Bridge> {
    let bridge = (handle as *const Bridge).as_ref();
    if bridge.is_none() {
        error!("Called with a null session handle");
    }

    bridge
}

fn to_jboolean(value: bool) -> jboolean {
    match value {
        true => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

fn jstring_to_string(env: JNIEnv, str: jstring) -> Result<Option<String>, Error> {
    if str.is_null() {
        return Ok(None);
    }

    Ok(Some(
        env.get_string(unsafe { JString::from_raw(str) })?.into(),
    ))
}

#[no_mangle]
pub extern "C" fn Java_jp_s6n_hce_ffi_LibHce_init() {
    #[cfg(target_os = "android")]
    if let Err(e) = android_log::init("HCE.FFI") {
        eprintln!("Could not initialise the logger: {}", e);
    }
}

/// Creates the session and returns its handle, or zero on failure.
#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_newSession(
    env: JNIEnv,
    _class: JClass,
    delegate: JObject,
) -> jlong {
    let platform = (|| -> Result<JniPlatform, Error> {
        Ok(JniPlatform {
            vm: env.get_java_vm()?,
            delegate: env.new_global_ref(delegate)?,
        })
    })();

    match platform {
        Ok(platform) => Box::into_raw(Box::new(Bridge::new(platform))) as jlong,
        Err(e) => {
            error!("newSession Error: {}", e);
            0
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_lastError(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let Some(bridge) = bridge(handle) else {
        return null_mut();
    };

    let message = bridge
        .last_error
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match message.map(|m| env.new_string(m)) {
        Some(Ok(s)) => s.into_raw(),
        _ => null_mut(),
    }
}

/// Answers a command APDU delivered by `HostApduService.processCommandApdu`.
/// Always returns a response frame unless the JVM itself fails.
#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_processCommandApdu(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
    command: jbyteArray,
) -> jbyteArray {
    let Some(bridge) = bridge(handle) else {
        let response = <[u8; 2]>::from(StatusWord::UnknownCommand);
        return env.byte_array_from_slice(&response).unwrap_or(null_mut());
    };

    bridge.wrap(null_mut(), || {
        let response = if command.is_null() {
            <[u8; 2]>::from(StatusWord::UnknownCommand).to_vec()
        } else {
            let command = env.convert_byte_array(command)?;
            bridge.responder.handle(&command)
        };

        debug!("APDU Response: {:02x?}", response);

        Ok(env.byte_array_from_slice(&response)?)
    })
}

/// Forwards `HostApduService.onDeactivated`.
#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_onDeactivated(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
    reason: jint,
) {
    if let Some(bridge) = bridge(handle) {
        bridge.session().deactivate(reason);
    }
}

/// Forwards `HostApduService.onDestroy`.
#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_onDestroy(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    if let Some(bridge) = bridge(handle) {
        bridge.session().shutdown();
    }
}

/// Calls a management method by its channel name, e.g. `startEmulation`.
/// Returns false and records the last error when the call fails.
#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_methodCall(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
    method: jstring,
    uid: jstring,
    data: jstring,
    technology: jstring,
) -> jboolean {
    let Some(bridge) = bridge(handle) else {
        return JNI_FALSE;
    };

    bridge.wrap(JNI_FALSE, || {
        let method = jstring_to_string(env, method)?.unwrap_or_default();
        let args = Arguments {
            uid: jstring_to_string(env, uid)?,
            data: jstring_to_string(env, data)?,
            technology: jstring_to_string(env, technology)?,
        };

        Ok(to_jboolean(bridge.manager.call(&method, &args)?))
    })
}

/// Starts listening to lifecycle events, replacing the previous listener.
#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_listen(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    let Some(bridge) = bridge(handle) else {
        return;
    };

    *bridge.events() = Some(bridge.session().subscribe());
}

#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_cancel(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    let Some(bridge) = bridge(handle) else {
        return;
    };

    bridge.session().unsubscribe();
    bridge.events().take();
}

/// Takes the next pending lifecycle event as JSON, or null when there is none.
#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_pollEvent(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let Some(bridge) = bridge(handle) else {
        return null_mut();
    };

    bridge.wrap(null_mut(), || {
        let event = match bridge.events().as_ref().and_then(|rx| rx.try_recv().ok()) {
            Some(event) => event,
            None => return Ok(null_mut()),
        };

        Ok(env.new_string(serde_json::to_string(&event)?)?.into_raw())
    })
}

#[no_mangle]
pub unsafe extern "C" fn Java_jp_s6n_hce_ffi_LibHce_close(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    if handle != 0 {
        let _ = Box::from_raw(handle as *mut Bridge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(unsafe { bridge(0) }.is_none());
    }
}
