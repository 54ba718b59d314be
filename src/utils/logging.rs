use serde::Serialize;
use tracing::debug;

/// Logs `payload` as indented JSON under `what`, only when debug logging is on.
///
/// Serialization is skipped entirely when debug is off.
pub(crate) fn debug_payload<T: Serialize + ?Sized>(what: &str, payload: &T) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match serde_json::to_string_pretty(payload) {
        Ok(json) => debug!("{what}:\n{json}"),
        Err(e) => debug!(error = %e, "{what}: <unserializable payload>"),
    }
}
