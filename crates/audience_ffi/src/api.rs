//! FFI use-case API for host-facing audience picker calls.
//!
//! # Responsibility
//! - Expose the picker to Dart via FRB as handle-based, synchronous calls.
//! - Translate host strings (JSON payloads, level names) into core types.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every picker mutation holds the registry lock, so toggles from several
//!   host threads are serialized.
//! - Selection and expansion snapshots are returned as UTF-8 JSON strings.

use audience_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_level,
    ping as ping_inner, AudiencePicker, Catalog, Level, PickerConfig, RestrictedView,
    SavedSelection,
};
use log::warn;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

static PICKERS: Lazy<Mutex<PickerRegistry>> = Lazy::new(|| Mutex::new(PickerRegistry::default()));

#[derive(Default)]
struct PickerRegistry {
    next_handle: u64,
    pickers: HashMap<u64, AudiencePicker>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path for rolling logs.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Coarse failure kind; safe to log and to branch on in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureReason {
    Decode,
    BadLevel,
    UnknownHandle,
    RegistryUnavailable,
    Encode,
}

impl FailureReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::BadLevel => "bad_level",
            Self::UnknownHandle => "unknown_handle",
            Self::RegistryUnavailable => "registry_unavailable",
            Self::Encode => "encode",
        }
    }
}

type CallError = (FailureReason, String);

/// Response envelope for picker calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerResponse {
    /// Whether the call was applied.
    pub ok: bool,
    /// Picker handle; set on success.
    pub handle: Option<u64>,
    /// Human-readable outcome for diagnostics.
    pub message: String,
    /// Failure kind (`decode|bad_level|unknown_handle|registry_unavailable|encode`);
    /// empty on success.
    pub reason: String,
    /// Selection as `{identityIds, categoryIds, subcategoryIds, subsubIds}` JSON.
    pub selection_json: String,
    /// Expansion snapshot JSON.
    pub expansion_json: String,
    /// Structural hash of the selection; changes whenever the selection does.
    pub revision: u64,
}

impl PickerResponse {
    fn failure(reason: FailureReason, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(
            "event=ffi_call module=ffi status=error reason={}",
            reason.as_str()
        );
        Self {
            ok: false,
            handle: None,
            message,
            reason: reason.as_str().to_string(),
            selection_json: String::new(),
            expansion_json: String::new(),
            revision: 0,
        }
    }

    fn snapshot(handle: u64, picker: &AudiencePicker, message: impl Into<String>) -> Self {
        let selection_json = match serde_json::to_string(picker.selection()) {
            Ok(json) => json,
            Err(err) => {
                return Self::failure(
                    FailureReason::Encode,
                    format!("selection encode failed: {err}"),
                )
            }
        };
        let expansion_json = match serde_json::to_string(picker.expansion()) {
            Ok(json) => json,
            Err(err) => {
                return Self::failure(
                    FailureReason::Encode,
                    format!("expansion encode failed: {err}"),
                )
            }
        };
        Self {
            ok: true,
            handle: Some(handle),
            message: message.into(),
            reason: String::new(),
            selection_json,
            expansion_json,
            revision: picker.selection().fingerprint(),
        }
    }
}

/// Opens one picker session for a mounted screen.
///
/// # FFI contract
/// - `catalog_json`: identities-with-categories payload.
/// - `config_json`: picker config; blank uses defaults.
/// - `saved_json`: optional previously saved selection for edit flows.
/// - Never panics; returns the new handle on success.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_open(
    catalog_json: String,
    config_json: String,
    saved_json: Option<String>,
) -> PickerResponse {
    let catalog = match Catalog::from_json_str(&catalog_json) {
        Ok(catalog) => catalog,
        Err(err) => {
            return PickerResponse::failure(
                FailureReason::Decode,
                format!("picker_open failed: {err}"),
            )
        }
    };
    let config = match PickerConfig::from_json_str(&config_json) {
        Ok(config) => config,
        Err(err) => {
            return PickerResponse::failure(
                FailureReason::Decode,
                format!("picker_open failed: {err}"),
            )
        }
    };
    let saved = match saved_json.as_deref().map(str::trim) {
        None | Some("") => SavedSelection::default(),
        Some(raw) => match serde_json::from_str::<SavedSelection>(raw) {
            Ok(saved) => saved,
            Err(err) => {
                return PickerResponse::failure(
                    FailureReason::Decode,
                    format!("picker_open failed: invalid saved selection: {err}"),
                )
            }
        },
    };

    let picker = AudiencePicker::with_saved_selection(Arc::new(catalog), config, &saved);
    let issues = picker.index().issues().len();
    let mut registry = match PICKERS.lock() {
        Ok(registry) => registry,
        Err(_) => {
            return PickerResponse::failure(
                FailureReason::RegistryUnavailable,
                "picker registry unavailable",
            )
        }
    };
    registry.next_handle += 1;
    let handle = registry.next_handle;
    let response = PickerResponse::snapshot(
        handle,
        &picker,
        format!("Picker opened with {issues} catalog issue(s)."),
    );
    registry.pickers.insert(handle, picker);
    response
}

/// Toggles one node's selection.
///
/// `level` is `identity|category|subcategory|subsub`. Unknown ids succeed
/// with message `ignored`.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_toggle(handle: u64, level: String, id: String) -> PickerResponse {
    with_picker(handle, |picker| {
        let level = level_arg(&level)?;
        let outcome = picker.toggle(level, id.trim());
        Ok(outcome.as_str().to_string())
    })
}

/// Toggles accordion expansion of one node within its parent scope.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_toggle_expand(
    handle: u64,
    level: String,
    scope: Option<String>,
    id: String,
) -> PickerResponse {
    with_picker(handle, |picker| {
        let level = level_arg(&level)?;
        let outcome = picker.toggle_expand(level, scope.as_deref(), id.trim());
        Ok(format!("{outcome:?}").to_ascii_lowercase())
    })
}

/// Opens the ancestors of one node, e.g. after a search jump.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_reveal(handle: u64, level: String, id: String) -> PickerResponse {
    with_picker(handle, |picker| {
        let level = level_arg(&level)?;
        if picker.reveal(level, id.trim()) {
            Ok("revealed".to_string())
        } else {
            Ok("ignored".to_string())
        }
    })
}

/// Clears every selected id.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_clear(handle: u64) -> PickerResponse {
    with_picker(handle, |picker| {
        picker.clear_all();
        Ok("cleared".to_string())
    })
}

/// Applies the restricted identity view on mount.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_apply_restricted_view(
    handle: u64,
    shown: Vec<String>,
    auto_select: bool,
) -> PickerResponse {
    with_picker(handle, |picker| {
        let view = RestrictedView { shown, auto_select };
        Ok(match picker.apply_restricted_view(&view) {
            Some(identity) => format!("restricted to {identity}"),
            None => "unrestricted".to_string(),
        })
    })
}

/// Returns the current snapshots without mutating anything.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_snapshot(handle: u64) -> PickerResponse {
    with_picker(handle, |_| Ok("snapshot".to_string()))
}

/// Selected-descendant badge count, or `None` for leaves, unknown ids and
/// unknown handles.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_count(handle: u64, level: String, id: String) -> Option<u32> {
    let level = level_arg(&level).ok()?;
    let mut registry = PICKERS.lock().ok()?;
    let picker = registry.pickers.get_mut(&handle)?;
    picker
        .count(level, id.trim())
        .map(|value| u32::try_from(value).unwrap_or(u32::MAX))
}

/// Discards one picker session. Returns whether the handle existed.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_close(handle: u64) -> bool {
    match PICKERS.lock() {
        Ok(mut registry) => registry.pickers.remove(&handle).is_some(),
        Err(_) => false,
    }
}

fn level_arg(raw: &str) -> Result<Level, CallError> {
    parse_level(raw).map_err(|err| (FailureReason::BadLevel, err.to_string()))
}

fn with_picker(
    handle: u64,
    f: impl FnOnce(&mut AudiencePicker) -> Result<String, CallError>,
) -> PickerResponse {
    let mut registry = match PICKERS.lock() {
        Ok(registry) => registry,
        Err(_) => {
            return PickerResponse::failure(
                FailureReason::RegistryUnavailable,
                "picker registry unavailable",
            )
        }
    };
    let Some(picker) = registry.pickers.get_mut(&handle) else {
        return PickerResponse::failure(
            FailureReason::UnknownHandle,
            format!("unknown picker handle {handle}"),
        );
    };
    match f(picker) {
        Ok(message) => PickerResponse::snapshot(handle, picker, message),
        Err((reason, message)) => PickerResponse::failure(reason, message),
    }
}
