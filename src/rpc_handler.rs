//! RPC method handler for the Topicmarks JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdio.
//! `handle_method` dispatches a method name to the engine through the `App`
//! struct. Failures come back as `"[reason_code] message"` strings.

use std::fmt::Display;
use std::sync::Mutex;

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::duplicate_finder::DuplicateFinderTrait;
use crate::managers::import_reconciler::ImportReconcilerTrait;
use crate::managers::topic_manager::TopicManagerTrait;
use crate::services::exporter::{sample_document, ExporterTrait};
use crate::services::parsers::split_topic_path;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::BookmarkQuery;
use crate::types::import::ExchangeFormat;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64
        .decode(input.trim())
        .map_err(|e| format!("[invalid_params] base64 decode error: {}", e))
}

fn fail(code: &str, e: impl Display) -> String {
    format!("[{}] {}", code, e)
}

fn missing(key: &str) -> String {
    fail("invalid_params", format!("missing {}", key))
}

fn str_param<'p>(params: &'p Value, key: &str) -> Result<&'p str, String> {
    params.get(key).and_then(Value::as_str).ok_or_else(|| missing(key))
}

fn opt_str<'p>(params: &'p Value, key: &str) -> Option<&'p str> {
    params.get(key).and_then(Value::as_str)
}

fn id_list(params: &Value, key: &str) -> Result<Vec<String>, String> {
    let items = params.get(key).and_then(Value::as_array).ok_or_else(|| missing(key))?;
    Ok(items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// Accepts a path either as an array of names or as one `/`-separated string.
fn path_param(params: &Value) -> Result<Vec<String>, String> {
    match params.get("path") {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()),
        Some(Value::String(raw)) => Ok(split_topic_path(raw)),
        _ => Err(missing("path")),
    }
}

fn format_param(params: &Value, blob: Option<&str>) -> Result<ExchangeFormat, String> {
    match opt_str(params, "format") {
        None | Some("auto") => match blob {
            Some(blob) => Ok(ExchangeFormat::detect(blob)),
            None => Err(missing("format")),
        },
        Some(name) => ExchangeFormat::from_name(name)
            .ok_or_else(|| fail("invalid_params", format!("unsupported format: {}", name))),
    }
}

/// Upload body from `data` (text) or `data_base64`, decoded as lossy UTF-8.
fn upload_param(params: &Value) -> Result<String, String> {
    if let Some(text) = opt_str(params, "data") {
        return Ok(text.to_string());
    }
    let encoded = opt_str(params, "data_base64").ok_or_else(|| missing("data"))?;
    let bytes = base64_decode(encoded)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| fail("serialization_error", e))
}

/// Handles one protocol line and returns the response object.
///
/// Requests are answered in arrival order with no throttling.
pub fn handle_line(app: &Mutex<App>, line: &str) -> Value {
    let req = match serde_json::from_str::<Value>(line) {
        Ok(req) => req,
        Err(e) => return json!({"id": null, "error": format!("[parse_error] {}", e)}),
    };
    let id = req.get("id").cloned().unwrap_or(Value::Null);
    let method = req.get("method").and_then(Value::as_str).unwrap_or("");
    let params = req.get("params").cloned().unwrap_or_else(|| json!({}));
    tracing::debug!(method = %method, "request");
    match handle_method(app, method, &params) {
        Ok(val) => json!({"id": id, "result": val}),
        Err(err) => {
            tracing::debug!(method = %method, "request failed: {}", err);
            json!({"id": id, "error": err})
        }
    }
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"ok": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Import / export ───
        "import.batch" => {
            let blob = upload_param(params)?;
            let format = format_param(params, Some(blob.as_str()))?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let summary = a
                .importer()
                .import_blob(format, &blob)
                .map_err(|e| fail(e.code(), e))?;
            Ok(json!({
                "format": format.name(),
                "created": summary.created,
                "skipped": summary.skipped,
            }))
        }
        "export" => {
            let format = format_param(params, None)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let document = a.exporter().export(format).map_err(|e| fail(e.code(), e))?;
            if opt_str(params, "encoding") == Some("base64") {
                Ok(json!({
                    "format": format.name(),
                    "mime_type": format.mime_type(),
                    "data_base64": base64_encode(document.as_bytes()),
                }))
            } else {
                Ok(json!({
                    "format": format.name(),
                    "mime_type": format.mime_type(),
                    "data": document,
                }))
            }
        }
        "export.sample" => {
            let format = format_param(params, None)?;
            let document = sample_document(format).map_err(|e| fail(e.code(), e))?;
            Ok(json!({
                "format": format.name(),
                "mime_type": format.mime_type(),
                "data": document,
            }))
        }

        // ─── Topics ───
        "topic.root" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let root = a.topics().root().map_err(|e| fail(e.code(), e))?;
            to_json(&root)
        }
        "topic.resolve" => {
            let path = path_param(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let topic = a.topics().resolve_path(&path).map_err(|e| fail(e.code(), e))?;
            to_json(&topic)
        }
        "topic.create" => {
            let name = opt_str(params, "name").unwrap_or("");
            let parent = opt_str(params, "parent_id");
            let a = app.lock().map_err(|e| e.to_string())?;
            let topic = a
                .topics()
                .create_topic(name, parent)
                .map_err(|e| fail(e.code(), e))?;
            to_json(&topic)
        }
        "topic.rename" => {
            let id = str_param(params, "id")?;
            let name = str_param(params, "name")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.topics().rename_topic(id, name).map_err(|e| fail(e.code(), e))?;
            Ok(json!({"ok": true}))
        }
        "topic.delete" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.topics().delete_topic(id).map_err(|e| fail(e.code(), e))?;
            Ok(json!({"ok": true}))
        }
        "topic.move" => {
            let id = str_param(params, "id")?;
            let parent = str_param(params, "parent_id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.topics().move_topic(id, parent).map_err(|e| fail(e.code(), e))?;
            Ok(json!({"ok": true}))
        }
        "topic.tree" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let tree = a.topics().topic_tree().map_err(|e| fail(e.code(), e))?;
            to_json(&tree)
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let url = str_param(params, "url")?;
            let title = opt_str(params, "title").unwrap_or("");
            let topic = opt_str(params, "topic_id");
            let notes = opt_str(params, "notes");
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = a
                .bookmarks()
                .add_bookmark(url, title, topic, notes)
                .map_err(|e| fail(e.code(), e))?;
            to_json(&bookmark)
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = a
                .bookmarks()
                .update_bookmark(
                    id,
                    opt_str(params, "url"),
                    opt_str(params, "title"),
                    opt_str(params, "notes"),
                )
                .map_err(|e| fail(e.code(), e))?;
            to_json(&bookmark)
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.bookmarks().remove_bookmark(id).map_err(|e| fail(e.code(), e))?;
            Ok(json!({"ok": true}))
        }
        "bookmark.move" => {
            let id = str_param(params, "id")?;
            let topic = str_param(params, "topic_id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.bookmarks().move_bookmark(id, topic).map_err(|e| fail(e.code(), e))?;
            Ok(json!({"ok": true}))
        }
        "bookmark.bulk_delete" => {
            let ids = id_list(params, "ids")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.bookmarks().bulk_delete(&ids).map_err(|e| fail(e.code(), e))?;
            Ok(json!({"removed": removed}))
        }
        "bookmark.bulk_move" => {
            let ids = id_list(params, "ids")?;
            let topic = str_param(params, "topic_id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let summary = a
                .bookmarks()
                .bulk_move(&ids, topic)
                .map_err(|e| fail(e.code(), e))?;
            to_json(&summary)
        }
        "bookmark.list" => {
            let query: BookmarkQuery = serde_json::from_value(params.clone())
                .map_err(|e| fail("invalid_params", e))?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a
                .bookmarks()
                .list_bookmarks(&query)
                .map_err(|e| fail(e.code(), e))?;
            to_json(&bookmarks)
        }

        // ─── Duplicates ───
        "duplicates.find" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let groups = a.duplicates().find_duplicates().map_err(|e| fail(e.code(), e))?;
            to_json(&groups)
        }
        "duplicates.delete" => {
            let ids = id_list(params, "ids")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let removed = a
                .duplicates()
                .delete_duplicates(&ids)
                .map_err(|e| fail(e.code(), e))?;
            Ok(json!({"removed": removed}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_json(a.settings())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or_else(|| missing("value"))?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine
                .set_value(key, value)
                .map_err(|e| fail(e.code(), e))?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
