use super::errors::ConfigError;
use std::path::Path;
use std::sync::Arc;
use toml_edit::{Array, DocumentMut, Item, Table, Value};

/// Adds keys introduced after the file was written, keeping the user's comments and layout
pub async fn migrate_config_if_needed<P: AsRef<Path>>(
    path: P,
    events: Option<&Arc<blobfinder_events::EventBus>>,
) -> Result<(), ConfigError> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let mut doc = content.parse::<DocumentMut>()?;

    let added_fields = migrate_document(&mut doc)?;

    // Only write if we added fields
    if !added_fields.is_empty() {
        tokio::fs::write(path.as_ref(), doc.to_string()).await?;

        if let Some(event_bus) = events {
            event_bus.emit(blobfinder_events::AppEvent::ConfigMigrated {
                added_fields: added_fields.clone(),
            });
        }
    }

    Ok(())
}

fn migrate_document(doc: &mut DocumentMut) -> Result<Vec<String>, ConfigError> {
    let mut added_fields = Vec::new();

    migrate_server_section(doc, &mut added_fields)?;
    migrate_storage_section(doc, &mut added_fields)?;
    migrate_thumbnails_section(doc, &mut added_fields)?;
    migrate_roots_array(doc, &mut added_fields);

    Ok(added_fields)
}

fn ensure_table<'a>(
    parent: &'a mut Table,
    key: &str,
    label: &str,
    added_fields: &mut Vec<String>,
) -> Result<&'a mut Table, ConfigError> {
    if !parent.contains_key(key) {
        let mut table = Table::new();
        table.set_implicit(true);
        parent[key] = Item::Table(table);
        added_fields.push(label.to_string());
    }

    parent[key]
        .as_table_mut()
        .ok_or_else(|| ConfigError::MigrationError(format!("Invalid [{}] section in config", label)))
}

fn migrate_server_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> Result<(), ConfigError> {
    let server = ensure_table(doc.as_table_mut(), "server", "server", added_fields)?;

    ensure_field(server, "host", Value::from("0.0.0.0"), added_fields);
    ensure_field(server, "port", Value::from(8080), added_fields);
    ensure_field(server, "base_url", Value::from("http://localhost:8080"), added_fields);
    ensure_field(server, "tcp_nodelay", Value::from(true), added_fields);
    ensure_field(server, "timeout_secs", Value::from(120), added_fields);
    ensure_field(server, "max_body_size_mb", Value::from(100), added_fields);
    ensure_field(server, "enable_compression", Value::from(true), added_fields);

    if !server.contains_key("allowed_origins") {
        let mut arr = Array::new();
        arr.push("*");
        server["allowed_origins"] = Item::Value(Value::Array(arr));
        added_fields.push("server.allowed_origins".to_string());
    }

    Ok(())
}

fn migrate_storage_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> Result<(), ConfigError> {
    let storage = ensure_table(doc.as_table_mut(), "storage", "storage", added_fields)?;
    ensure_field(storage, "backend", Value::from("local"), added_fields);
    ensure_field(storage, "local_path", Value::from("storage"), added_fields);

    let s3 = ensure_table(storage, "s3", "storage.s3", added_fields)?;
    ensure_field(s3, "enabled", Value::from(false), added_fields);
    ensure_field(s3, "endpoint_url", Value::from(""), added_fields);
    ensure_field(s3, "region", Value::from("auto"), added_fields);
    ensure_field(s3, "bucket_name", Value::from("blobfinder"), added_fields);
    ensure_field(s3, "bucket_prefix", Value::from(""), added_fields);

    Ok(())
}

fn migrate_thumbnails_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> Result<(), ConfigError> {
    let thumbnails = ensure_table(doc.as_table_mut(), "thumbnails", "thumbnails", added_fields)?;
    ensure_field(thumbnails, "cache_dir", Value::from("thumbnails"), added_fields);
    ensure_field(thumbnails, "size", Value::from(90), added_fields);
    ensure_field(thumbnails, "memory_cache_mb", Value::from(64), added_fields);

    Ok(())
}

fn migrate_roots_array(doc: &mut DocumentMut, added_fields: &mut Vec<String>) {
    // Only touch an existing roots array, an empty one is never created
    if let Some(roots) = doc
        .get_mut("roots")
        .and_then(|r| r.as_array_of_tables_mut())
    {
        for (idx, root) in roots.iter_mut().enumerate() {
            for (key, value) in [
                ("alias", Value::from("Files")),
                ("read_only", Value::from(false)),
                ("locked", Value::from(false)),
                ("upload_overwrite", Value::from(false)),
            ] {
                if !root.contains_key(key) {
                    root.insert(key, Item::Value(value));
                    added_fields.push(format!("roots[{}].{}", idx, key));
                }
            }
        }
    }
}

fn ensure_field(
    table: &mut Table,
    key: &str,
    default_value: Value,
    added_fields: &mut Vec<String>,
) {
    if !table.contains_key(key) {
        table[key] = Item::Value(default_value);
        added_fields.push(key.to_string());
    }
}
