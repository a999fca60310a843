// [libs/domain/pipeline/src/extract.rs]
//! Media and table extraction live here; bundle extraction is delegated
//! to an injected capability behind a single-writer busy flag, since the
//! Unity asset reader it wraps is not thread-safe in general.

use crate::errors::PipelineError;
use caravan_core_obfuscation::{aes_decrypt, archive_password};
use caravan_domain_catalog::SchemaRegistry;
use caravan_infra_storage::{extract_zip_with_password, CellValue, TableDatabase};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub trait BundleExtractor: Send + Sync {
    fn extract_bundle(&self, path: &Path) -> Result<(), PipelineError>;
}

/// Enforces the "at most one bundle extraction runs at a time" constraint.
/// A worker that finds the flag already set should re-queue its entry
/// instead of blocking on it.
#[derive(Default)]
pub struct BundleBusyFlag(AtomicBool);

impl BundleBusyFlag {
    pub fn try_acquire(&self) -> bool {
        self.0.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok()
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Extracts a media zip under `{raw_dir}/Media/{stem}.zip` into
/// `{extract_dir}/Media/{stem}/` using the archive password derived from
/// the zip's own base name. A bad password or corrupt archive is a format
/// error: log, skip, continue — never fatal to the run.
pub fn extract_media(zip_path: &Path, extract_dir: &Path) -> Result<(), PipelineError> {
    let stem = zip_path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_lowercase();
    let password = archive_password(&stem);
    let dest = extract_dir.join(&stem);
    match extract_zip_with_password(zip_path, password.as_bytes(), &dest) {
        Ok(_) => Ok(()),
        Err(error) => {
            warn!(path = %zip_path.display(), error = %error, "media archive failed to extract, skipping");
            Ok(())
        }
    }
}

/// Extracts a table zip, then dispatches every `.bytes` payload and every
/// SQLite database's rows through the schema registry. Rows whose blob
/// columns are themselves AES-CBC JSON blobs are decrypted with the same
/// phrase-derivation scheme as `archive_password`.
pub fn extract_table(zip_path: &Path, extract_dir: &Path, registry: &SchemaRegistry) -> Result<(), PipelineError> {
    let stem = zip_path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_lowercase();
    let password = archive_password(&stem);
    let staging = extract_dir.join(format!(".staging-{stem}"));
    let members = match extract_zip_with_password(zip_path, password.as_bytes(), &staging) {
        Ok(members) => members,
        Err(error) => {
            warn!(path = %zip_path.display(), error = %error, "table archive failed to extract, skipping");
            return Ok(());
        }
    };

    let group_dir = extract_dir.join(&stem);
    std::fs::create_dir_all(&group_dir)?;

    for member in members {
        let file_name = member.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        if file_name.ends_with(".bytes") {
            extract_bytes_member(&member, &file_name, registry, &group_dir)?;
        } else if file_name.ends_with(".db") || file_name.ends_with(".sqlite") {
            extract_database_member(&member, registry, &group_dir)?;
        }
    }
    Ok(())
}

fn extract_bytes_member(member: &Path, file_name: &str, registry: &SchemaRegistry, group_dir: &Path) -> Result<(), PipelineError> {
    let schema_name = file_name.trim_end_matches(".bytes").to_lowercase();
    let data = std::fs::read(member)?;
    match registry.decode(&schema_name, &data) {
        Some(value) => {
            let out_path = group_dir.join(format!("{schema_name}.json"));
            std::fs::write(out_path, serde_json::to_vec_pretty(&value).unwrap_or_default())?;
        }
        None => warn!(schema = schema_name, "no decoder registered for table schema, skipping"),
    }
    Ok(())
}

fn extract_database_member(member: &Path, registry: &SchemaRegistry, group_dir: &Path) -> Result<(), PipelineError> {
    let db = TableDatabase::open_read_only(member)?;
    for table in db.table_names()? {
        let (columns, rows) = db.table_rows(&table)?;
        let schema_name = table.to_lowercase();
        let mut json_rows = Vec::new();
        for row in rows {
            let mut object = serde_json::Map::new();
            for (column_name, value) in columns.iter().zip(row.into_iter()) {
                object.insert(column_name.clone(), cell_to_json(value, registry, &schema_name));
            }
            json_rows.push(serde_json::Value::Object(object));
        }
        let out_path = group_dir.join(format!("{table}.json"));
        std::fs::write(out_path, serde_json::to_vec_pretty(&json_rows).unwrap_or_default())?;
    }
    Ok(())
}

fn cell_to_json(value: CellValue, registry: &SchemaRegistry, schema_name: &str) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Integer(v) => serde_json::Value::from(v),
        CellValue::Real(v) => serde_json::Value::from(v),
        CellValue::Text(v) => serde_json::Value::String(v),
        CellValue::Blob(bytes) => match registry.decode(schema_name, &bytes) {
            Some(decoded) => decoded,
            None => serde_json::Value::String(hex::encode(bytes)),
        },
    }
}

/// Some table rows are AES-CBC-encrypted JSON blobs rather than
/// flatbuffer bytes; a decrypt failure is a format error scoped to that
/// one row, not the whole extraction.
pub fn decrypt_row_blob(ciphertext_b64: &str, phrase: &str) -> Option<serde_json::Value> {
    match aes_decrypt(ciphertext_b64, phrase) {
        Ok(text) => serde_json::from_str(&text).ok(),
        Err(error) => {
            warn!(error = %error, "row blob failed AES decryption, skipping that row");
            None
        }
    }
}
