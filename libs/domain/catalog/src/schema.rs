// [libs/domain/catalog/src/schema.rs]
//! Mapping from a lower-cased schema name to a decoder capability. Populated
//! at startup by an external flatbuffer-codegen collaborator and treated
//! as read-only by the extractor.

use std::collections::HashMap;
use std::sync::Arc;

/// `name -> decoder` capability: parse flatbuffer bytes into a structured
/// JSON value the table extractor can serialize directly.
pub type SchemaDecoder = Arc<dyn Fn(&[u8]) -> Option<serde_json::Value> + Send + Sync>;

#[derive(Clone, Default)]
pub struct SchemaRegistry {
    decoders: HashMap<String, SchemaDecoder>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema_name: &str, decoder: SchemaDecoder) {
        self.decoders.insert(schema_name.to_lowercase(), decoder);
    }

    pub fn decode(&self, schema_name: &str, bytes: &[u8]) -> Option<serde_json::Value> {
        let decoder = self.decoders.get(&schema_name.to_lowercase())?;
        decoder(bytes)
    }

    pub fn contains(&self, schema_name: &str) -> bool {
        self.decoders.contains_key(&schema_name.to_lowercase())
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("registered_schemas", &self.decoders.len())
            .finish()
    }
}
