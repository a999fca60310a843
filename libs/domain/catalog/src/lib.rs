// [libs/domain/catalog/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CATALOG MODEL (ESTRATO L2 - DOMAIN)
 * RESPONSABILIDAD: ENTIDAD NORMALIZADA DE CATÁLOGO Y SU COLECCIÓN
 *
 * El tipo al que cada decodificador de manifiesto regional converge.
 * No posee estado global: un catálogo es un valor.
 * =================================================================
 */

mod catalog;
mod entry;
mod schema;
mod server;

pub use catalog::Catalog;
pub use entry::{Addition, CatalogEntry, CheckType, ResourceType};
pub use schema::{SchemaDecoder, SchemaRegistry};
pub use server::ServerInfo;
