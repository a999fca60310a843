// [libs/infra/storage/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ALMACENAMIENTO (ESTRATO L3 - INFRA)
 * RESPONSABILIDAD: ZIPS CIFRADOS Y TABLAS SQLITE, SIN LÓGICA DE DOMINIO
 * =================================================================
 */

mod errors;
mod sqlite;
mod zip_archive;

pub use errors::StorageError;
pub use sqlite::{CellValue, TableDatabase};
pub use zip_archive::extract_zip_with_password;
