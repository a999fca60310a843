// [libs/domain/manifest/src/lib.rs]
/*!
 * =================================================================
 * APARATO: MANIFEST DECODERS (ESTRATO L2 - DOMAIN)
 * RESPONSABILIDAD: TRADUCIR LOS TRES FORMATOS DE CABLE REGIONALES
 * A LA ENTIDAD DE CATÁLOGO NORMALIZADA
 *
 * Cada decodificador es puro: bytes de entrada, catálogo de salida,
 * sin E/S propia. Los drivers de región son quienes obtienen los
 * bytes y llaman aquí.
 * =================================================================
 */

mod binreader;
mod errors;

pub mod cn;
pub mod gl;
pub mod jp;

pub use errors::ManifestError;
