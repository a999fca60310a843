// [libs/domain/region/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CONTROLADORES DE REGIÓN (ESTRATO L4 - DOMAIN)
 * RESPONSABILIDAD: VERSION -> PAQUETE -> RAÍZ DE CATÁLOGO -> CATÁLOGO
 * =================================================================
 */

mod cn;
mod common;
mod errors;
mod gl;
mod jp;

pub use cn::CnDriver;
pub use errors::RegionError;
pub use gl::GlDriver;
pub use jp::{JpDriver, UnityAssetReader};
