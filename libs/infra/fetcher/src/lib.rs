// [libs/infra/fetcher/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HTTP FETCHER (ESTRATO L3 - INFRA)
 * RESPONSABILIDAD: UNA PETICIÓN, CON REINTENTOS, RANGOS Y STREAMING
 *
 * Bloqueante por contrato: cada worker de la tubería suspende aquí
 * en vez de ceder a un runtime cooperativo.
 * =================================================================
 */

mod errors;
mod fetcher;
mod progress;
mod request;

pub use errors::FetchError;
pub use fetcher::Fetcher;
pub use progress::{NullProgressSink, ProgressSink};
pub use request::{FetchRequest, Method};
