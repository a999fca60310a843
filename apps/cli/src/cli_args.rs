// [apps/cli/src/cli_args.rs]
//! Argument surface and the single validation pass that turns it into an
//! immutable `RunConfig`. Validation happens once, before any network
//! call, so a bad flag combination fails fast instead of mid-download.

use caravan_domain_catalog::ResourceType;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Region {
    Cn,
    Gl,
    Jp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceFilter {
    Table,
    Media,
    Bundle,
    All,
}

#[derive(Debug, Parser)]
#[command(
    name = "caravan",
    version,
    about = "Recorre el backend regional de un juego móvil y materializa su catálogo de activos en disco."
)]
pub struct CliArgs {
    /// Backend regional a sincronizar.
    #[arg(long, value_enum)]
    pub region: Region,

    /// Versión concreta a sincronizar. CN siempre resuelve la suya en el
    /// servidor y rechaza este flag.
    #[arg(long)]
    pub version: Option<String>,

    /// Hilos objetivo por etapa del pipeline.
    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Techo de hilos que la heurística de auto-escalado puede alcanzar.
    #[arg(long)]
    pub max_threads: Option<usize>,

    /// Carpeta de destino para los archivos crudos descargados.
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Carpeta de destino para los archivos extraídos.
    #[arg(long)]
    pub extract_dir: Option<PathBuf>,

    /// Carpeta de trabajo temporal (descargas parciales, paquetes fragmentados).
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Extrae cada entrada tan pronto se descarga, en vez de al final.
    #[arg(long)]
    pub downloading_extract: bool,

    /// Filtro de tipo de recurso; repetible.
    #[arg(long = "resource-type", value_enum, default_values_t = vec![ResourceFilter::All])]
    pub resource_types: Vec<ResourceFilter>,

    /// URL de proxy saliente para todas las peticiones HTTP.
    #[arg(long)]
    pub proxy: Option<String>,

    /// Reintentos máximos por petición antes de declarar una entrada fallida.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Palabras clave de búsqueda simple sobre rutas ya materializadas.
    #[arg(long = "search")]
    pub search_keywords: Vec<String>,

    /// Palabras clave de búsqueda avanzada contra la tabla de relación de personajes.
    #[arg(long = "search-advanced")]
    pub advanced_search_keywords: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CN resolves its own version server-side; --version is not accepted for this region")]
    VersionOverrideRejectedForCn,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub region: Region,
    pub version: Option<String>,
    pub threads: usize,
    pub max_threads: usize,
    pub raw_dir: PathBuf,
    pub extract_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub downloading_extract: bool,
    pub resource_types: Vec<ResourceType>,
    pub proxy: Option<String>,
    pub max_retries: u32,
    pub search_keywords: Vec<String>,
    pub advanced_search_keywords: Vec<String>,
}

impl RunConfig {
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.region == Region::Cn && args.version.is_some() {
            return Err(ConfigError::VersionOverrideRejectedForCn);
        }

        let region_prefix = match args.region {
            Region::Cn => "CN",
            Region::Gl => "GL",
            Region::Jp => "JP",
        };

        let resource_types = if args.resource_types.iter().any(|r| *r == ResourceFilter::All) {
            vec![ResourceType::Table, ResourceType::Media, ResourceType::Bundle]
        } else {
            args.resource_types
                .into_iter()
                .map(|filter| match filter {
                    ResourceFilter::Table => ResourceType::Table,
                    ResourceFilter::Media => ResourceType::Media,
                    ResourceFilter::Bundle => ResourceType::Bundle,
                    ResourceFilter::All => unreachable!("handled above"),
                })
                .collect()
        };

        Ok(Self {
            region: args.region,
            version: args.version,
            threads: args.threads.max(1),
            max_threads: args.max_threads.unwrap_or(args.threads.max(1) * 7),
            raw_dir: args.raw_dir.unwrap_or_else(|| PathBuf::from(format!("{region_prefix}RawData"))),
            extract_dir: args.extract_dir.unwrap_or_else(|| PathBuf::from(format!("{region_prefix}Extracted"))),
            temp_dir: args.temp_dir.unwrap_or_else(|| PathBuf::from(format!("{region_prefix}Temp"))),
            downloading_extract: args.downloading_extract,
            resource_types,
            proxy: args.proxy,
            max_retries: args.max_retries,
            search_keywords: args.search_keywords,
            advanced_search_keywords: args.advanced_search_keywords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args(region: Region) -> CliArgs {
        CliArgs {
            region,
            version: None,
            threads: 4,
            max_threads: None,
            raw_dir: None,
            extract_dir: None,
            temp_dir: None,
            downloading_extract: false,
            resource_types: vec![ResourceFilter::All],
            proxy: None,
            max_retries: 3,
            search_keywords: vec![],
            advanced_search_keywords: vec![],
        }
    }

    #[test]
    fn cn_rejects_a_user_supplied_version() {
        let mut args = base_args(Region::Cn);
        args.version = Some("1.2.3".to_string());
        let result = RunConfig::from_args(args);
        assert!(matches!(result, Err(ConfigError::VersionOverrideRejectedForCn)));
    }

    #[test]
    fn gl_accepts_a_user_supplied_version() {
        let mut args = base_args(Region::Gl);
        args.version = Some("1.2.3".to_string());
        let config = RunConfig::from_args(args).unwrap();
        assert_eq!(config.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn max_threads_defaults_to_seven_times_threads() {
        let config = RunConfig::from_args(base_args(Region::Jp)).unwrap();
        assert_eq!(config.max_threads, 28);
    }

    #[test]
    fn default_directories_are_prefixed_by_region() {
        let config = RunConfig::from_args(base_args(Region::Gl)).unwrap();
        assert_eq!(config.raw_dir, PathBuf::from("GLRawData"));
        assert_eq!(config.extract_dir, PathBuf::from("GLExtracted"));
        assert_eq!(config.temp_dir, PathBuf::from("GLTemp"));
    }

    #[test]
    fn all_resource_filter_expands_to_every_resource_type() {
        let config = RunConfig::from_args(base_args(Region::Gl)).unwrap();
        assert_eq!(config.resource_types.len(), 3);
    }
}
