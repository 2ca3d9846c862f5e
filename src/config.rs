//! Configuración por variables de entorno (con `.env` si existe).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::excel::{google_export_url, FileSource, HttpSource, SheetSource, HEADER_ROW_INDEX};

/// Planilla publicada por defecto.
pub const SHEET_ID_POR_DEFECTO: &str = "1asY-XmwXtHa7Nb-hYpxSpjz1PeSU96I5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// URL http(s) o ruta local del XLSX.
    pub sheet_url: String,
    pub header_row: usize,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub credentials_file: PathBuf,
    pub secrets_file: PathBuf,
    pub bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            sheet_url: google_export_url(SHEET_ID_POR_DEFECTO),
            header_row: HEADER_ROW_INDEX,
            cache_ttl: Duration::from_secs(600),
            fetch_timeout: Duration::from_secs(30),
            credentials_file: PathBuf::from("credentials.json"),
            secrets_file: PathBuf::from("secrets.toml"),
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn numero(var: &str, valor: Option<String>, defecto: u64) -> Result<u64, ConfigError> {
    match valor {
        None => Ok(defecto),
        Some(v) if v.trim().is_empty() => Ok(defecto),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::NumeroInvalido { var: var.to_string(), valor: v }),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Igual que `from_env` pero leyendo de una función; útil en tests.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = AppConfig::default();
        let no_vacio = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let sheet_url = match (no_vacio("ENTREGAS_SHEET_URL"), no_vacio("ENTREGAS_SHEET_ID")) {
            (Some(url), _) => url,
            (None, Some(id)) => google_export_url(id.trim()),
            (None, None) => d.sheet_url,
        };

        let header_row = numero("ENTREGAS_HEADER_ROW", get("ENTREGAS_HEADER_ROW"), d.header_row as u64)?;
        let header_row = usize::try_from(header_row).map_err(|_| ConfigError::NumeroInvalido {
            var: "ENTREGAS_HEADER_ROW".into(),
            valor: header_row.to_string(),
        })?;

        Ok(AppConfig {
            sheet_url,
            header_row,
            cache_ttl: Duration::from_secs(numero(
                "ENTREGAS_CACHE_TTL_SECS",
                get("ENTREGAS_CACHE_TTL_SECS"),
                d.cache_ttl.as_secs(),
            )?),
            fetch_timeout: Duration::from_secs(numero(
                "ENTREGAS_FETCH_TIMEOUT_SECS",
                get("ENTREGAS_FETCH_TIMEOUT_SECS"),
                d.fetch_timeout.as_secs(),
            )?),
            credentials_file: no_vacio("ENTREGAS_CREDENTIALS_FILE").map(PathBuf::from).unwrap_or(d.credentials_file),
            secrets_file: no_vacio("ENTREGAS_SECRETS_FILE").map(PathBuf::from).unwrap_or(d.secrets_file),
            bind: no_vacio("ENTREGAS_BIND").unwrap_or(d.bind),
        })
    }

    /// Fuente de la planilla: HTTP para URLs, archivo local en otro caso.
    pub fn fuente(&self) -> Arc<dyn SheetSource> {
        let url = self.sheet_url.as_str();
        if url.starts_with("http://") || url.starts_with("https://") {
            Arc::new(HttpSource::new(url, self.fetch_timeout))
        } else {
            Arc::new(FileSource::new(url.trim_start_matches("file://")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn valores_por_defecto() {
        let c = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c, AppConfig::default());
        assert!(c.sheet_url.contains(SHEET_ID_POR_DEFECTO));
        assert_eq!(c.header_row, 2);
    }

    #[test]
    fn id_genera_url_de_exportacion() {
        let c = AppConfig::from_lookup(lookup(&[("ENTREGAS_SHEET_ID", "abc"), ("ENTREGAS_CACHE_TTL_SECS", "5")])).unwrap();
        assert_eq!(c.sheet_url, google_export_url("abc"));
        assert_eq!(c.cache_ttl, Duration::from_secs(5));

        let c = AppConfig::from_lookup(lookup(&[("ENTREGAS_SHEET_ID", "abc"), ("ENTREGAS_SHEET_URL", "/tmp/x.xlsx")])).unwrap();
        assert_eq!(c.sheet_url, "/tmp/x.xlsx");
    }

    #[test]
    fn numero_invalido() {
        let e = AppConfig::from_lookup(lookup(&[("ENTREGAS_HEADER_ROW", "dos")])).unwrap_err();
        assert_eq!(e, ConfigError::NumeroInvalido { var: "ENTREGAS_HEADER_ROW".into(), valor: "dos".into() });
    }
}
