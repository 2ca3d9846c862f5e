//! Fuentes de la planilla: URL remota (export XLSX de Google Sheets) o
//! archivo local.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::LoadError;

/// De dónde se obtienen los bytes del workbook.
///
/// `id()` forma parte de la clave del caché, así que dos fuentes con el
/// mismo id se consideran la misma planilla.
pub trait SheetSource: Send + Sync {
    fn id(&self) -> String;
    fn fetch(&self) -> Result<Vec<u8>, LoadError>;
}

/// URL de export XLSX (todas las abas) para una planilla de Google Sheets.
pub fn google_export_url(sheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/export?format=xlsx", sheet_id)
}

/// Descarga por HTTP con timeout. Sin reintentos.
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        HttpSource { url: url.into(), timeout }
    }
}

impl SheetSource for HttpSource {
    fn id(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        tracing::info!(url = %self.url, "descargando planilla");
        let resp = client.get(&self.url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }
        Ok(resp.bytes()?.to_vec())
    }
}

/// Lee el workbook desde disco (útil en desarrollo y en los tests).
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl SheetSource for FileSource {
    fn id(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        std::fs::read(&self.path).map_err(|source| LoadError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}
