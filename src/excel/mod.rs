//! Módulo `excel` dividido en submódulos para mantener el código organizado.
//!
//! Submódulos:
//! - `io`: conversión de celdas y normalización de nombres
//! - `fuente`: de dónde vienen los bytes del workbook (HTTP o archivo)
//! - `lector`: parseo de todas las abas con encabezado fijo
//! - `cache`: caché con TTL de la planilla ya interpretada
//! - `mapeo`: alias de columnas por aba hacia los campos canónicos
//! - `fusion`: unión de abas con la columna `ABA`
//! - `export`: export CSV

/// Helpers de conversión y normalización
pub mod io;

/// Fuentes de datos: `HttpSource`, `FileSource`
pub mod fuente;

/// Lectura de todas las abas: `parse_workbook`
pub mod lector;

/// Caché get-or-load con TTL
pub mod cache;

/// Mapeo de columnas a campos canónicos
pub mod mapeo;

/// Unión de abas y columnas canónicas
pub mod fusion;

/// Export CSV
pub mod export;

pub use cache::{CacheKey, LoadCache};
pub use fuente::{FileSource, HttpSource, SheetSource, google_export_url};
pub use io::normalize_name;
pub use lector::{HEADER_ROW_INDEX, parse_workbook};
pub use mapeo::{ALVO_NOMES, MapeoColumnas, find_col, mapear_columnas};

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::error::LoadError;
use crate::models::Libro;

/// Resultado de una carga: el libro, el mapeo de columnas de cada aba y la
/// concatenación de todas las abas. Se construye una vez por carga y es de
/// sólo lectura a partir de ahí.
#[derive(Debug, Clone)]
pub struct Carga {
    pub libro: Libro,
    /// Clave: nombre de la aba
    pub mapeos: HashMap<String, MapeoColumnas>,
    pub completa: crate::models::Tabla,
    pub cargado_en: DateTime<Local>,
}

impl Carga {
    pub fn new(libro: Libro) -> Self {
        let mut mapeos = HashMap::new();
        for hoja in &libro.hojas {
            let m = mapear_columnas(&hoja.tabla);
            tracing::debug!(aba = %hoja.nombre, "{}", m.resumen());
            mapeos.insert(hoja.nombre.clone(), m);
        }
        let completa = fusion::concat_hojas(&libro);
        Carga { libro, mapeos, completa, cargado_en: Local::now() }
    }
}

/// Descarga y parsea la planilla completa. Cualquier fallo de red o de
/// parseo es un único error fatal.
pub fn cargar_planilha(fuente: &dyn SheetSource, header_row: usize) -> Result<Carga, LoadError> {
    let bytes = fuente.fetch()?;
    let libro = parse_workbook(bytes, header_row)?;
    tracing::info!(fuente = %fuente.id(), abas = libro.len(), "planilha carregada");
    Ok(Carga::new(libro))
}
