//! Export de la tabla filtrada como CSV (UTF-8, separado por comas, con encabezado).

use csv::{ReaderBuilder, WriterBuilder};

use crate::models::Tabla;

/// Nombre sugerido del archivo descargado.
pub const NOMBRE_EXPORT: &str = "emendas_filtrado.csv";

pub fn exportar_csv(tabla: &Tabla) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    wtr.write_record(&tabla.columnas)?;
    for fila in &tabla.filas {
        wtr.write_record(fila.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    wtr.into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(e.error().kind(), e.error().to_string())))
}

/// Lee un CSV exportado de vuelta a `Tabla` (campos vacíos → `None`).
pub fn leer_csv(bytes: &[u8]) -> Result<Tabla, csv::Error> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let columnas: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut filas = Vec::new();
    for record in rdr.records() {
        let record = record?;
        filas.push(
            record
                .iter()
                .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                .collect(),
        );
    }
    Ok(Tabla::from_rows(columnas, filas))
}
