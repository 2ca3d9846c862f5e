//! Lectura de todas las hojas del workbook con una fila de encabezado fija.

use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use super::io::cell_to_text;
use crate::error::LoadError;
use crate::models::{Hoja, Libro, Tabla};

/// Fila del encabezado por defecto: 3ª fila visible de la planilla (índice 2).
pub const HEADER_ROW_INDEX: usize = 2;

/// Interpreta los bytes de un XLSX/XLS/ODS y devuelve todas las hojas con
/// contenido. `header_row` es el índice absoluto (0-based) de la fila de
/// encabezado, igual para todas las hojas.
pub fn parse_workbook(bytes: Vec<u8>, header_row: usize) -> Result<Libro, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let names = workbook.sheet_names().to_owned();

    let mut hojas = Vec::new();
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        match tabla_desde_rango(&range, header_row) {
            Some(tabla) => {
                tracing::debug!(aba = %name, filas = tabla.len(), columnas = tabla.columnas.len(), "aba lida");
                hojas.push(Hoja { nombre: name, tabla });
            }
            None => tracing::debug!(aba = %name, "aba vazia descartada"),
        }
    }
    Ok(Libro { hojas })
}

/// Convierte un rango de calamine en `Tabla` usando `header_row` como
/// encabezado. Devuelve `None` si tras la limpieza no quedan filas o columnas.
///
/// El rango de calamine empieza en la primera celda no vacía, por eso se
/// trabaja con índices absolutos (`range.start()`).
pub fn tabla_desde_rango(range: &Range<Data>, header_row: usize) -> Option<Tabla> {
    let (start_row, start_col) = range.start()?;
    let (start_row, start_col) = (start_row as usize, start_col as usize);
    let ancho = range.width();
    if ancho == 0 {
        return None;
    }

    let mut encabezado: Vec<Option<String>> = vec![None; ancho];
    let mut filas: Vec<Vec<Option<String>>> = Vec::new();

    for (i, row) in range.rows().enumerate() {
        let abs = start_row + i;
        if abs < header_row {
            continue;
        }
        let celdas: Vec<Option<String>> = row.iter().map(cell_to_text).collect();
        if abs == header_row {
            encabezado = celdas;
        } else {
            filas.push(celdas);
        }
    }

    let columnas = nombres_columnas(&encabezado, start_col);

    // Quita filas totalmente vacías y luego columnas totalmente vacías
    filas.retain(|f| f.iter().any(|c| c.is_some()));
    if filas.is_empty() {
        return None;
    }
    let con_datos: Vec<usize> = (0..ancho)
        .filter(|&j| filas.iter().any(|f| f.get(j).map(|c| c.is_some()).unwrap_or(false)))
        .collect();
    if con_datos.is_empty() {
        return None;
    }

    let columnas: Vec<String> = con_datos.iter().map(|&j| columnas[j].clone()).collect();
    let filas: Vec<Vec<Option<String>>> = filas
        .into_iter()
        .map(|f| con_datos.iter().map(|&j| f.get(j).cloned().flatten()).collect())
        .collect();

    Some(Tabla::from_rows(columnas, filas))
}

/// Nombres de columna a partir de la fila de encabezado: recortados, los
/// vacíos pasan a `Unnamed: <col>` y los repetidos reciben sufijo `.1`, `.2`…
fn nombres_columnas(encabezado: &[Option<String>], start_col: usize) -> Vec<String> {
    let mut vistos: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(encabezado.len());

    for (j, celda) in encabezado.iter().enumerate() {
        let base = match celda.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => format!("Unnamed: {}", start_col + j),
        };
        let mut nombre = base.clone();
        let mut n = 1;
        while vistos.contains(&nombre) {
            nombre = format!("{}.{}", base, n);
            n += 1;
        }
        vistos.insert(nombre.clone());
        out.push(nombre);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rango(celdas: &[(u32, u32, Data)]) -> Range<Data> {
        let max_r = celdas.iter().map(|c| c.0).max().unwrap_or(0);
        let max_c = celdas.iter().map(|c| c.1).max().unwrap_or(0);
        let min_r = celdas.iter().map(|c| c.0).min().unwrap_or(0);
        let min_c = celdas.iter().map(|c| c.1).min().unwrap_or(0);
        let mut r = Range::new((min_r, min_c), (max_r, max_c));
        for (row, col, v) in celdas {
            r.set_value((*row, *col), v.clone());
        }
        r
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn usa_fila_fija_como_encabezado() {
        let r = rango(&[
            (0, 0, s("Título da planilha")),
            (2, 0, s(" UNIDADE DE DESTINO ")),
            (2, 1, s("QTD")),
            (3, 0, s("A")),
            (3, 1, Data::Float(10.0)),
        ]);
        let t = tabla_desde_rango(&r, 2).expect("tabla");
        assert_eq!(t.columnas, vec!["UNIDADE DE DESTINO", "QTD"]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.cell(0, "QTD"), Some("10"));
    }

    #[test]
    fn descarta_filas_y_columnas_vacias() {
        let r = rango(&[
            (2, 0, s("A")),
            (2, 1, s("SEM DADOS")),
            (2, 2, s("C")),
            (3, 0, s("x")),
            (5, 2, s("z")),
        ]);
        let t = tabla_desde_rango(&r, 2).expect("tabla");
        assert_eq!(t.columnas, vec!["A", "C"]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn hoja_sin_datos_es_none() {
        let r = rango(&[(2, 0, s("A")), (2, 1, s("B"))]);
        assert!(tabla_desde_rango(&r, 2).is_none());
    }

    #[test]
    fn encabezados_vacios_y_repetidos() {
        let r = rango(&[
            (2, 0, s("X")),
            (2, 2, s("X")),
            (3, 0, s("1")),
            (3, 1, s("2")),
            (3, 2, s("3")),
        ]);
        let t = tabla_desde_rango(&r, 2).expect("tabla");
        assert_eq!(t.columnas, vec!["X", "Unnamed: 1", "X.1"]);
    }
}
