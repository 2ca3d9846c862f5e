// Estructuras de datos principales

use serde::Serialize;

/// Tabla de registros: columnas ordenadas y filas de celdas de texto.
/// `None` representa una celda en blanco.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tabla {
    pub columnas: Vec<String>,
    pub filas: Vec<Vec<Option<String>>>,
}

impl Tabla {
    pub fn new(columnas: Vec<String>) -> Self {
        Tabla { columnas, filas: Vec::new() }
    }

    /// Construye una tabla rellenando (o truncando) cada fila al ancho de las columnas.
    pub fn from_rows(columnas: Vec<String>, filas: Vec<Vec<Option<String>>>) -> Self {
        let ancho = columnas.len();
        let filas = filas
            .into_iter()
            .map(|mut f| {
                f.resize(ancho, None);
                f
            })
            .collect();
        Tabla { columnas, filas }
    }

    /// Atajo para tests y fixtures: celdas vacías se guardan como `None`.
    pub fn from_str_rows(columnas: &[&str], filas: &[&[&str]]) -> Self {
        let columnas = columnas.iter().map(|c| c.to_string()).collect();
        let filas = filas
            .iter()
            .map(|f| {
                f.iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect()
            })
            .collect();
        Tabla::from_rows(columnas, filas)
    }

    pub fn len(&self) -> usize {
        self.filas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filas.is_empty()
    }

    pub fn col_index(&self, nombre: &str) -> Option<usize> {
        self.columnas.iter().position(|c| c == nombre)
    }

    pub fn has_col(&self, nombre: &str) -> bool {
        self.col_index(nombre).is_some()
    }

    /// Agrega una columna en blanco si no existe. Devuelve su índice.
    pub fn ensure_col(&mut self, nombre: &str) -> usize {
        if let Some(idx) = self.col_index(nombre) {
            return idx;
        }
        self.columnas.push(nombre.to_string());
        for fila in self.filas.iter_mut() {
            fila.push(None);
        }
        self.columnas.len() - 1
    }

    pub fn cell(&self, fila: usize, columna: &str) -> Option<&str> {
        let idx = self.col_index(columna)?;
        self.filas.get(fila)?.get(idx)?.as_deref()
    }

    /// Valores de una columna en orden de filas (vacío si la columna no existe).
    pub fn column_values(&self, columna: &str) -> Vec<Option<&str>> {
        match self.col_index(columna) {
            Some(idx) => self.filas.iter().map(|f| f[idx].as_deref()).collect(),
            None => Vec::new(),
        }
    }

    /// Nueva tabla con las filas que cumplen el predicado; mismas columnas.
    pub fn filter_rows<F>(&self, pred: F) -> Tabla
    where
        F: Fn(&[Option<String>]) -> bool,
    {
        Tabla {
            columnas: self.columnas.clone(),
            filas: self.filas.iter().filter(|f| pred(f)).cloned().collect(),
        }
    }

    /// Proyección a las columnas indicadas (se ignoran las inexistentes).
    pub fn select(&self, columnas: &[String]) -> Tabla {
        let idxs: Vec<(String, usize)> = columnas
            .iter()
            .filter_map(|c| self.col_index(c).map(|i| (c.clone(), i)))
            .collect();
        Tabla {
            columnas: idxs.iter().map(|(c, _)| c.clone()).collect(),
            filas: self
                .filas
                .iter()
                .map(|f| idxs.iter().map(|(_, i)| f[*i].clone()).collect())
                .collect(),
        }
    }
}

/// Una hoja del libro ya limpia.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hoja {
    pub nombre: String,
    pub tabla: Tabla,
}

/// Libro completo: sólo hojas con contenido, en el orden del workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Libro {
    pub hojas: Vec<Hoja>,
}

impl Libro {
    pub fn nombres(&self) -> Vec<String> {
        self.hojas.iter().map(|h| h.nombre.clone()).collect()
    }

    pub fn get(&self, nombre: &str) -> Option<&Tabla> {
        self.hojas.iter().find(|h| h.nombre == nombre).map(|h| &h.tabla)
    }

    pub fn is_empty(&self) -> bool {
        self.hojas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hojas.len()
    }
}
