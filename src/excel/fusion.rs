//! Unión de todas las abas en una sola tabla de trabajo.
//!
//! Flujo:
//! 1. `concat_hojas`: concatena todas las abas (unión de columnas en orden de
//!    aparición) y agrega la columna `ABA` con el nombre de origen.
//! 2. `SelecaoAbas::resolver`: qué abas considerar.
//! 3. `montar_tabla_trabajo`: recorta por aba y completa las columnas
//!    canónicas copiando desde la columna real de cada aba.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::mapeo::{campos_canonicos, MapeoColumnas};
use super::Carga;
use crate::models::{Libro, Tabla};

/// Columna de procedencia: nombre de la aba de cada registro.
pub const COLUNA_ABA: &str = "ABA";

/// Opción que selecciona todas las abas.
pub const TODAS_ABAS: &str = "(Todas)";

/// Concatena todas las abas del libro agregando la columna `ABA`.
pub fn concat_hojas(libro: &Libro) -> Tabla {
    if libro.is_empty() {
        return Tabla::new(vec![COLUNA_ABA.to_string()]);
    }
    let mut columnas: Vec<String> = Vec::new();
    for hoja in &libro.hojas {
        for c in hoja.tabla.columnas.iter().map(String::as_str).chain(std::iter::once(COLUNA_ABA)) {
            if !columnas.iter().any(|x| x == c) {
                columnas.push(c.to_string());
            }
        }
    }

    let posiciones: HashMap<&str, usize> =
        columnas.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();
    let idx_aba = posiciones[COLUNA_ABA];

    let mut filas = Vec::new();
    for hoja in &libro.hojas {
        let destino: Vec<usize> = hoja.tabla.columnas.iter().map(|c| posiciones[c.as_str()]).collect();
        for fila in &hoja.tabla.filas {
            let mut nueva: Vec<Option<String>> = vec![None; columnas.len()];
            for (j, celda) in fila.iter().enumerate() {
                nueva[destino[j]] = celda.clone();
            }
            nueva[idx_aba] = Some(hoja.nombre.clone());
            filas.push(nueva);
        }
    }

    Tabla::from_rows(columnas, filas)
}

/// Selección de abas del usuario.
///
/// Vacía, o conteniendo `(Todas)`, significa todas las abas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelecaoAbas(pub Vec<String>);

impl SelecaoAbas {
    pub fn todas() -> Self {
        SelecaoAbas(vec![TODAS_ABAS.to_string()])
    }

    /// Nombres efectivos en el orden del libro. Nombres desconocidos se ignoran;
    /// si no queda ninguno específico se usan todas.
    pub fn resolver(&self, libro: &Libro) -> Vec<String> {
        let especificas: Vec<&String> = self.0.iter().filter(|a| a.as_str() != TODAS_ABAS).collect();
        if self.0.iter().any(|a| a == TODAS_ABAS) || especificas.is_empty() {
            return libro.nombres();
        }
        let elegidas: Vec<String> = libro
            .nombres()
            .into_iter()
            .filter(|n| especificas.iter().any(|e| *e == n))
            .collect();
        if elegidas.is_empty() {
            tracing::warn!(abas = ?self.0, "nenhuma aba conhecida na seleção; usando todas");
            return libro.nombres();
        }
        elegidas
    }
}

/// Tabla de trabajo: filas de las abas elegidas con las columnas canónicas completas.
pub fn montar_tabla_trabajo(carga: &Carga, abas: &[String]) -> Tabla {
    let idx_aba = carga.completa.col_index(COLUNA_ABA);
    let mut tabla = carga.completa.filter_rows(|f| match idx_aba {
        Some(i) => f[i].as_deref().map(|a| abas.iter().any(|x| x == a)).unwrap_or(false),
        None => false,
    });
    completar_canonicas(&mut tabla, &carga.mapeos);
    tabla
}

/// Crea cada columna canónica sólo si no existe y copia, para las filas de
/// cada aba, los valores de la columna real mapeada. Nunca copia una
/// columna sobre sí misma.
pub fn completar_canonicas(tabla: &mut Tabla, mapeos: &HashMap<String, MapeoColumnas>) {
    let canonicas = campos_canonicos();
    for alvo in &canonicas {
        tabla.ensure_col(alvo);
    }

    let Some(idx_aba) = tabla.col_index(COLUNA_ABA) else {
        return;
    };

    // abas presentes en orden de aparición
    let mut abas: Vec<String> = Vec::new();
    for fila in &tabla.filas {
        if let Some(a) = &fila[idx_aba] {
            if !abas.contains(a) {
                abas.push(a.clone());
            }
        }
    }

    for aba in &abas {
        let Some(m) = mapeos.get(aba) else { continue };
        for alvo in &canonicas {
            let Some(col_real) = m.get(alvo) else { continue };
            // Si la columna real ya tiene el mismo nombre que el alvo no hay nada que copiar
            if col_real == *alvo {
                continue;
            }
            let (Some(i_real), Some(i_alvo)) = (tabla.col_index(col_real), tabla.col_index(alvo)) else {
                continue;
            };
            for fila in tabla.filas.iter_mut() {
                if fila[idx_aba].as_deref() == Some(aba.as_str()) {
                    fila[i_alvo] = fila[i_real].clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Hoja;

    fn libro() -> Libro {
        Libro {
            hojas: vec![
                Hoja {
                    nombre: "2024".to_string(),
                    tabla: Tabla::from_str_rows(&["UNIDADE DE DESTINO", "QTD"], &[&["HOSPITAL A", "3"]]),
                },
                Hoja {
                    nombre: "2025".to_string(),
                    tabla: Tabla::from_str_rows(&["UNIDADES DE DESTINO", "FORNECEDOR"], &[&["HOSPITAL B", "ACME"]]),
                },
            ],
        }
    }

    #[test]
    fn concat_agrega_columna_aba() {
        let t = concat_hojas(&libro());
        assert_eq!(
            t.columnas,
            vec!["UNIDADE DE DESTINO", "QTD", "ABA", "UNIDADES DE DESTINO", "FORNECEDOR"]
        );
        assert_eq!(t.cell(0, "ABA"), Some("2024"));
        assert_eq!(t.cell(1, "ABA"), Some("2025"));
        assert_eq!(t.cell(1, "QTD"), None);
    }

    #[test]
    fn seleccion_de_abas() {
        let l = libro();
        assert_eq!(SelecaoAbas::default().resolver(&l), vec!["2024", "2025"]);
        assert_eq!(SelecaoAbas::todas().resolver(&l), vec!["2024", "2025"]);
        assert_eq!(SelecaoAbas(vec!["2025".into()]).resolver(&l), vec!["2025"]);
        assert_eq!(
            SelecaoAbas(vec!["2025".into(), TODAS_ABAS.into()]).resolver(&l),
            vec!["2024", "2025"]
        );
    }

    #[test]
    fn copia_solo_filas_de_la_aba_y_sin_autocopia() {
        let carga = Carga::new(libro());
        let t = montar_tabla_trabajo(&carga, &carga.libro.nombres());
        // aba 2024 ya usa el nombre canónico: se mantiene
        assert_eq!(t.cell(0, "UNIDADE DE DESTINO"), Some("HOSPITAL A"));
        // aba 2025 copia desde "UNIDADES DE DESTINO"
        assert_eq!(t.cell(1, "UNIDADE DE DESTINO"), Some("HOSPITAL B"));
        assert_eq!(t.cell(1, "UNIDADES DE DESTINO"), Some("HOSPITAL B"));
        assert!(t.has_col("N° DA OF"));
    }
}
