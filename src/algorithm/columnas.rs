//! Orden de columnas del grid.

use crate::excel::fusion::COLUNA_ABA;
use crate::excel::mapeo::campos_canonicos;
use crate::models::Tabla;

/// Columnas "de capa" que, cuando existen, aparecen primero en el grid.
pub const CAPA_PRIORIDADE: &[&str] = &[
    "ABA",
    "Nº ATA", "N° ATA", "NO ATA", "N ATA",
    "GESTOR DA ATA",
    "SEI DE CONSUMO",
    "E-FISCO", "E FISCO", "EFISCO",
    "GRUPO DE DESPESA",
    "DESCRIÇÃO DO ITEM RESUMIDA",
    "UNIDADES DE DESTINO", "UNIDADE DE DESTINO",
    "FORNECEDOR",
    "N° OF", "Nº OF", "N° DA OF", "Nº DA OF", "n° da OF", "n° da of",
    "PREVISÃO DO FORN", "PREVISAO DO FORN", "PREVISÃO DO FORNECIMENTO",
];

/// Capa primero, luego los campos canónicos restantes, luego el resto en
/// orden de tabla. `ABA` no se muestra en el grid.
pub fn ordenar_colunas(tabla: &Tabla) -> Vec<String> {
    let mut orden: Vec<String> = Vec::new();
    let candidatos = CAPA_PRIORIDADE
        .iter()
        .copied()
        .chain(campos_canonicos())
        .map(str::to_string)
        .chain(tabla.columnas.iter().cloned());

    for c in candidatos {
        if tabla.has_col(&c) && !orden.contains(&c) {
            orden.push(c);
        }
    }
    orden.retain(|c| c != COLUNA_ABA);
    orden
}
