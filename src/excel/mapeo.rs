//! Mapeo entre los campos canónicos del panel y los nombres reales que
//! cada aba usa para ellos.
//!
//! Las abas de la planilla no comparten encabezados: "UNIDADES DE DESTINO",
//! "Unidade destino" y "PROJETO DAS EQUIPAGEM DAS UNIDADES" representan el
//! mismo campo. La tabla estática `ALVO_NOMES` lista, para cada campo
//! canónico, los alias aceptados en orden de preferencia.
//!
//! Prioridad del match (por campo):
//! 1. igualdad exacta tras `normalize_name` (primera columna en orden de tabla)
//! 2. contención: algún alias normalizado es substring de la columna normalizada

use std::collections::HashMap;

use super::io::normalize_name;
use crate::models::Tabla;

/// Campo canónico → alias aceptados.
pub type AliasTabla = [(&'static str, &'static [&'static str])];

pub const ALVO_NOMES: &AliasTabla = &[
    (
        "DESCRIÇÃO DO ITEM RESUMIDA",
        &["descrição do item resumida", "descricao do item resumida", "descricao", "resumida", "item"],
    ),
    (
        "UNIDADE DE DESTINO",
        &[
            "unidade de destino",
            "unidades de destino",
            "unidade destino",
            "unidade",
            "destino",
            "projeto das equipagem das unidades",
        ],
    ),
    (
        "N° DA OF",
        &["n° da of", "nº da of", "no da of", "n da of", "n° of", "nº of", "no of", "n of", "of"],
    ),
    (
        "QUANTIDADE ENTREGUE NA UNIDADE",
        &[
            "quantidade entregue na unidade",
            "QUANT. ENTREGUE NA UNIDADE",
            "quantidade entregue",
            "quantidade",
            "qtd",
            "quant.",
            "quant",
        ],
    ),
    (
        "QUANTIDADE NA ATA E CONSUMO",
        &[
            "quantidade na ata e consumo",
            "qtd na ata e consumo",
            "quantidade na ata",
            "quantidade",
            "qtd",
            "quant.",
            "quant",
        ],
    ),
];

/// Nombres canónicos en el orden de `ALVO_NOMES`.
pub fn campos_canonicos() -> Vec<&'static str> {
    ALVO_NOMES.iter().map(|(alvo, _)| *alvo).collect()
}

/// Resultado del mapeo de una aba.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapeoColumnas {
    /// Clave: campo canónico. Valor: nombre real de la columna en la aba.
    pub campos: HashMap<String, String>,
}

impl MapeoColumnas {
    pub fn new() -> Self {
        MapeoColumnas { campos: HashMap::new() }
    }

    pub fn get(&self, alvo: &str) -> Option<&str> {
        self.campos.get(alvo).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.campos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campos.is_empty()
    }

    pub fn resumen(&self) -> String {
        let mut pares: Vec<String> = self
            .campos
            .iter()
            .map(|(alvo, real)| format!("{} ← {}", alvo, real))
            .collect();
        pares.sort();
        format!("{} campos mapeados: {}", self.campos.len(), pares.join(" | "))
    }
}

/// Mapea los campos de `ALVO_NOMES` sobre las columnas de la tabla.
pub fn mapear_columnas(tabla: &Tabla) -> MapeoColumnas {
    mapear_columnas_con(&tabla.columnas, ALVO_NOMES)
}

/// Igual que `mapear_columnas` pero con una tabla de alias arbitraria.
pub fn mapear_columnas_con(columnas: &[String], alvos: &AliasTabla) -> MapeoColumnas {
    let cols_norm: Vec<(&String, String)> = columnas.iter().map(|c| (c, normalize_name(c))).collect();
    let mut mapeo = MapeoColumnas::new();

    for (alvo, aliases) in alvos {
        let aliases_norm: Vec<String> = aliases.iter().map(|a| normalize_name(a)).collect();

        // match exacto
        let mut achou = cols_norm
            .iter()
            .find(|(_, cn)| aliases_norm.iter().any(|a| a == cn))
            .map(|(c, _)| (*c).clone());

        // fallback: contiene parte del alias
        if achou.is_none() {
            achou = cols_norm
                .iter()
                .find(|(_, cn)| aliases_norm.iter().any(|a| cn.contains(a.as_str())))
                .map(|(c, _)| (*c).clone());
        }

        if let Some(real) = achou {
            mapeo.campos.insert(alvo.to_string(), real);
        }
    }
    mapeo
}

/// Busca la primera columna que coincide con alguno de los `targets`, en el
/// orden de los targets. Una columna coincide si su nombre normalizado es
/// igual o contiene al target normalizado.
pub fn find_col(columnas: &[String], targets: &[&str]) -> Option<String> {
    let cols_norm: Vec<(&String, String)> = columnas.iter().map(|c| (c, normalize_name(c))).collect();
    for t in targets {
        let tnorm = normalize_name(t);
        if let Some((c, _)) = cols_norm.iter().find(|(_, cn)| *cn == tnorm || cn.contains(tnorm.as_str())) {
            return Some((*c).clone());
        }
    }
    None
}
