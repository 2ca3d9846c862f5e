//! Motor de filtros encadenados.
//!
//! El usuario elige hasta cinco pares (columna, valor) en secuencia:
//! - 1º filtro obligatorio: columna entre los campos canónicos presentes;
//!   valor `(Todos)` deja la tabla igual.
//! - 2º a 5º opcionales: `(Nenhum)` termina la cadena. Cada paso sólo ofrece
//!   columnas no usadas en los pasos anteriores.
//!
//! Los valores ofrecidos en cada paso salen de la tabla ya filtrada por los
//! pasos anteriores.

use serde::{Deserialize, Serialize};

use crate::error::FiltroError;
use crate::excel::mapeo::campos_canonicos;
use crate::models::Tabla;

pub const MAX_ETAPAS: usize = 5;

/// Valor que no restringe la columna elegida.
pub const OPCAO_TODOS: &str = "(Todos)";

/// Columna que termina la cadena en los pasos opcionales.
pub const OPCAO_NENHUM: &str = "(Nenhum)";

pub const AVISO_SEM_COLUNAS: &str = "⚠️ Nenhuma das colunas de filtro iniciais existe na planilha.";

/// Un paso de la cadena. `valor = None` equivale a `(Todos)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtapaFiltro {
    pub coluna: String,
    #[serde(default)]
    pub valor: Option<String>,
}

impl EtapaFiltro {
    pub fn new(coluna: impl Into<String>, valor: Option<&str>) -> Self {
        EtapaFiltro { coluna: coluna.into(), valor: valor.map(str::to_string) }
    }
}

/// Estado de la cadena de filtros (0 a 5 pasos). `Default` es el estado
/// inicial: 1º filtro sin elegir y 2º–5º vacíos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadeiaFiltros {
    pub etapas: Vec<EtapaFiltro>,
}

impl CadeiaFiltros {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye la cadena a partir de lo que envía la UI, interpretando los
    /// centinelas: `(Nenhum)` como columna corta la cadena y `(Todos)` o un
    /// valor vacío equivalen a no restringir.
    pub fn desde_selecoes(selecoes: Vec<EtapaFiltro>) -> Self {
        let mut etapas = Vec::new();
        for mut e in selecoes {
            if e.coluna == OPCAO_NENHUM || e.coluna.trim().is_empty() {
                break;
            }
            if matches!(e.valor.as_deref().map(str::trim), Some(OPCAO_TODOS) | Some("")) {
                e.valor = None;
            }
            etapas.push(e);
        }
        CadeiaFiltros { etapas }
    }

    /// Vuelve al estado inicial.
    pub fn limpar(&mut self) {
        self.etapas.clear();
    }

    pub fn len(&self) -> usize {
        self.etapas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.etapas.is_empty()
    }
}

/// Lo que la UI necesita para dibujar un paso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtapaVista {
    /// 1-based
    pub numero: usize,
    pub obrigatoria: bool,
    pub colunas_disponiveis: Vec<String>,
    pub coluna: Option<String>,
    pub valores_disponiveis: Vec<String>,
    pub valor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultadoFiltro {
    pub tabla: Tabla,
    pub etapas: Vec<EtapaVista>,
    pub aviso: Option<String>,
}

/// Campos canónicos presentes en la tabla, en el orden de `ALVO_NOMES`.
pub fn campos_filtraveis(tabla: &Tabla) -> Vec<String> {
    campos_canonicos()
        .into_iter()
        .filter(|c| tabla.has_col(c))
        .map(str::to_string)
        .collect()
}

/// Columnas ofrecidas en un paso: las presentes menos las ya usadas.
pub fn colunas_para_etapa(presentes: &[String], usadas: &[&str]) -> Vec<String> {
    presentes
        .iter()
        .filter(|c| !usadas.contains(&c.as_str()))
        .cloned()
        .collect()
}

/// Valores distintos no vacíos de la columna, ordenados.
pub fn valores_distintos(tabla: &Tabla, coluna: &str) -> Vec<String> {
    let mut vals: Vec<String> = tabla
        .column_values(coluna)
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    vals.sort();
    vals.dedup();
    vals
}

/// Filas cuya columna es igual (como texto) al valor. Celdas vacías nunca coinciden.
pub fn filtrar_igual(tabla: &Tabla, coluna: &str, valor: &str) -> Tabla {
    match tabla.col_index(coluna) {
        Some(i) => tabla.filter_rows(|f| f[i].as_deref() == Some(valor)),
        None => tabla.clone(),
    }
}

/// Aplica la cadena sobre la tabla de trabajo.
///
/// Siempre devuelve las cinco vistas de paso: las que no tienen columna
/// elegida quedan vacías pero ya traen las columnas que ofrecerían.
pub fn aplicar_filtros(tabla: &Tabla, cadeia: &CadeiaFiltros) -> Result<ResultadoFiltro, FiltroError> {
    if cadeia.len() > MAX_ETAPAS {
        return Err(FiltroError::MuitasEtapas { max: MAX_ETAPAS, recebidos: cadeia.len() });
    }

    let presentes = campos_filtraveis(tabla);
    if presentes.is_empty() {
        tracing::warn!("nenhuma coluna de filtro presente; sem filtragem");
        return Ok(ResultadoFiltro {
            tabla: tabla.clone(),
            etapas: Vec::new(),
            aviso: Some(AVISO_SEM_COLUNAS.to_string()),
        });
    }

    let mut actual = tabla.clone();
    let mut usadas: Vec<String> = Vec::new();
    let mut etapas = Vec::with_capacity(MAX_ETAPAS);

    for i in 0..MAX_ETAPAS {
        let usadas_ref: Vec<&str> = usadas.iter().map(String::as_str).collect();
        let disponiveis = colunas_para_etapa(&presentes, &usadas_ref);
        let elegida = cadeia.etapas.get(i);

        // El 1º filtro siempre tiene columna: la elegida o la primera ofrecida
        let coluna: Option<String> = match elegida {
            Some(e) => {
                if !disponiveis.contains(&e.coluna) {
                    return Err(FiltroError::ColunaIndisponivel { etapa: i + 1, coluna: e.coluna.clone() });
                }
                Some(e.coluna.clone())
            }
            None if i == 0 => disponiveis.first().cloned(),
            None => None,
        };

        let valores = match &coluna {
            Some(c) => valores_distintos(&actual, c),
            None => Vec::new(),
        };
        let valor = elegida.and_then(|e| e.valor.clone());

        if let (Some(c), Some(v)) = (&coluna, &valor) {
            actual = filtrar_igual(&actual, c, v);
        }

        etapas.push(EtapaVista {
            numero: i + 1,
            obrigatoria: i == 0,
            colunas_disponiveis: disponiveis,
            coluna: coluna.clone(),
            valores_disponiveis: valores,
            valor,
        });

        if let Some(c) = coluna {
            usadas.push(c);
        }
    }

    tracing::debug!(etapas = cadeia.len(), filas = actual.len(), "filtros aplicados");
    Ok(ResultadoFiltro { tabla: actual, etapas, aviso: None })
}
