//! Orquestación del flujo principal: abas → tabla de trabajo → filtros.
//!
//! Submódulos:
//! - `filters`: cadena de hasta cinco filtros por igualdad
//! - `columnas`: orden de columnas del grid
//! - `grafico`: agregación y SVG del gráfico de barras

pub mod columnas;
pub mod filters;
pub mod grafico;

pub use columnas::ordenar_colunas;
pub use filters::{aplicar_filtros, CadeiaFiltros, EtapaFiltro, ResultadoFiltro};
pub use grafico::{agregar, render_svg, Grafico};

use crate::error::FiltroError;
use crate::excel::fusion::{montar_tabla_trabajo, SelecaoAbas};
use crate::excel::Carga;

/// Resultado de una consulta sobre la planilla cargada.
#[derive(Debug, Clone)]
pub struct ResultadoConsulta {
    /// Abas efectivamente consideradas.
    pub abas: Vec<String>,
    pub filtro: ResultadoFiltro,
}

/// Recorta por abas, completa las columnas canónicas y aplica la cadena de filtros.
pub fn ejecutar_consulta(
    carga: &Carga,
    selecao: &SelecaoAbas,
    cadeia: &CadeiaFiltros,
) -> Result<ResultadoConsulta, FiltroError> {
    let abas = selecao.resolver(&carga.libro);
    let trabajo = montar_tabla_trabajo(carga, &abas);
    let filtro = aplicar_filtros(&trabajo, cadeia)?;
    tracing::info!(
        abas = abas.len(),
        filas_trabajo = trabajo.len(),
        filas_filtradas = filtro.tabla.len(),
        "consulta executada"
    );
    Ok(ResultadoConsulta { abas, filtro })
}
