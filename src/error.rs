//! Errores del crate agrupados por área.
//!
//! Cada área tiene su propio enum; los handlers HTTP los traducen a cuerpos
//! JSON y el binario los propaga como `Box<dyn Error>`.

use thiserror::Error;

/// Fallos al obtener o interpretar la planilla. Siempre fatales para el
/// ciclo actual: nunca se devuelve un resultado parcial.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("falha ao baixar a planilha: {0}")]
    Http(#[from] reqwest::Error),

    #[error("a fonte respondeu com status HTTP {0}")]
    Status(u16),

    #[error("falha ao ler {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("falha ao interpretar o XLSX: {0}")]
    Parse(#[from] calamine::Error),

    #[error("a carga foi interrompida: {0}")]
    Interrupted(String),
}

/// Cadena de filtros inválida.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FiltroError {
    #[error("no máximo {max} filtros são permitidos (recebidos {recebidos})")]
    MuitasEtapas { max: usize, recebidos: usize },

    #[error("a coluna '{coluna}' não está disponível no {etapa}º filtro")]
    ColunaIndisponivel { etapa: usize, coluna: String },
}

/// Errores del almacén de credenciales.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("falha de E/S em {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON de credenciais inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML de segredos inválido: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("entrada de credencial incompleta para '{usuario}': falta '{campo}'")]
    EntradaIncompleta { usuario: String, campo: String },
}

/// Variables de entorno con valores no interpretables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} deve ser um número inteiro não negativo (valor: '{valor}')")]
    NumeroInvalido { var: String, valor: String },
}

/// Fallos al renderizar el gráfico.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("falha ao desenhar o gráfico: {0}")]
    Render(String),
}
