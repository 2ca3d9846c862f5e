use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::algorithm::filters::{CadeiaFiltros, EtapaFiltro, EtapaVista};
use crate::excel::fusion::SelecaoAbas;

pub mod handlers;

/// Cuerpo de `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Cuerpo común de `/filtros`, `/filtros/export`, `/grafico` y `/grafico/svg`.
///
/// # JSON esperado:
/// ```json
/// {
///   "abas": ["(Todas)"],
///   "filtros": [
///     { "coluna": "UNIDADE DE DESTINO", "valor": "HOSPITAL A" },
///     { "coluna": "N° DA OF", "valor": "(Todos)" },
///     { "coluna": "(Nenhum)" }
///   ]
/// }
/// ```
///
/// - `abas`: vacío o con `(Todas)` usa todas las abas
/// - `filtros`: hasta cinco pasos; `(Nenhum)` corta la cadena y `(Todos)`
///   (o `valor` vacío o ausente) no restringe
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FiltroRequest {
    #[serde(default)]
    pub abas: Vec<String>,
    #[serde(default)]
    pub filtros: Vec<EtapaFiltro>,
}

impl FiltroRequest {
    pub fn selecao(&self) -> SelecaoAbas {
        SelecaoAbas(self.abas.clone())
    }

    pub fn cadeia(&self) -> CadeiaFiltros {
        CadeiaFiltros::desde_selecoes(self.filtros.clone())
    }
}

/// Respuesta de `POST /filtros`.
#[derive(Debug, Serialize)]
pub struct FiltroResponse {
    pub abas: Vec<String>,
    pub etapas: Vec<EtapaVista>,
    pub aviso: Option<String>,
    /// Orden de columnas del grid.
    pub colunas: Vec<String>,
    pub linhas: Vec<Vec<Option<String>>>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AbaResumo {
    pub nome: String,
    pub linhas: usize,
    pub colunas: usize,
}

/// Extrae usuario y contraseña de `Authorization: Basic ...`.
pub fn basic_auth(req: &HttpRequest) -> Option<(String, String)> {
    let valor = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    parse_basic(valor)
}

pub fn parse_basic(valor: &str) -> Option<(String, String)> {
    let (esquema, token) = valor.trim().split_once(' ')?;
    if !esquema.eq_ignore_ascii_case("basic") {
        return None;
    }
    let bytes = B64.decode(token.trim()).ok()?;
    let texto = String::from_utf8(bytes).ok()?;
    let (user, pass) = texto.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
