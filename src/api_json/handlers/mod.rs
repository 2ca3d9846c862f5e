pub mod datos;
pub mod docs;
pub mod grafico;
pub mod login;

pub use datos::*;
pub use docs::*;
pub use grafico::*;
pub use login::*;

use std::sync::Arc;

use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::algorithm::{ejecutar_consulta, ResultadoConsulta};
use crate::api_json::{basic_auth, FiltroRequest};
use crate::error::{FiltroError, LoadError};
use crate::excel::Carga;
use crate::server::AppState;

pub const MSG_CREDENCIAIS_INVALIDAS: &str = "❌ Usuário ou senha incorretos";
pub const MSG_CAMPOS_VAZIOS: &str = "❌ Por favor, preencha todos os campos";
pub const MSG_FALHA_LEITURA: &str =
    "❌ Não consegui ler a planilha. Abra o acesso (Qualquer pessoa com o link - Leitor).";
pub const MSG_PLANILHA_VAZIA: &str = "Planilha sem conteúdo legível.";

pub(crate) fn no_autorizado() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, "Basic realm=\"entregas\""))
        .json(json!({"error": MSG_CREDENCIAIS_INVALIDAS}))
}

/// Verifica usuario y contraseña en el pool bloqueante: el hash cuesta
/// decenas de milisegundos y no debe frenar el worker.
pub(crate) async fn verificar(state: &web::Data<AppState>, user: &str, pass: String) -> bool {
    let st = state.clone();
    let u = user.to_string();
    web::block(move || st.auth.authenticate(&u, &pass))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "verificação de senha interrompida");
            false
        })
}

/// Valida `Authorization: Basic` contra el almacén. Devuelve el usuario.
pub(crate) async fn autorizar(state: &web::Data<AppState>, req: &HttpRequest) -> Result<String, HttpResponse> {
    let Some((user, pass)) = basic_auth(req) else {
        return Err(no_autorizado());
    };
    if verificar(state, &user, pass).await {
        Ok(user)
    } else {
        tracing::warn!(usuario = %user, "autenticação recusada");
        Err(no_autorizado())
    }
}

/// Obtiene la planilla (caché o descarga) sin bloquear el worker.
pub(crate) async fn cargar(state: &web::Data<AppState>) -> Result<Arc<Carga>, HttpResponse> {
    let st = state.clone();
    let res = web::block(move || st.carga())
        .await
        .map_err(|e| LoadError::Interrupted(e.to_string()))
        .and_then(|r| r);

    match res {
        Ok(carga) if carga.libro.is_empty() => {
            tracing::warn!("planilha sem abas legíveis");
            Err(HttpResponse::UnprocessableEntity().json(json!({"warning": MSG_PLANILHA_VAZIA})))
        }
        Ok(carga) => Ok(carga),
        Err(e) => {
            tracing::error!(error = %e, "falha ao carregar planilha");
            Err(HttpResponse::BadGateway().json(json!({"error": MSG_FALHA_LEITURA, "detalhes": e.to_string()})))
        }
    }
}

fn filtro_invalido(e: FiltroError) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({"error": e.to_string()}))
}

/// Autoriza, carga y ejecuta la consulta del cuerpo. Cualquier fallo sale
/// como respuesta HTTP lista.
pub(crate) async fn consultar(
    state: &web::Data<AppState>,
    req: &HttpRequest,
    body: &FiltroRequest,
) -> Result<ResultadoConsulta, HttpResponse> {
    autorizar(state, req).await?;
    let carga = cargar(state).await?;
    ejecutar_consulta(&carga, &body.selecao(), &body.cadeia()).map_err(filtro_invalido)
}
