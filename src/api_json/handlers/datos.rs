use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use super::{autorizar, cargar, consultar};
use crate::algorithm::ordenar_colunas;
use crate::api_json::{AbaResumo, FiltroRequest, FiltroResponse};
use crate::excel::export::{exportar_csv, NOMBRE_EXPORT};
use crate::server::AppState;

pub async fn abas_handler(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = autorizar(&state, &req).await {
        return resp;
    }
    let carga = match cargar(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let abas: Vec<AbaResumo> = carga
        .libro
        .hojas
        .iter()
        .map(|h| AbaResumo { nome: h.nombre.clone(), linhas: h.tabla.len(), colunas: h.tabla.columnas.len() })
        .collect();

    HttpResponse::Ok().json(json!({
        "abas": abas,
        "total_linhas": carga.completa.len(),
        "carregado_em": carga.cargado_en.to_rfc3339(),
    }))
}

/// Aplica abas y filtros y devuelve el grid ya ordenado.
pub async fn filtros_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<FiltroRequest>,
) -> impl Responder {
    let consulta = match consultar(&state, &req, &body).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let tabla = &consulta.filtro.tabla;
    let colunas = ordenar_colunas(tabla);
    let grid = tabla.select(&colunas);

    HttpResponse::Ok().json(FiltroResponse {
        abas: consulta.abas,
        etapas: consulta.filtro.etapas,
        aviso: consulta.filtro.aviso,
        total: grid.len(),
        colunas,
        linhas: grid.filas,
    })
}

/// Mismas reglas que `/filtros`; devuelve la tabla filtrada completa en CSV.
pub async fn export_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<FiltroRequest>,
) -> impl Responder {
    let consulta = match consultar(&state, &req, &body).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match exportar_csv(&consulta.filtro.tabla) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(NOMBRE_EXPORT.to_string())],
            })
            .body(bytes),
        Err(e) => {
            tracing::error!(error = %e, "falha ao gerar CSV");
            HttpResponse::InternalServerError().json(json!({"error": format!("failed to export: {}", e)}))
        }
    }
}

/// Descarta la planilla cacheada; la próxima request la vuelve a descargar.
pub async fn refresh_handler(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let usuario = match autorizar(&state, &req).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    state.cache.invalidate_key(&state.cache_key());
    tracing::info!(usuario = %usuario, "cache invalidado a pedido");
    HttpResponse::Ok().json(json!({"status": "ok"}))
}
