use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use super::consultar;
use crate::algorithm::grafico::{agregar, render_svg, Grafico};
use crate::api_json::FiltroRequest;
use crate::server::AppState;

/// Datos agregados del gráfico sobre la tabla filtrada.
pub async fn grafico_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<FiltroRequest>,
) -> impl Responder {
    match consultar(&state, &req, &body).await {
        Ok(consulta) => HttpResponse::Ok().json(agregar(&consulta.filtro.tabla)),
        Err(resp) => resp,
    }
}

/// El mismo gráfico como SVG. Si faltan columnas responde el mensaje en JSON.
pub async fn grafico_svg_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<FiltroRequest>,
) -> impl Responder {
    let consulta = match consultar(&state, &req, &body).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let dados = match agregar(&consulta.filtro.tabla) {
        Grafico::Dados(d) => d,
        otro => return HttpResponse::Ok().json(otro),
    };

    match render_svg(&dados) {
        Ok(svg) => HttpResponse::Ok().content_type("image/svg+xml").body(svg),
        Err(e) => {
            tracing::error!(error = %e, "falha ao desenhar gráfico");
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
    }
}
