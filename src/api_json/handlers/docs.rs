use actix_web::{HttpResponse, Responder};

const HELP_JSON: &str = include_str!("../../../help.json");

/// Guía de uso de la API con un request de ejemplo. No requiere auth.
pub async fn help_handler() -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/json; charset=utf-8")
        .body(HELP_JSON)
}
