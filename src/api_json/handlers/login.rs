use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use super::{verificar, MSG_CAMPOS_VAZIOS, MSG_CREDENCIAIS_INVALIDAS};
use crate::api_json::LoginRequest;
use crate::server::AppState;

/// Comprueba credenciales y devuelve los datos públicos del usuario. No
/// crea sesión: las demás rutas piden Basic auth en cada request.
pub async fn login_handler(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let LoginRequest { username, password } = body.into_inner();
    if username.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": MSG_CAMPOS_VAZIOS}));
    }

    if !verificar(&state, &username, password).await {
        tracing::warn!(usuario = %username, "login recusado");
        return HttpResponse::Unauthorized().json(json!({"error": MSG_CREDENCIAIS_INVALIDAS}));
    }

    tracing::info!(usuario = %username, "login realizado");
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "✅ Login realizado com sucesso!",
        "username": username,
        "user": state.auth.get_user_info(&username),
    }))
}
