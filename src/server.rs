use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};

use crate::api_json::handlers;
use crate::auth::AuthManager;
use crate::config::AppConfig;
use crate::error::LoadError;
use crate::excel::{cargar_planilha, CacheKey, Carga, LoadCache, SheetSource};

/// Estado compartido entre workers.
pub struct AppState {
    pub config: AppConfig,
    pub cache: LoadCache,
    pub fuente: Arc<dyn SheetSource>,
    pub auth: AuthManager,
}

impl AppState {
    pub fn new(config: AppConfig, fuente: Arc<dyn SheetSource>, auth: AuthManager) -> Self {
        let cache = LoadCache::new(config.cache_ttl);
        AppState { config, cache, fuente, auth }
    }

    /// Estado a partir de la configuración: fuente según la URL y
    /// credenciales desde secretos o el JSON.
    pub fn from_config(config: AppConfig) -> Self {
        let fuente = config.fuente();
        let auth = AuthManager::load(&config.secrets_file, config.credentials_file.clone());
        AppState::new(config, fuente, auth)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.fuente.id(), self.config.header_row)
    }

    /// Planilla cacheada o recién cargada. Bloqueante: desde un handler,
    /// llamar dentro de `web::block`.
    pub fn carga(&self) -> Result<Arc<Carga>, LoadError> {
        let key = self.cache_key();
        self.cache
            .get_or_load(&key, || cargar_planilha(self.fuente.as_ref(), self.config.header_row))
    }
}

/// Registra todas las rutas. Compartido por `run_server` y los tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(handlers::login_handler))
        .route("/abas", web::get().to(handlers::abas_handler))
        .route("/filtros", web::post().to(handlers::filtros_handler))
        .route("/filtros/export", web::post().to(handlers::export_handler))
        .route("/grafico", web::post().to(handlers::grafico_handler))
        .route("/grafico/svg", web::post().to(handlers::grafico_svg_handler))
        .route("/refresh", web::post().to(handlers::refresh_handler))
        .route("/help", web::get().to(handlers::help_handler));
}

pub async fn run_server(state: AppState, bind: &str) -> std::io::Result<()> {
    let data = web::Data::new(state);
    tracing::info!(bind, "servidor iniciando");

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(web::JsonConfig::default().limit(1 << 20))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
