// Biblioteca raíz del crate `entregas`.
// Reexporta los módulos principales: carga de la planilla, filtros
// encadenados, gráfico, autenticación y el servidor HTTP.
pub mod algorithm;
pub mod api_json;
pub mod auth;
pub mod config;
pub mod error;
pub mod excel;
pub mod models;
pub mod server;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::{run_server, AppState};

pub use algorithm::{ejecutar_consulta, CadeiaFiltros, EtapaFiltro};
pub use auth::AuthManager;
pub use config::AppConfig;
pub use excel::{cargar_planilha, Carga, LoadCache};
pub use models::{Hoja, Libro, Tabla};
