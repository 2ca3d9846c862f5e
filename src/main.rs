// --- Painel de entregas - binario principal ---

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use entregas::algorithm::filters::EtapaFiltro;
use entregas::api_json::FiltroRequest;
use entregas::auth::ROL_POR_DEFECTO;
use entregas::excel::export::exportar_csv;
use entregas::{cargar_planilha, ejecutar_consulta, run_server, AppConfig, AppState, AuthManager};

#[derive(Parser)]
#[command(name = "entregas")]
#[command(about = "Painel de entregas: consulta filtrada da planilha de entregas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (default)
    Serve {
        /// Address to bind, overrides ENTREGAS_BIND
        #[arg(long)]
        bind: Option<String>,
    },

    /// Add a user to the credentials JSON file
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = ROL_POR_DEFECTO)]
        role: String,
    },

    /// Load the sheet, apply filters and write the result as CSV
    Export {
        #[arg(long)]
        output: PathBuf,
        /// Sheet to include (repeatable); all sheets when omitted
        #[arg(long = "aba")]
        abas: Vec<String>,
        /// Filter step as COLUMN=VALUE (repeatable, in order)
        #[arg(long = "filtro", value_parser = parse_filtro)]
        filtros: Vec<EtapaFiltro>,
    },
}

fn parse_filtro(s: &str) -> Result<EtapaFiltro, String> {
    let (coluna, valor) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))?;
    let valor = valor.trim();
    Ok(EtapaFiltro::new(coluna.trim(), (!valor.is_empty()).then_some(valor)))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let state = AppState::from_config(config);
            if state.auth.is_empty() {
                tracing::warn!("nenhum usuário cadastrado; use 'entregas add-user'");
            }
            println!("=== Painel de entregas (API) ===");
            println!("Iniciando servidor em http://{}", bind);
            actix_web::rt::System::new().block_on(run_server(state, &bind))?;
        }
        Commands::AddUser { username, password, name, role } => {
            let mut auth = AuthManager::load(&config.secrets_file, config.credentials_file.clone());
            if auth.add_user(&username, &password, &name, &role)? {
                println!("Usuário '{}' adicionado em {}", username, config.credentials_file.display());
            } else {
                return Err(format!("usuário '{}' já existe", username).into());
            }
        }
        Commands::Export { output, abas, filtros } => {
            let fuente = config.fuente();
            let carga = cargar_planilha(fuente.as_ref(), config.header_row)?;
            let req = FiltroRequest { abas, filtros };
            let consulta = ejecutar_consulta(&carga, &req.selecao(), &req.cadeia())?;
            if let Some(aviso) = &consulta.filtro.aviso {
                eprintln!("{}", aviso);
            }
            let bytes = exportar_csv(&consulta.filtro.tabla)?;
            std::fs::write(&output, bytes)?;
            println!("{} registros exportados para {}", consulta.filtro.tabla.len(), output.display());
        }
    }
    Ok(())
}
