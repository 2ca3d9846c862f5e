//! Almacén de credenciales y autenticación.
//!
//! Dos fuentes, nunca combinadas:
//! - tabla `[credentials]` del TOML de secretos (preferida si trae al menos
//!   un usuario)
//! - archivo JSON `{ "<usuario>": { "password", "name", "role" } }`
//!
//! Las altas (`add_user`) sólo se persisten en el JSON.

pub mod hash;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

pub use hash::{hash_password, parece_hash, verify_password, ITERACIONES_POR_DEFECTO};

pub const ROL_POR_DEFECTO: &str = "user";

fn rol_por_defecto() -> String {
    ROL_POR_DEFECTO.to_string()
}

/// Entrada almacenada. `password` es un hash PBKDF2 o, en instalaciones
/// antiguas, texto plano.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credencial {
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "rol_por_defecto")]
    pub role: String,
}

/// Datos públicos de un usuario (sin la contraseña).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoUsuario {
    pub name: String,
    pub role: String,
}

/// De dónde salieron las credenciales cargadas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrigenCredenciales {
    Secretos,
    Archivo,
    Ninguno,
}

#[derive(Debug)]
pub struct AuthManager {
    usuarios: BTreeMap<String, Credencial>,
    credentials_file: PathBuf,
    origen: OrigenCredenciales,
    iteraciones: u32,
}

impl AuthManager {
    /// Carga las credenciales. Fuentes ilegibles o inválidas se registran y
    /// se saltan; nunca es un error.
    pub fn load(secrets_file: impl AsRef<Path>, credentials_file: impl Into<PathBuf>) -> Self {
        let credentials_file = credentials_file.into();
        let secrets_file = secrets_file.as_ref();

        let (usuarios, origen) = match leer_secretos(secrets_file) {
            Ok(Some(u)) if !u.is_empty() => (u, OrigenCredenciales::Secretos),
            Ok(_) => leer_json_o_vacio(&credentials_file),
            Err(e) => {
                tracing::warn!(archivo = %secrets_file.display(), error = %e, "segredos ignorados");
                leer_json_o_vacio(&credentials_file)
            }
        };

        tracing::info!(usuarios = usuarios.len(), origen = ?origen, "credenciais carregadas");
        AuthManager { usuarios, credentials_file, origen, iteraciones: ITERACIONES_POR_DEFECTO }
    }

    /// Almacén vacío respaldado por `credentials_file`.
    pub fn vacio(credentials_file: impl Into<PathBuf>) -> Self {
        AuthManager {
            usuarios: BTreeMap::new(),
            credentials_file: credentials_file.into(),
            origen: OrigenCredenciales::Ninguno,
            iteraciones: ITERACIONES_POR_DEFECTO,
        }
    }

    /// Cambia las iteraciones de PBKDF2 usadas en nuevas altas.
    pub fn with_iteraciones(mut self, iteraciones: u32) -> Self {
        self.iteraciones = iteraciones.max(1);
        self
    }

    pub fn origen(&self) -> OrigenCredenciales {
        self.origen
    }

    pub fn len(&self) -> usize {
        self.usuarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usuarios.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.usuarios.contains_key(username)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let Some(cred) = self.usuarios.get(username) else {
            return false;
        };
        if parece_hash(&cred.password) {
            return verify_password(password, &cred.password);
        }
        tracing::warn!(usuario = username, "senha armazenada em texto plano");
        cred.password == password
    }

    /// Da de alta un usuario y reescribe el JSON completo.
    ///
    /// `Ok(false)` si ya existe. Si la escritura falla, el alta se deshace.
    pub fn add_user(
        &mut self,
        username: &str,
        password: &str,
        name: &str,
        role: &str,
    ) -> Result<bool, AuthError> {
        if self.usuarios.contains_key(username) {
            return Ok(false);
        }
        let cred = Credencial {
            password: hash::hash_password(password, self.iteraciones),
            name: name.to_string(),
            role: role.to_string(),
        };
        self.usuarios.insert(username.to_string(), cred);

        if let Err(e) = self.guardar() {
            self.usuarios.remove(username);
            return Err(e);
        }
        tracing::info!(usuario = username, archivo = %self.credentials_file.display(), "usuário adicionado");
        Ok(true)
    }

    pub fn get_user_info(&self, username: &str) -> Option<InfoUsuario> {
        self.usuarios
            .get(username)
            .map(|c| InfoUsuario { name: c.name.clone(), role: c.role.clone() })
    }

    fn guardar(&self) -> Result<(), AuthError> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.usuarios.serialize(&mut ser)?;
        fs::write(&self.credentials_file, buf).map_err(|source| AuthError::Io {
            path: self.credentials_file.display().to_string(),
            source,
        })
    }
}

fn leer_json_o_vacio(path: &Path) -> (BTreeMap<String, Credencial>, OrigenCredenciales) {
    if !path.exists() {
        return (BTreeMap::new(), OrigenCredenciales::Ninguno);
    }
    match leer_json(path) {
        Ok(u) => (u, OrigenCredenciales::Archivo),
        Err(e) => {
            tracing::warn!(archivo = %path.display(), error = %e, "arquivo de credenciais ignorado");
            (BTreeMap::new(), OrigenCredenciales::Ninguno)
        }
    }
}

fn leer_json(path: &Path) -> Result<BTreeMap<String, Credencial>, AuthError> {
    let texto = fs::read_to_string(path)
        .map_err(|source| AuthError::Io { path: path.display().to_string(), source })?;
    Ok(serde_json::from_str(&texto)?)
}

/// `Ok(None)` si no hay archivo o no tiene tabla `[credentials]`.
fn leer_secretos(path: &Path) -> Result<Option<BTreeMap<String, Credencial>>, AuthError> {
    if !path.exists() {
        return Ok(None);
    }
    let texto = fs::read_to_string(path)
        .map_err(|source| AuthError::Io { path: path.display().to_string(), source })?;
    let raiz: toml::Table = texto.parse()?;
    match raiz.get("credentials").and_then(toml::Value::as_table) {
        Some(seccion) => credenciales_desde_toml(seccion).map(Some),
        None => Ok(None),
    }
}

/// Acepta la forma plana (`username = ...` directamente en la sección) y la
/// forma por clave (`[credentials.<usuario>]`).
fn credenciales_desde_toml(seccion: &toml::Table) -> Result<BTreeMap<String, Credencial>, AuthError> {
    let mut out = BTreeMap::new();

    if let Some(usuario) = seccion.get("username").and_then(toml::Value::as_str) {
        out.insert(usuario.to_string(), credencial_desde_toml(usuario, seccion)?);
        return Ok(out);
    }

    for (usuario, valor) in seccion {
        let Some(datos) = valor.as_table() else {
            return Err(AuthError::EntradaIncompleta { usuario: usuario.clone(), campo: "password".into() });
        };
        out.insert(usuario.clone(), credencial_desde_toml(usuario, datos)?);
    }
    Ok(out)
}

fn credencial_desde_toml(usuario: &str, datos: &toml::Table) -> Result<Credencial, AuthError> {
    let campo = |nombre: &str| -> Result<String, AuthError> {
        match datos.get(nombre) {
            Some(toml::Value::String(s)) => Ok(s.clone()),
            Some(otro) => Ok(otro.to_string()),
            None => Err(AuthError::EntradaIncompleta { usuario: usuario.to_string(), campo: nombre.to_string() }),
        }
    };
    Ok(Credencial { password: campo("password")?, name: campo("name")?, role: campo("role")? })
}
