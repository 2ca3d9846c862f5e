//! Caché en memoria de la planilla ya interpretada.
//!
//! La descarga + parseo es lo único costoso del flujo, así que el resultado
//! (`Carga`) se guarda por (fuente, fila de encabezado) con un TTL. El botón
//! de "refresh" llama a `invalidate` antes de recargar.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::Carga;
use crate::error::LoadError;

/// TTL por defecto: 10 minutos.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub fuente: String,
    pub header_row: usize,
}

impl CacheKey {
    pub fn new(fuente: impl Into<String>, header_row: usize) -> Self {
        CacheKey { fuente: fuente.into(), header_row }
    }
}

struct Entrada {
    guardado: Instant,
    carga: Arc<Carga>,
}

/// Caché con semántica get-or-load. Compartido entre todos los usuarios del proceso.
pub struct LoadCache {
    ttl: Duration,
    entradas: Mutex<HashMap<CacheKey, Entrada>>,
}

impl LoadCache {
    pub fn new(ttl: Duration) -> Self {
        LoadCache { ttl, entradas: Mutex::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // Un panic con el lock tomado no deja el mapa inconsistente: sólo se insertan o borran Arcs.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entrada>> {
        self.entradas.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Devuelve la entrada si existe y no expiró.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Carga>> {
        let guard = self.lock();
        guard
            .get(key)
            .filter(|e| e.guardado.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.carga))
    }

    /// Devuelve la carga cacheada o ejecuta `loader`, la guarda y la devuelve.
    ///
    /// El loader corre sin el lock tomado; si falla no se guarda nada y el
    /// error se propaga tal cual.
    pub fn get_or_load<F>(&self, key: &CacheKey, loader: F) -> Result<Arc<Carga>, LoadError>
    where
        F: FnOnce() -> Result<Carga, LoadError>,
    {
        if let Some(existing) = self.get(key) {
            tracing::debug!(fuente = %key.fuente, "planilha servida do cache");
            return Ok(existing);
        }

        let carga = Arc::new(loader()?);
        let mut guard = self.lock();
        guard.insert(
            key.clone(),
            Entrada { guardado: Instant::now(), carga: Arc::clone(&carga) },
        );
        Ok(carga)
    }

    /// Vacía el caché completo.
    pub fn invalidate(&self) {
        let mut guard = self.lock();
        let n = guard.len();
        guard.clear();
        tracing::info!(entradas = n, "cache de planilhas invalidado");
    }

    pub fn invalidate_key(&self, key: &CacheKey) {
        self.lock().remove(key);
    }

    /// Número de entradas almacenadas (incluidas las expiradas).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LoadCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
