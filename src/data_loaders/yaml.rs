use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::{LazyLock, PoisonError, RwLock},
    time::{Duration, Instant},
};

use serde_yaml::Value;

use crate::info;

/* =========================
   CONFIG CACHE
========================= */

// Per-file cache for YAML data
static YAML_CACHE: LazyLock<RwLock<HashMap<String, (Value, Instant)>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));
const CACHE_TTL: Duration = Duration::from_secs(1);
const CACHE_CAPACITY: usize = 16;

/// YAML loader with a short-lived per-file cache.
pub fn load_yaml(path: &Path) -> Option<Value> {
    let now = Instant::now();
    let key = path.to_string_lossy().to_string();
    {
        let cache = YAML_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some((v, t)) = cache.get(&key) {
            if now.duration_since(*t) < CACHE_TTL {
                return Some(v.clone());
            }
        }
    }

    let txt = fs::read_to_string(path).ok()?;
    let v: Value = match serde_yaml::from_str(&txt) {
        Ok(v) => v,
        Err(e) => {
            info!("[YAML] {} is not valid YAML: {}", path.display(), e);
            return None;
        }
    };
    let mut cache = YAML_CACHE.write().unwrap_or_else(PoisonError::into_inner);

    if cache.len() >= CACHE_CAPACITY {
        if let Some(oldest_key) = cache
            .iter()
            .min_by_key(|(_, (_, t))| t)
            .map(|(k, _)| k.clone())
        {
            cache.remove(&oldest_key);
        }
    }

    cache.insert(key, (v.clone(), now));
    Some(v)
}
