// In-process cache for responses that rarely change (popular menu listing).
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

const TTL: Duration = Duration::from_secs(60);

lazy_static::lazy_static! {
    static ref CACHE: RwLock<HashMap<String, (Instant, String)>> = RwLock::new(HashMap::new());
}

pub fn get_cached(key: &str) -> Option<String> {
    let cache = CACHE.read().ok()?;
    let (stored_at, value) = cache.get(key)?;
    if stored_at.elapsed() < TTL {
        Some(value.clone())
    } else {
        None
    }
}

pub fn set_cache(key: String, value: String) {
    if let Ok(mut cache) = CACHE.write() {
        cache.insert(key, (Instant::now(), value));
    }
}

pub fn invalidate(key: &str) {
    if let Ok(mut cache) = CACHE.write() {
        cache.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        set_cache("k".to_string(), "v".to_string());
        assert_eq!(get_cached("k"), Some("v".to_string()));
        invalidate("k");
        assert_eq!(get_cached("k"), None);
    }
}
