//! Cache invalidation with pattern matching support.

use glob::Pattern;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::CacheCore;

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationResult {
    /// Número de entries locales invalidadas.
    pub count: usize,
    /// Número de entries borradas del store remoto.
    pub remote_count: usize,
    /// Patrones aplicados.
    pub patterns: Vec<String>,
}

impl InvalidationResult {
    fn empty(pattern: &str) -> Self {
        Self {
            count: 0,
            remote_count: 0,
            patterns: vec![pattern.to_string()],
        }
    }
}

impl<V> CacheCore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Invalida entradas usando un patrón glob.
    ///
    /// Las keys siguen el formato `namespace:...`, por ejemplo
    /// `translation:fr:en:<hash>`. Comodines soportados:
    /// - `*`: coincide con cualquier secuencia de caracteres
    /// - `?`: coincide con un carácter
    ///
    /// Un patrón inválido no invalida nada.
    pub async fn invalidate_by_pattern(&self, pattern_str: &str) -> InvalidationResult {
        let pattern = match Pattern::new(pattern_str) {
            Ok(p) => p,
            Err(e) => {
                debug!(pattern = %pattern_str, error = %e, "Invalid glob pattern");
                return InvalidationResult::empty(pattern_str);
            },
        };

        let inner = &self.inner;
        let keys = inner.local.keys_matching(&pattern);
        for key in &keys {
            inner.local.remove(key).await;
        }

        // El store remoto puede tener keys que este proceso nunca vio.
        let remote_count = match &inner.remote {
            Some(remote) => match remote.delete_matching(pattern_str).await {
                Ok(n) => n,
                Err(e) => {
                    warn!(
                        cache = inner.name,
                        pattern = %pattern_str,
                        error = %e,
                        "Remote pattern delete failed"
                    );
                    0
                },
            },
            None => 0,
        };

        info!(
            cache = inner.name,
            pattern = %pattern_str,
            count = keys.len(),
            remote_count,
            "Cache entries invalidated by pattern"
        );

        InvalidationResult {
            count: keys.len(),
            remote_count,
            patterns: vec![pattern_str.to_string()],
        }
    }
}
