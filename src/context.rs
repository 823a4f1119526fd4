use std::collections::HashMap;
use std::sync::Arc;

/// Read-only view of the inbound request's parameters.
///
/// The middleware that extracts parameters out of a transport request is
/// external to this crate; the core only ever reads string keys and values.
/// Cloning is cheap so every strategy instance built for an attempt can own
/// its own handle.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    params: Arc<HashMap<String, String>>,
}

impl RequestContext {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self {
            params: Arc::new(params),
        }
    }

    /// The full parameter map.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// A single parameter, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
