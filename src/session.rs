use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key/value state that lives for the duration of one browser session.
///
/// Loaded from the request before handlers run and written back to the
/// response afterwards, so handlers only ever see this in-memory view.
#[derive(Debug, Default)]
pub struct Session {
    values: Mutex<BTreeMap<String, String>>,
}

impl Session {
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.lock().insert(key.to_string(), value.into());
    }

    pub fn values(&self) -> Vec<(String, String)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Everything a cart operation needs to know about the current request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: Arc<Session>,
    user_name: Option<String>,
}

impl RequestContext {
    /// Blank user names are treated as anonymous.
    pub fn new(session: Arc<Session>, user_name: Option<String>) -> Self {
        let user_name = user_name.filter(|name| !name.trim().is_empty());
        Self { session, user_name }
    }

    pub fn anonymous() -> Self {
        Self::new(Arc::new(Session::default()), None)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_insert_overwrites() {
        let session = Session::from_values([("CartId", "abc")]);
        assert_eq!(session.get("CartId").as_deref(), Some("abc"));

        session.insert("CartId", "def");
        assert_eq!(session.get("CartId").as_deref(), Some("def"));
        assert_eq!(session.values().len(), 1);
    }

    #[test]
    fn test_blank_user_name_is_anonymous() {
        let ctx = RequestContext::new(Arc::new(Session::default()), Some("   ".into()));
        assert!(ctx.user_name().is_none());

        let ctx = RequestContext::new(Arc::new(Session::default()), Some("alice".into()));
        assert_eq!(ctx.user_name(), Some("alice"));
    }
}
