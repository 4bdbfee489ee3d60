use std::sync::Arc;

use dashmap::DashMap;

use crate::config::Config;
use crate::form::{Form, FormFetcher};
use crate::submission::Submitter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub fetcher: FormFetcher,
    pub submitter: Arc<dyn Submitter>,
    pub forms: FormRegistry,
}

/// Forms loaded through the web page, so test and bulk submissions reuse the
/// parsed structure and hidden tokens.
pub struct FormRegistry {
    /// form_id -> most recently parsed form
    forms: DashMap<String, Arc<Form>>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self {
            forms: DashMap::new(),
        }
    }

    /// Store a freshly parsed form, replacing any earlier copy.
    pub fn insert(&self, form: Form) -> Arc<Form> {
        let form = Arc::new(form);
        self.forms.insert(form.form_id.clone(), form.clone());
        form
    }

    pub fn get(&self, form_id: &str) -> Option<Arc<Form>> {
        self.forms.get(form_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}
