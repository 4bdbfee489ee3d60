pub mod fetcher;
pub mod parser;
pub mod url;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use fetcher::FormFetcher;
pub use url::FormUrls;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    SingleChoice,
    MultiChoice,
    Text,
}

/// One question of a form, keyed by the name the submission endpoint expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormField {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub options: Vec<String>,
}

impl FormField {
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Form {
    pub form_id: String,
    pub title: Option<String>,
    pub view_url: String,
    pub submit_url: String,
    pub fields: Vec<FormField>,
    pub hidden_fields: BTreeMap<String, String>,
}

impl Form {
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }
}
