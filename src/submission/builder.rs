use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::form::{FieldKind, Form};

/// A chosen option, a piece of free text, or several options for a multi-choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    One(String),
    Many(Vec<String>),
}

impl Answer {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Answer::One(v) => vec![v.as_str()],
            Answer::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::One(value.to_string())
    }
}

impl From<Vec<&str>> for Answer {
    fn from(values: Vec<&str>) -> Self {
        Answer::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// Answers keyed by field id.
pub type AnswerSelection = BTreeMap<String, Answer>;

/// Ordered key/value pairs as sent to the response endpoint. Keys repeat for
/// multi-choice answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Payload {
    pairs: Vec<(String, String)>,
}

impl Payload {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Build the submission payload for `answers`.
///
/// Hidden fields come first in key order, then answered fields in form order.
/// The same form and answers always give the same payload.
pub fn build(form: &Form, answers: &AnswerSelection) -> Result<Payload, Error> {
    if let Some(unknown) = answers.keys().find(|id| form.field(id).is_none()) {
        return Err(Error::Validation(format!("Unknown field: {unknown}")));
    }

    let mut pairs = Vec::new();

    for (key, value) in &form.hidden_fields {
        if form.field(key).is_none() {
            pairs.push((key.clone(), value.clone()));
        }
    }

    for field in &form.fields {
        let values: Vec<&str> = answers
            .get(&field.id)
            .map(Answer::values)
            .unwrap_or_default()
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect();

        if values.is_empty() {
            if field.required {
                return Err(Error::Validation(format!(
                    "Missing answer for required field: {} ({})",
                    field.label, field.id
                )));
            }
            continue;
        }

        if field.kind != FieldKind::MultiChoice && values.len() > 1 {
            return Err(Error::Validation(format!(
                "Field {} ({}) accepts a single answer, got {}",
                field.label,
                field.id,
                values.len()
            )));
        }

        if field.kind != FieldKind::Text {
            if let Some(bad) = values.iter().find(|v| !field.has_option(v)) {
                return Err(Error::Validation(format!(
                    "'{bad}' is not an option of {} ({})",
                    field.label, field.id
                )));
            }
        }

        for (i, value) in values.iter().enumerate() {
            if values[..i].contains(value) {
                return Err(Error::Validation(format!(
                    "Option '{value}' chosen more than once for {} ({})",
                    field.label, field.id
                )));
            }
            pairs.push((field.id.clone(), value.to_string()));
        }
    }

    Ok(Payload { pairs })
}
