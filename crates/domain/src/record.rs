//! Records, pending field edits and new-record drafts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult, require_non_blank};

/// Parses user-entered text as JSON, falling back to a literal string.
///
/// `"42"` becomes the number 42, `"{\"a\":1}"` an object, and `hello`
/// (not valid JSON) the string `"hello"`.
#[must_use]
pub fn parse_field_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Renders a value as indented JSON for editing.
#[must_use]
pub fn render_field_value(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// An ordered mapping from field name to JSON value.
///
/// Field order is insertion order. Removing a field keeps the relative
/// order of the remaining ones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns true if the field exists.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Inserts or replaces a field. Replacing keeps the field's position.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Removes a field, preserving the order of the others.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Applies a pending edit.
    ///
    /// A renamed field is removed under its old name and appended under the
    /// new one. An unchanged name is updated in place.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyFieldName`] if the new name is blank.
    pub fn apply_edit(&mut self, edit: &PendingEdit) -> DomainResult<()> {
        require_non_blank(&edit.new_field, DomainError::EmptyFieldName)?;
        let value = parse_field_value(&edit.raw_value);
        if edit.original_field != edit.new_field {
            self.0.shift_remove(&edit.original_field);
        }
        self.0.insert(edit.new_field.clone(), value);
        Ok(())
    }

    /// Returns `base` if no field has that name, else `base_1`, `base_2`...
    #[must_use]
    pub fn unused_field_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An in-progress single-field edit inside the open record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Field name when the edit started.
    pub original_field: String,
    /// Field name to commit.
    pub new_field: String,
    /// Raw value text, parsed on commit.
    pub raw_value: String,
}

impl PendingEdit {
    /// Starts editing an existing field.
    #[must_use]
    pub fn for_field(field: impl Into<String>, value: &Value) -> Self {
        let field = field.into();
        Self {
            new_field: field.clone(),
            original_field: field,
            raw_value: render_field_value(value),
        }
    }

    /// Starts editing a field that does not exist yet, with an empty value.
    #[must_use]
    pub fn for_new_field(field: impl Into<String>) -> Self {
        Self::for_field(field, &Value::String(String::new()))
    }

    /// Returns true if the field name was changed.
    #[must_use]
    pub fn is_rename(&self) -> bool {
        self.original_field != self.new_field
    }
}

/// One row of the manual field list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldEntry {
    /// Field name. Blank names are skipped.
    pub name: String,
    /// Raw value text.
    pub raw_value: String,
}

impl FieldEntry {
    /// Creates a field entry.
    #[must_use]
    pub fn new(name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
        }
    }
}

/// Where the fields of a new record come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// Fields entered one by one.
    Manual(Vec<FieldEntry>),
    /// A whole JSON document.
    Import(String),
}

/// The submitted new-record form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    /// Target key.
    pub key: String,
    /// Field source.
    pub source: RecordSource,
}

impl RecordDraft {
    /// Creates a draft with an empty manual field list.
    #[must_use]
    pub fn manual(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: RecordSource::Manual(Vec::new()),
        }
    }

    /// Creates a draft from an imported JSON document.
    #[must_use]
    pub fn import(key: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: RecordSource::Import(document.into()),
        }
    }

    /// Appends a manual field. Ignored in import mode.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        if let RecordSource::Manual(entries) = &mut self.source {
            entries.push(FieldEntry::new(name, raw_value));
        }
        self
    }

    /// Adds an uploaded file's text as a field named after the file.
    ///
    /// # Errors
    ///
    /// In import mode, fails if the current document is not a JSON object.
    pub fn attach_file(&mut self, file_name: &str, contents: &str) -> DomainResult<()> {
        match &mut self.source {
            RecordSource::Manual(entries) => {
                entries.push(FieldEntry::new(file_name, contents));
            }
            RecordSource::Import(document) => {
                let mut record = if document.trim().is_empty() {
                    Record::new()
                } else {
                    parse_object(document)?
                };
                record.insert(file_name, Value::String(contents.to_string()));
                *document = serde_json::to_string_pretty(&record)
                    .map_err(|e| DomainError::InvalidImport(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Builds the field mapping to write.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key is blank, the import is missing
    /// or malformed, or the resulting mapping is empty.
    pub fn build(&self) -> DomainResult<Record> {
        require_non_blank(&self.key, DomainError::EmptyKey)?;
        let record = match &self.source {
            RecordSource::Manual(entries) => entries
                .iter()
                .filter(|entry| !entry.name.trim().is_empty())
                .map(|entry| (entry.name.clone(), parse_field_value(&entry.raw_value)))
                .collect(),
            RecordSource::Import(document) => {
                require_non_blank(document, DomainError::NothingImported)?;
                parse_object(document)?
            }
        };
        if record.is_empty() {
            return Err(DomainError::EmptyRecord);
        }
        Ok(record)
    }
}

fn parse_object(document: &str) -> DomainResult<Record> {
    let value: Value =
        serde_json::from_str(document).map_err(|e| DomainError::InvalidImport(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(DomainError::ImportNotAnObject),
    }
}
