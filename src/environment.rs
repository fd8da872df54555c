//! Index and query environment providers.
//!
//! Blueprints validate against an [`IndexEnvironment`] (static field
//! metadata) at compile time and bind their executors against a
//! [`QueryEnvironment`] (per-query term state) at program setup time. Both
//! are read-only provider traits; [`SimpleIndexEnvironment`] and
//! [`SimpleQueryEnvironment`] are the in-memory implementations used by
//! tests and embedders.

use ahash::AHashMap;

use crate::match_data::TermFieldHandle;

/// Static metadata for one searchable field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    id: u32,
    name: String,
}

impl FieldInfo {
    /// Create field metadata with the given id and name.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        FieldInfo {
            id,
            name: name.into(),
        }
    }

    /// The field's numeric id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The field's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Read-only accessor for static index metadata. Shared read-only across
/// threads together with the compiled setup.
pub trait IndexEnvironment: Send + Sync {
    /// Number of fields in the index.
    fn num_fields(&self) -> usize;

    /// Look up a field by id.
    fn field(&self, id: u32) -> Option<&FieldInfo>;

    /// Look up a field by name.
    fn field_by_name(&self, name: &str) -> Option<&FieldInfo>;
}

/// Read-only accessor for per-query runtime state.
pub trait QueryEnvironment {
    /// Number of terms in the query.
    fn num_terms(&self) -> usize;

    /// The term-field handle bound for (term, field), or `None` when the
    /// term has no binding for that field. A missing binding is not an
    /// error; callers simply omit the pair from consideration.
    fn term_field_handle(&self, term_index: usize, field_id: u32) -> Option<TermFieldHandle>;
}

/// In-memory [`IndexEnvironment`].
#[derive(Debug, Default)]
pub struct SimpleIndexEnvironment {
    fields: Vec<FieldInfo>,
}

impl SimpleIndexEnvironment {
    /// Create an empty index environment.
    pub fn new() -> Self {
        SimpleIndexEnvironment::default()
    }

    /// Add a field; its id is its position in insertion order.
    pub fn add_field(&mut self, name: impl Into<String>) -> u32 {
        let id = self.fields.len() as u32;
        self.fields.push(FieldInfo::new(id, name));
        id
    }
}

impl IndexEnvironment for SimpleIndexEnvironment {
    fn num_fields(&self) -> usize {
        self.fields.len()
    }

    fn field(&self, id: u32) -> Option<&FieldInfo> {
        self.fields.get(id as usize)
    }

    fn field_by_name(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

/// In-memory [`QueryEnvironment`]: one handle map per query term.
#[derive(Debug, Default)]
pub struct SimpleQueryEnvironment {
    terms: Vec<AHashMap<u32, TermFieldHandle>>,
}

impl SimpleQueryEnvironment {
    /// Create an empty query environment.
    pub fn new() -> Self {
        SimpleQueryEnvironment::default()
    }

    /// Add a term with no field bindings; returns its index.
    pub fn add_term(&mut self) -> usize {
        self.terms.push(AHashMap::new());
        self.terms.len() - 1
    }

    /// Bind a term-field handle for (term, field).
    pub fn bind_handle(&mut self, term_index: usize, field_id: u32, handle: TermFieldHandle) {
        self.terms[term_index].insert(field_id, handle);
    }
}

impl QueryEnvironment for SimpleQueryEnvironment {
    fn num_terms(&self) -> usize {
        self.terms.len()
    }

    fn term_field_handle(&self, term_index: usize, field_id: u32) -> Option<TermFieldHandle> {
        self.terms.get(term_index)?.get(&field_id).copied()
    }
}
