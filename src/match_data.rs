//! Per-document value buffer and its frozen schema.
//!
//! A [`MatchDataLayout`] records how many feature slots and term-field slots
//! a compiled program needs; every executor output is one feature slot,
//! addressed by an integer [`FeatureHandle`]. [`MatchData`] is one mutable
//! buffer instance created from a layout, reused across documents within an
//! evaluation context by updating the current document id.
//!
//! Handles are assigned once, at layout-build time, and are stable for the
//! lifetime of that layout. Once any `MatchData` has been created the layout
//! is frozen: further allocation is a programming error and panics.

/// The numeric type of all feature values.
pub type FeatureValue = f64;

/// Stable integer reference to one feature slot in a [`MatchData`] buffer.
pub type FeatureHandle = u32;

/// Stable integer reference to one term-field slot in a [`MatchData`] buffer.
pub type TermFieldHandle = u32;

/// Document id used before any document has been evaluated.
pub const INVALID_DOC_ID: u32 = u32::MAX;

/// Match state for one (query term, field) pair.
///
/// A term-matching frontend stamps the current document id into this slot
/// when the term matched the field; feature executors compare the stamped id
/// against [`MatchData::doc_id`] to decide whether the match is current.
#[derive(Debug, Clone, Copy)]
pub struct TermFieldMatchData {
    doc_id: u32,
}

impl TermFieldMatchData {
    /// Create an empty slot that matches no document.
    pub fn new() -> Self {
        TermFieldMatchData {
            doc_id: INVALID_DOC_ID,
        }
    }

    /// The document id this slot was last stamped with.
    pub fn doc_id(&self) -> u32 {
        self.doc_id
    }

    /// Stamp this slot with a document id.
    pub fn set_doc_id(&mut self, doc_id: u32) {
        self.doc_id = doc_id;
    }
}

impl Default for TermFieldMatchData {
    fn default() -> Self {
        TermFieldMatchData::new()
    }
}

/// Write-once schema for [`MatchData`] buffers.
///
/// Allocation hands out fresh handles; creating the first buffer freezes the
/// layout. Handles are only valid for buffers created from the same layout
/// instance.
#[derive(Debug, Default)]
pub struct MatchDataLayout {
    feature_slots: u32,
    term_field_slots: u32,
    frozen: bool,
}

impl MatchDataLayout {
    /// Create a new, empty layout.
    pub fn new() -> Self {
        MatchDataLayout::default()
    }

    /// Allocate a fresh feature slot.
    ///
    /// # Panics
    ///
    /// Panics if the layout has been frozen by [`create_match_data`].
    ///
    /// [`create_match_data`]: MatchDataLayout::create_match_data
    pub fn alloc_feature(&mut self) -> FeatureHandle {
        assert!(!self.frozen, "cannot allocate features on a frozen layout");
        let handle = self.feature_slots;
        self.feature_slots += 1;
        handle
    }

    /// Allocate a fresh term-field slot.
    ///
    /// # Panics
    ///
    /// Panics if the layout has been frozen.
    pub fn alloc_term_field(&mut self) -> TermFieldHandle {
        assert!(
            !self.frozen,
            "cannot allocate term fields on a frozen layout"
        );
        let handle = self.term_field_slots;
        self.term_field_slots += 1;
        handle
    }

    /// Number of feature slots allocated so far.
    pub fn feature_slots(&self) -> u32 {
        self.feature_slots
    }

    /// Create a buffer sized to the current slot counts and freeze the
    /// layout. May be called repeatedly; every buffer shares the same frozen
    /// schema, so handles are interchangeable between them.
    pub fn create_match_data(&mut self) -> MatchData {
        self.frozen = true;
        MatchData {
            features: vec![0.0; self.feature_slots as usize],
            term_fields: vec![TermFieldMatchData::new(); self.term_field_slots as usize],
            doc_id: INVALID_DOC_ID,
        }
    }
}

/// One mutable value buffer, created from a [`MatchDataLayout`].
///
/// Holds a feature value per allocated feature slot, a
/// [`TermFieldMatchData`] per allocated term-field slot, and the id of the
/// document currently being evaluated. Executors write their outputs and
/// read their inputs through handle resolution; slots must not be read
/// before the producing executor has run for the current document.
#[derive(Debug)]
pub struct MatchData {
    features: Vec<FeatureValue>,
    term_fields: Vec<TermFieldMatchData>,
    doc_id: u32,
}

impl MatchData {
    /// Read the feature slot addressed by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not allocated from this buffer's layout.
    pub fn feature(&self, handle: FeatureHandle) -> FeatureValue {
        self.features[handle as usize]
    }

    /// Resolve the feature slot addressed by `handle` for writing.
    pub fn feature_mut(&mut self, handle: FeatureHandle) -> &mut FeatureValue {
        &mut self.features[handle as usize]
    }

    /// Read the term-field slot addressed by `handle`.
    pub fn term_field(&self, handle: TermFieldHandle) -> &TermFieldMatchData {
        &self.term_fields[handle as usize]
    }

    /// Resolve the term-field slot addressed by `handle` for writing.
    pub fn term_field_mut(&mut self, handle: TermFieldHandle) -> &mut TermFieldMatchData {
        &mut self.term_fields[handle as usize]
    }

    /// The id of the document currently being evaluated.
    pub fn doc_id(&self) -> u32 {
        self.doc_id
    }

    /// Set the id of the document about to be evaluated.
    pub fn set_doc_id(&mut self, doc_id: u32) {
        self.doc_id = doc_id;
    }
}
