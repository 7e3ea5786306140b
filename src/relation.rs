use itertools::Itertools;

use crate::symbols::SymbolTable;
use crate::tuple::Tuple;
use crate::types::AttributeKind;

/// Per-column metadata of a relation. The descriptor string pairs the kind
/// code with the user-facing type name, e.g. `s:Node`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    pub type_name: String
}

impl Attribute {
    pub fn new(name: &str, kind: AttributeKind, type_name: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            kind,
            type_name: type_name.to_string()
        }
    }

    pub fn descriptor(&self) -> String {
        format!("{}:{}", self.kind.code(), self.type_name)
    }
}

/// Storage-agnostic accessor for one named relation. Concrete storage
/// engines implement this so heterogeneous index structures can be driven
/// through one object-safe interface.
///
/// Mutating operations take `&self`: tuples borrow their relation while
/// being built and inserted, so implementations supply interior mutability.
/// No thread safety is promised by this trait; concurrent mutation while
/// another handle iterates is the implementation's problem.
pub trait Relation {
    /// Insert a copy of the row's domain values. Whether duplicates are
    /// kept or collapsed is up to the concrete implementation.
    fn insert(&self, tuple: &Tuple);

    /// Exact-match membership test across all columns.
    fn contains(&self, tuple: &Tuple) -> bool;

    /// Cursor over a full scan, positioned on the first row (or already
    /// at end for an empty relation). Scan order is implementation-defined
    /// but stable for the lifetime of the scan.
    fn scan(&self) -> RelationScan<'_>;

    /// The at-end cursor every exhausted scan of this relation equals.
    fn scan_end(&self) -> RelationScan<'_>;

    fn size(&self) -> usize;

    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    /// Metadata of the given column; out-of-range columns are a contract
    /// violation.
    fn attribute(&self, column: usize) -> &Attribute;

    /// The symbol table backing this relation's symbol columns.
    fn symbol_table(&self) -> &dyn SymbolTable;

    /// Remove all rows. Metadata is unaffected and the relation stays
    /// usable.
    fn purge(&self);

    /// Bracketed, comma-joined attribute descriptors, e.g. `<s:Node,s:Node>`.
    /// Arity 0 renders as `<>`.
    fn signature(&self) -> String {
        if self.arity() == 0 {
            return "<>".to_string();
        }
        format!(
            "<{}>",
            (0..self.arity()).map(|i| self.attribute(i).descriptor()).join(",")
        )
    }
}

/// Hidden cursor behind a [`RelationScan`] handle. Implementations report a
/// kind tag identifying the concrete cursor type and their scan ordinal;
/// equality of two handles is defined purely over those two values, so the
/// ordinal must be `None` exactly when the cursor is at end.
pub trait ScanCursor<'a> {
    /// Identity tag of the concrete cursor type. Comparing handles is only
    /// meaningful between cursors over the same relation.
    fn kind_id(&self) -> u32;

    /// Scan ordinal of the current row, `None` once at end.
    fn position(&self) -> Option<usize>;

    /// The row under the cursor. Contract violation at end.
    fn current(&self) -> &Tuple<'a>;

    /// Move to the next row, or to the end state after the last row.
    /// Contract violation when already at end.
    fn advance(&mut self);

    fn boxed_clone(&self) -> Box<dyn ScanCursor<'a> + 'a>;
}

/// Value-semantics handle over a hidden scan cursor. Each handle owns its
/// cursor exclusively: cloning deep-copies cursor state (the copies advance
/// independently), assignment drops the old cursor first.
pub struct RelationScan<'a> {
    cursor: Box<dyn ScanCursor<'a> + 'a>
}

impl<'a> RelationScan<'a> {
    pub fn new(cursor: Box<dyn ScanCursor<'a> + 'a>) -> RelationScan<'a> {
        RelationScan { cursor }
    }

    pub fn at_end(&self) -> bool {
        self.cursor.position().is_none()
    }

    /// The row under the cursor. Contract violation at end.
    pub fn current(&self) -> &Tuple<'a> {
        self.cursor.current()
    }

    /// Contract violation when already at end.
    pub fn advance(&mut self) {
        self.cursor.advance();
    }
}

impl<'a> Clone for RelationScan<'a> {
    fn clone(&self) -> Self {
        RelationScan {
            cursor: self.cursor.boxed_clone()
        }
    }
}

impl<'a> PartialEq for RelationScan<'a> {
    fn eq(&self, other: &RelationScan<'a>) -> bool {
        // Structural equality: same concrete cursor kind, same scan
        // ordinal. Two at-end cursors compare equal through position None.
        self.cursor.kind_id() == other.cursor.kind_id()
            && self.cursor.position() == other.cursor.position()
    }
}

impl<'a> Eq for RelationScan<'a> {}

impl<'a> Iterator for RelationScan<'a> {
    type Item = Tuple<'a>;

    fn next(&mut self) -> Option<Tuple<'a>> {
        if self.at_end() {
            return None;
        }
        let row = self.cursor.current().clone();
        self.cursor.advance();
        Some(row)
    }
}
