use std::fmt;
use std::ops::{Index, IndexMut};

use crate::relation::Relation;
use crate::types::DomainValue;

/// Fixed-width row buffer bound to one relation for its whole lifetime.
///
/// The cursor enforces sequential, type-checked access: every typed read or
/// write targets the column currently under the cursor and advances it by
/// one. Writing text into a numeric column, writing a number into a symbol
/// column, or moving past the last column fails a contract check right
/// there. `rewind` resets the cursor without touching the stored values, so
/// a filled tuple can be read back from the start.
///
/// Indexing (`tuple[column]`) bypasses the cursor and all type checks; it
/// exists for trusted adapters that already know the value kind at every
/// position.
pub struct Tuple<'a> {
    relation: &'a dyn Relation,
    values: Vec<DomainValue>,
    pos: usize
}

impl<'a> Tuple<'a> {
    /// Empty tuple for `relation`: all columns zeroed, cursor at the first
    /// column, ready for sequential fill.
    pub fn new(relation: &'a dyn Relation) -> Tuple<'a> {
        Tuple {
            relation,
            values: vec![0; relation.arity()],
            pos: 0
        }
    }

    /// Tuple pre-filled with raw domain values; the cursor starts past the
    /// last column, as after a full sequential fill. A length mismatch with
    /// the relation's arity is a contract violation.
    pub fn from_values(relation: &'a dyn Relation, values: Vec<DomainValue>) -> Tuple<'a> {
        assert!(
            values.len() == relation.arity(),
            "tuple of length {} does not match arity {} of relation '{}'",
            values.len(),
            relation.arity(),
            relation.name()
        );
        let pos = values.len();
        Tuple { relation, values, pos }
    }

    pub fn relation(&self) -> &'a dyn Relation {
        self.relation
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Raw view of all stored domain values, cursor-independent.
    pub fn values(&self) -> &[DomainValue] {
        &self.values
    }

    /// Reset the cursor to the first column. Values stay intact.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    fn check_cursor(&self) {
        assert!(
            self.pos < self.values.len(),
            "cursor moved past the last column of relation '{}'",
            self.relation.name()
        );
    }

    /// Intern `symbol` through the relation's symbol table and store its id
    /// in the column under the cursor, which must be a symbol column.
    pub fn push_symbol(&mut self, symbol: &str) -> &mut Tuple<'a> {
        self.check_cursor();
        let attribute = self.relation.attribute(self.pos);
        assert!(
            !attribute.kind.is_numeric(),
            "column {} of relation '{}' holds {} values, expected a symbol column",
            self.pos,
            self.relation.name(),
            attribute.kind
        );
        self.values[self.pos] = self.relation.symbol_table().lookup(symbol);
        self.pos += 1;
        self
    }

    /// Store `number` in the column under the cursor, which must be one of
    /// the numeric kinds. Unsigned and float payloads are passed bit-cast,
    /// see the helpers in `types`.
    pub fn push_number(&mut self, number: DomainValue) -> &mut Tuple<'a> {
        self.check_cursor();
        let attribute = self.relation.attribute(self.pos);
        assert!(
            attribute.kind.is_numeric(),
            "column {} of relation '{}' holds symbols, expected a numeric column",
            self.pos,
            self.relation.name()
        );
        self.values[self.pos] = number;
        self.pos += 1;
        self
    }

    /// Read the symbol column under the cursor back as text.
    pub fn read_symbol(&mut self) -> String {
        self.check_cursor();
        let attribute = self.relation.attribute(self.pos);
        assert!(
            !attribute.kind.is_numeric(),
            "column {} of relation '{}' holds {} values, expected a symbol column",
            self.pos,
            self.relation.name(),
            attribute.kind
        );
        let id = self.values[self.pos];
        self.pos += 1;
        self.relation.symbol_table().resolve(id)
    }

    /// Read the numeric column under the cursor.
    pub fn read_number(&mut self) -> DomainValue {
        self.check_cursor();
        let attribute = self.relation.attribute(self.pos);
        assert!(
            attribute.kind.is_numeric(),
            "column {} of relation '{}' holds symbols, expected a numeric column",
            self.pos,
            self.relation.name()
        );
        let number = self.values[self.pos];
        self.pos += 1;
        number
    }
}

impl Clone for Tuple<'_> {
    fn clone(&self) -> Self {
        Tuple {
            relation: self.relation,
            values: self.values.clone(),
            pos: self.pos
        }
    }
}

impl Index<usize> for Tuple<'_> {
    type Output = DomainValue;

    fn index(&self, column: usize) -> &DomainValue {
        &self.values[column]
    }
}

impl IndexMut<usize> for Tuple<'_> {
    fn index_mut(&mut self, column: usize) -> &mut DomainValue {
        &mut self.values[column]
    }
}

impl fmt::Debug for Tuple<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tuple")
            .field("relation", &self.relation.name())
            .field("values", &self.values)
            .field("pos", &self.pos)
            .finish()
    }
}
