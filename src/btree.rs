use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::relation::{Attribute, Relation, RelationScan, ScanCursor};
use crate::symbols::SymbolTable;
use crate::tuple::Tuple;
use crate::types::DomainValue;

/// Cursor identity tag for B-tree relation scans.
const BTREE_SCAN_KIND: u32 = 1;

/// Sorted-set-backed relation: rows are deduplicated and scanned in
/// ascending lexicographic order of their domain values.
///
/// This is the reference implementation used by embedding harnesses and the
/// crate's own tests; engine-generated relations bring their own index
/// structures and only share the `Relation` contract.
pub struct BTreeRelation {
    name: String,
    attributes: Vec<Attribute>,
    symbols: Arc<dyn SymbolTable>,
    rows: RwLock<BTreeSet<Vec<DomainValue>>>
}

impl BTreeRelation {
    pub fn new(name: &str, attributes: Vec<Attribute>, symbols: Arc<dyn SymbolTable>) -> BTreeRelation {
        BTreeRelation {
            name: name.to_string(),
            attributes,
            symbols,
            rows: RwLock::new(BTreeSet::new())
        }
    }

    fn check_arity(&self, tuple: &Tuple) {
        assert!(
            tuple.arity() == self.attributes.len(),
            "tuple of arity {} used with relation '{}' of arity {}",
            tuple.arity(),
            self.name,
            self.attributes.len()
        );
    }
}

impl Relation for BTreeRelation {
    fn insert(&self, tuple: &Tuple) {
        self.check_arity(tuple);
        self.rows.write().insert(tuple.values().to_vec());
    }

    fn contains(&self, tuple: &Tuple) -> bool {
        self.check_arity(tuple);
        self.rows.read().contains(tuple.values())
    }

    fn scan(&self) -> RelationScan<'_> {
        // Scans iterate a snapshot: stable order for the lifetime of the
        // scan, whatever happens to the relation afterwards
        let rows: Arc<Vec<Vec<DomainValue>>> = Arc::new(self.rows.read().iter().cloned().collect());
        let mut cursor = BTreeScanCursor {
            relation: self,
            rows,
            index: 0,
            current: None
        };
        cursor.load();
        RelationScan::new(Box::new(cursor))
    }

    fn scan_end(&self) -> RelationScan<'_> {
        RelationScan::new(Box::new(BTreeScanCursor {
            relation: self,
            rows: Arc::new(Vec::new()),
            index: 0,
            current: None
        }))
    }

    fn size(&self) -> usize {
        self.rows.read().len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.attributes.len()
    }

    fn attribute(&self, column: usize) -> &Attribute {
        &self.attributes[column]
    }

    fn symbol_table(&self) -> &dyn SymbolTable {
        self.symbols.as_ref()
    }

    fn purge(&self) {
        self.rows.write().clear();
    }
}

struct BTreeScanCursor<'a> {
    relation: &'a dyn Relation,
    rows: Arc<Vec<Vec<DomainValue>>>,
    index: usize,
    current: Option<Tuple<'a>>
}

impl<'a> BTreeScanCursor<'a> {
    fn load(&mut self) {
        self.current = if self.index < self.rows.len() {
            let mut tuple = Tuple::from_values(self.relation, self.rows[self.index].clone());
            tuple.rewind();
            Some(tuple)
        } else {
            None
        };
    }
}

impl<'a> ScanCursor<'a> for BTreeScanCursor<'a> {
    fn kind_id(&self) -> u32 {
        BTREE_SCAN_KIND
    }

    fn position(&self) -> Option<usize> {
        if self.index < self.rows.len() {
            Some(self.index)
        } else {
            None
        }
    }

    fn current(&self) -> &Tuple<'a> {
        self.current.as_ref().expect("scan cursor dereferenced at end")
    }

    fn advance(&mut self) {
        assert!(self.index < self.rows.len(), "scan cursor advanced past end");
        self.index += 1;
        self.load();
    }

    fn boxed_clone(&self) -> Box<dyn ScanCursor<'a> + 'a> {
        Box::new(BTreeScanCursor {
            relation: self.relation,
            rows: self.rows.clone(),
            index: self.index,
            current: self.current.clone()
        })
    }
}
