// Compiled-program stand-in used by the crate's own tests: a small
// transitive-closure program the way a generated program would embed the
// registry, with TSV persistence for its load/store obligations.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use bitvec::vec::BitVec;
use itertools::Itertools;

use crate::btree::BTreeRelation;
use crate::factory::{self, ProgramFactory};
use crate::program::{render_value, Program, ProgramError, ProgramRegistry};
use crate::relation::{Attribute, Relation};
use crate::symbols::{StringTable, SymbolTable};
use crate::tuple::Tuple;
use crate::types::{domain_from_float, domain_from_unsigned, AttributeKind, DomainValue};

pub struct ReachabilityProgram {
    registry: ProgramRegistry,
    symbols: Arc<StringTable>
}

impl ReachabilityProgram {
    pub fn new() -> ReachabilityProgram {
        let symbols = Arc::new(StringTable::new());
        let node = |attribute: &str| Attribute::new(attribute, AttributeKind::Symbol, "Node");
        let mut registry = ProgramRegistry::new();
        registry.add_relation(
            "edge",
            Box::new(BTreeRelation::new(
                "edge",
                vec![node("node1"), node("node2")],
                symbols.clone()
            )),
            true,
            false
        );
        registry.add_relation(
            "path",
            Box::new(BTreeRelation::new(
                "path",
                vec![node("source"), node("target")],
                symbols.clone()
            )),
            false,
            true
        );
        registry.add_relation(
            "seen",
            Box::new(BTreeRelation::new("seen", vec![node("node")], symbols.clone())),
            false,
            false
        );
        ReachabilityProgram { registry, symbols }
    }
}

fn bad_record(relation: &dyn Relation, line: usize, reason: String) -> ProgramError {
    ProgramError::BadRecord {
        relation: relation.name().to_string(),
        line,
        reason
    }
}

fn parse_field(
    relation: &dyn Relation,
    column: usize,
    field: &str,
    line: usize
) -> Result<DomainValue, ProgramError> {
    match relation.attribute(column).kind {
        AttributeKind::Symbol => Ok(relation.symbol_table().lookup(field)),
        AttributeKind::Signed => field
            .parse::<i32>()
            .map_err(|e| bad_record(relation, line, format!("invalid signed value '{}': {}", field, e))),
        AttributeKind::Unsigned => field
            .parse::<u32>()
            .map(domain_from_unsigned)
            .map_err(|e| bad_record(relation, line, format!("invalid unsigned value '{}': {}", field, e))),
        AttributeKind::Float => field
            .parse::<f32>()
            .map(domain_from_float)
            .map_err(|e| bad_record(relation, line, format!("invalid float value '{}': {}", field, e)))
    }
}

impl Program for ReachabilityProgram {
    fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut ProgramRegistry {
        &mut self.registry
    }

    fn symbol_table(&self) -> &dyn SymbolTable {
        self.symbols.as_ref()
    }

    fn run(&self, _stratum: Option<usize>) {
        let edge = self.registry.get_relation("edge").unwrap();
        let path = self.registry.get_relation("path").unwrap();
        let seen = self.registry.get_relation("seen").unwrap();

        let edges: Vec<(DomainValue, DomainValue)> = edge.scan().map(|row| (row[0], row[1])).collect();
        for &(from, to) in &edges {
            path.insert(&Tuple::from_values(path, vec![from, to]));
            seen.insert(&Tuple::from_values(seen, vec![from]));
            seen.insert(&Tuple::from_values(seen, vec![to]));
        }
        loop {
            let before = path.size();
            let known: Vec<(DomainValue, DomainValue)> = path.scan().map(|row| (row[0], row[1])).collect();
            for &(from, mid) in &known {
                for &(hop, to) in &edges {
                    if mid == hop {
                        path.insert(&Tuple::from_values(path, vec![from, to]));
                    }
                }
            }
            if path.size() == before {
                break;
            }
        }
    }

    fn run_all(&self, input_dir: &Path, output_dir: &Path, stratum: Option<usize>) -> Result<(), ProgramError> {
        self.load_all(input_dir)?;
        self.run(stratum);
        self.print_all(output_dir)
    }

    fn load_all(&self, input_dir: &Path) -> Result<(), ProgramError> {
        for relation in self.registry.input_relations() {
            let facts = input_dir.join(format!("{}.facts", relation.name()));
            if !facts.exists() {
                continue;
            }
            let reader = BufReader::new(fs::File::open(&facts)?);
            for (line_index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.is_empty() {
                    continue;
                }
                let fields: Vec<&str> = line.split('\t').collect();
                if fields.len() != relation.arity() {
                    return Err(bad_record(
                        relation,
                        line_index + 1,
                        format!("expected {} fields, found {}", relation.arity(), fields.len())
                    ));
                }
                let mut values = Vec::with_capacity(relation.arity());
                for (column, field) in fields.iter().copied().enumerate() {
                    values.push(parse_field(relation, column, field, line_index + 1)?);
                }
                relation.insert(&Tuple::from_values(relation, values));
            }
        }
        Ok(())
    }

    fn print_all(&self, output_dir: &Path) -> Result<(), ProgramError> {
        for relation in self.registry.output_relations() {
            let mut file = fs::File::create(output_dir.join(format!("{}.csv", relation.name())))?;
            for row in relation.scan() {
                let rendered = (0..relation.arity())
                    .map(|column| render_value(relation, column, row[column]))
                    .join("\t");
                writeln!(file, "{}", rendered)?;
            }
        }
        Ok(())
    }

    fn execute_subroutine(
        &self,
        name: &str,
        _args: &[DomainValue],
        results: &mut Vec<DomainValue>,
        result_errors: &mut BitVec
    ) {
        if name == "edge_count" {
            results.push(self.registry.relation_size("edge") as DomainValue);
            result_errors.push(false);
        }
    }
}

pub struct ReachabilityFactory;

impl ProgramFactory for ReachabilityFactory {
    fn name(&self) -> &str {
        "reachability"
    }

    fn instantiate(&self) -> Box<dyn Program> {
        Box::new(ReachabilityProgram::new())
    }
}

static FACTORY: ReachabilityFactory = ReachabilityFactory;

#[ctor::ctor(unsafe)]
fn register_reachability_factory() {
    factory::register(&FACTORY);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_edge(program: &ReachabilityProgram, from: &str, to: &str) {
        let edge = program.get_relation("edge").unwrap();
        let mut tuple = Tuple::new(edge);
        tuple.push_symbol(from).push_symbol(to);
        edge.insert(&tuple);
    }

    fn path_pairs(program: &ReachabilityProgram) -> Vec<(String, String)> {
        let path = program.get_relation("path").unwrap();
        path.scan()
            .map(|mut row| (row.read_symbol(), row.read_symbol()))
            .collect()
    }

    #[test]
    fn test_run_computes_transitive_closure() {
        let program = ReachabilityProgram::new();
        insert_edge(&program, "a", "b");
        insert_edge(&program, "b", "c");
        program.run(None);

        let mut pairs = path_pairs(&program);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "b".to_string()),
                ("a".to_string(), "c".to_string()),
                ("b".to_string(), "c".to_string())
            ]
        );
        assert_eq!(program.get_relation("seen").unwrap().size(), 3);
    }

    #[test]
    fn test_run_all_round_trips_through_files() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        fs::write(input_dir.path().join("edge.facts"), "a\tb\nb\tc\n").unwrap();

        let program = ReachabilityProgram::new();
        program.run_all(input_dir.path(), output_dir.path(), None).unwrap();

        let stored = fs::read_to_string(output_dir.path().join("path.csv")).unwrap();
        let mut lines: Vec<&str> = stored.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["a\tb", "a\tc", "b\tc"]);
    }

    #[test]
    fn test_load_all_skips_missing_fact_files() {
        let input_dir = tempfile::tempdir().unwrap();
        let program = ReachabilityProgram::new();
        program.load_all(input_dir.path()).unwrap();
        assert_eq!(program.get_relation("edge").unwrap().size(), 0);
    }

    #[test]
    fn test_load_all_reports_malformed_records() {
        let input_dir = tempfile::tempdir().unwrap();
        fs::write(input_dir.path().join("edge.facts"), "a\tb\tc\n").unwrap();

        let program = ReachabilityProgram::new();
        match program.load_all(input_dir.path()) {
            Err(ProgramError::BadRecord { relation, line, .. }) => {
                assert_eq!(relation, "edge");
                assert_eq!(line, 1);
            }
            other => panic!("expected a bad record error, got {:?}", other)
        }
    }

    #[test]
    fn test_thread_hint_pass_through() {
        let mut program = ReachabilityProgram::new();
        program.set_num_threads(4);
        assert_eq!(program.num_threads(), 4);
    }
}
