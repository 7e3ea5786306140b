use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use bitvec::vec::BitVec;
use itertools::Itertools;
use log::debug;

use crate::config::ProgramConfig;
use crate::relation::Relation;
use crate::symbols::SymbolTable;
use crate::types::{float_from_domain, unsigned_from_domain, AttributeKind, DomainValue};

/// The four-way classification a relation gets once, at registration time,
/// from its two independent input/output flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationRole {
    Input,
    Output,
    InputOutput,
    Internal
}

impl RelationRole {
    pub fn classify(is_input: bool, is_output: bool) -> RelationRole {
        match (is_input, is_output) {
            (true, true) => RelationRole::InputOutput,
            (true, false) => RelationRole::Input,
            (false, true) => RelationRole::Output,
            (false, false) => RelationRole::Internal
        }
    }
}

#[derive(Debug)]
pub enum ProgramError {
    Io(std::io::Error),
    BadRecord {
        relation: String,
        line: usize,
        reason: String
    }
}

impl From<std::io::Error> for ProgramError {
    fn from(io_error: std::io::Error) -> Self {
        ProgramError::Io(io_error)
    }
}

impl Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramError::Io(io_error) => write!(f, "io error: {}", io_error),
            ProgramError::BadRecord { relation, line, reason } => {
                write!(f, "bad record for relation '{}' at line {}: {}", relation, line, reason)
            }
        }
    }
}

impl Error for ProgramError {}

/// Bookkeeping every compiled program instance embeds: owns the program's
/// relation handles, tracks their classification, and provides the bulk
/// operations over the input/output/internal partitions.
pub struct ProgramRegistry {
    relations: Vec<Box<dyn Relation>>,
    by_name: BTreeMap<String, usize>,
    roles: Vec<RelationRole>,
    // inputs/outputs are independent memberships (a relation registered
    // with both flags sits in both); internals is the leftover bucket
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    internals: Vec<usize>,
    num_threads: usize
}

impl ProgramRegistry {
    pub fn new() -> ProgramRegistry {
        ProgramRegistry {
            relations: Vec::new(),
            by_name: BTreeMap::new(),
            roles: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            internals: Vec::new(),
            num_threads: ProgramConfig::new().num_threads
        }
    }

    /// Register a relation handle under `name` and classify it. The
    /// classification never changes afterwards. Registering two relations
    /// under one name is a contract violation.
    pub fn add_relation(&mut self, name: &str, relation: Box<dyn Relation>, is_input: bool, is_output: bool) {
        assert!(
            !self.by_name.contains_key(name),
            "relation '{}' registered twice",
            name
        );
        let index = self.relations.len();
        let role = RelationRole::classify(is_input, is_output);
        debug!("registering {:?} relation '{}'", role, name);
        self.relations.push(relation);
        self.roles.push(role);
        self.by_name.insert(name.to_string(), index);
        if is_input {
            self.inputs.push(index);
        }
        if is_output {
            self.outputs.push(index);
        }
        if role == RelationRole::Internal {
            self.internals.push(index);
        }
    }

    /// Unknown names are an expected, recoverable outcome, hence `Option`.
    pub fn get_relation(&self, name: &str) -> Option<&dyn Relation> {
        self.by_name.get(name).map(|&index| self.relations[index].as_ref())
    }

    pub fn relation_role(&self, name: &str) -> Option<RelationRole> {
        self.by_name.get(name).map(|&index| self.roles[index])
    }

    /// Row count of a known relation. Calling this with an unknown name is
    /// a contract violation; branch on `get_relation` first.
    pub fn relation_size(&self, name: &str) -> usize {
        self.get_relation(name)
            .expect("relation_size called with an unknown relation name")
            .size()
    }

    /// Name of a known relation, as the handle reports it. Calling this
    /// with an unknown name is a contract violation.
    pub fn relation_name(&self, name: &str) -> &str {
        self.get_relation(name)
            .expect("relation_name called with an unknown relation name")
            .name()
    }

    fn bucket(&self, indices: &[usize]) -> Vec<&dyn Relation> {
        indices.iter().map(|&index| self.relations[index].as_ref()).collect()
    }

    pub fn input_relations(&self) -> Vec<&dyn Relation> {
        self.bucket(&self.inputs)
    }

    pub fn output_relations(&self) -> Vec<&dyn Relation> {
        self.bucket(&self.outputs)
    }

    pub fn internal_relations(&self) -> Vec<&dyn Relation> {
        self.bucket(&self.internals)
    }

    pub fn all_relations(&self) -> Vec<&dyn Relation> {
        self.relations.iter().map(|relation| relation.as_ref()).collect()
    }

    pub fn purge_input_relations(&self) {
        debug!("purging {} input relations", self.inputs.len());
        for relation in self.input_relations() {
            relation.purge();
        }
    }

    pub fn purge_output_relations(&self) {
        debug!("purging {} output relations", self.outputs.len());
        for relation in self.output_relations() {
            relation.purge();
        }
    }

    pub fn purge_internal_relations(&self) {
        debug!("purging {} internal relations", self.internals.len());
        for relation in self.internal_relations() {
            relation.purge();
        }
    }

    /// Advisory thread-count hint for the execution engine. Stored, never
    /// acted on here.
    pub fn set_num_threads(&mut self, num_threads: usize) {
        self.num_threads = num_threads;
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Human-readable rendering of all input relations, for diagnostics
    /// only. The format is not part of any contract.
    pub fn dump_inputs(&self, out: &mut dyn Write) -> io::Result<()> {
        self.dump(&self.inputs, out)
    }

    /// Human-readable rendering of all output relations.
    pub fn dump_outputs(&self, out: &mut dyn Write) -> io::Result<()> {
        self.dump(&self.outputs, out)
    }

    fn dump(&self, indices: &[usize], out: &mut dyn Write) -> io::Result<()> {
        for &index in indices {
            let relation = self.relations[index].as_ref();
            writeln!(out, "---------------")?;
            writeln!(out, "{}", relation.name())?;
            writeln!(out, "===============")?;
            for row in relation.scan() {
                let rendered = (0..relation.arity())
                    .map(|column| render_value(relation, column, row[column]))
                    .join("\t");
                writeln!(out, "{}", rendered)?;
            }
            writeln!(out, "===============")?;
        }
        Ok(())
    }
}

/// Render one domain value according to its column's declared kind,
/// resolving symbol ids back to text.
pub(crate) fn render_value(relation: &dyn Relation, column: usize, value: DomainValue) -> String {
    match relation.attribute(column).kind {
        AttributeKind::Symbol => relation.symbol_table().resolve(value),
        AttributeKind::Signed => value.to_string(),
        AttributeKind::Unsigned => unsigned_from_domain(value).to_string(),
        AttributeKind::Float => float_from_domain(value).to_string()
    }
}

/// Contract every compiled program fulfils. The bookkeeping lives in the
/// embedded [`ProgramRegistry`]; the load/store/run obligations are
/// supplied by the generated program, which knows its own evaluation order
/// and persistence formats.
pub trait Program {
    fn registry(&self) -> &ProgramRegistry;

    fn registry_mut(&mut self) -> &mut ProgramRegistry;

    /// The symbol table shared by this program's relations.
    fn symbol_table(&self) -> &dyn SymbolTable;

    /// Evaluate the program without any loads or stores. `None` evaluates
    /// all strata, `Some(index)` only the given stratum.
    fn run(&self, _stratum: Option<usize>) {}

    /// Load all inputs from `input_dir`, evaluate, store all outputs into
    /// `output_dir`.
    fn run_all(&self, input_dir: &Path, output_dir: &Path, stratum: Option<usize>) -> Result<(), ProgramError>;

    /// Read every input relation from `input_dir`.
    fn load_all(&self, input_dir: &Path) -> Result<(), ProgramError>;

    /// Store every output relation into `output_dir`.
    fn print_all(&self, output_dir: &Path) -> Result<(), ProgramError>;

    /// Invoke a named internal computation with positional arguments.
    /// Results land in `results`, with `result_errors` flagging the slots
    /// that are erroneous, one bit per result. Unknown subroutines are a
    /// no-op by default.
    fn execute_subroutine(
        &self,
        _name: &str,
        _args: &[DomainValue],
        _results: &mut Vec<DomainValue>,
        _result_errors: &mut BitVec
    ) {
    }

    fn get_relation(&self, name: &str) -> Option<&dyn Relation> {
        self.registry().get_relation(name)
    }

    fn dump_inputs(&self, out: &mut dyn Write) -> io::Result<()> {
        self.registry().dump_inputs(out)
    }

    fn dump_outputs(&self, out: &mut dyn Write) -> io::Result<()> {
        self.registry().dump_outputs(out)
    }

    fn purge_input_relations(&self) {
        self.registry().purge_input_relations();
    }

    fn purge_output_relations(&self) {
        self.registry().purge_output_relations();
    }

    fn purge_internal_relations(&self) {
        self.registry().purge_internal_relations();
    }

    fn set_num_threads(&mut self, num_threads: usize) {
        self.registry_mut().set_num_threads(num_threads);
    }

    fn num_threads(&self) -> usize {
        self.registry().num_threads()
    }
}
