//! Ferrolog is the access layer between compiled Datalog-style programs
//! and the hosts embedding them: a storage-agnostic relation/tuple/scan
//! abstraction, per-program relation registries, and a process-wide
//! directory through which named programs are instantiated without linking
//! against their concrete types.
//!
//! Compiled programs implement [`Relation`] for their index structures and
//! [`Program`] for the generated driver, embed a [`ProgramRegistry`] for
//! the bookkeeping, and register a [`ProgramFactory`] from a
//! `#[ctor::ctor]` startup hook so hosts can call `factory::new_instance`
//! by name. Hosts read and write rows through [`Tuple`] views, which
//! type-check every access against the relation's attribute metadata and
//! intern symbol columns through the relation's [`SymbolTable`].

pub mod btree;
pub mod config;
pub mod factory;
pub mod program;
pub mod relation;
pub mod symbols;
pub mod tuple;
pub mod types;

#[cfg(test)]
mod fixtures;

// Startup-hook attribute for program crates registering their factories
pub use ctor;

pub use crate::btree::BTreeRelation;
pub use crate::config::ProgramConfig;
pub use crate::factory::ProgramFactory;
pub use crate::program::{Program, ProgramError, ProgramRegistry, RelationRole};
pub use crate::relation::{Attribute, Relation, RelationScan, ScanCursor};
pub use crate::symbols::{StringTable, SymbolTable};
pub use crate::tuple::Tuple;
pub use crate::types::{
    domain_from_float, domain_from_unsigned, float_from_domain, unsigned_from_domain,
    AttributeKind, DomainValue
};
