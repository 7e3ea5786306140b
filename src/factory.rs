use std::collections::BTreeMap;
use std::sync::LazyLock;

use log::debug;
use parking_lot::RwLock;

use crate::program::Program;

/// Construction capability for one named compiled program. Factories are
/// created once, typically from a startup hook (`#[ctor::ctor]`), and live
/// for the whole process; registration happens at construction time via
/// [`register`].
pub trait ProgramFactory: Send + Sync {
    /// Process-wide unique program name.
    fn name(&self) -> &str;

    /// Build a fresh instance of the program.
    fn instantiate(&self) -> Box<dyn Program>;
}

// The directory is created lazily on first access. Registrations run from
// startup hooks whose order across compilation units is unspecified, so a
// statically-initialized map could be used before it exists; first-use
// initialization cannot.
static REGISTRY: LazyLock<RwLock<BTreeMap<String, &'static dyn ProgramFactory>>> =
    LazyLock::new(|| RwLock::new(BTreeMap::new()));

/// Add `factory` to the process-wide directory. Registering a second
/// factory under an already-used name is a contract violation.
pub fn register(factory: &'static dyn ProgramFactory) {
    let mut registry = REGISTRY.write();
    let name = factory.name();
    assert!(
        !registry.contains_key(name),
        "program factory '{}' registered twice",
        name
    );
    debug!("registered program factory '{}'", name);
    registry.insert(name.to_string(), factory);
}

/// Instantiate the program registered under `name`. Unknown names are an
/// expected outcome and yield `None`.
pub fn new_instance(name: &str) -> Option<Box<dyn Program>> {
    REGISTRY.read().get(name).map(|factory| factory.instantiate())
}

pub fn is_registered(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}
