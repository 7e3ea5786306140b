pub struct ProgramConfig {
    pub num_threads: usize
}

impl ProgramConfig {
    pub fn new() -> ProgramConfig {
        // Read environment variable 'FERROLOG_NTHREADS'
        // If not set, use 1 as default. The value is an advisory hint for
        // the execution engine; this layer never spawns threads itself.
        let num_threads = match std::env::var("FERROLOG_NTHREADS") {
            Ok(val) => val.parse::<usize>().unwrap_or(1),
            Err(_) => 1
        };
        ProgramConfig {
            num_threads
        }
    }
}
