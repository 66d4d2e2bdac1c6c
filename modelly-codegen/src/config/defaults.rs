//! Default configuration values - single source of truth

use crate::codegen::{DEFAULT_PARAM_BUDGET, TRANSACTIONAL_PARAMS_DIVISOR};

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Root namespace for tables that do not carry one
pub const NAMESPACE: &str = "Modelly";

/// Database segment of the backend namespaces
pub const DATABASE: &str = "Main";

/// Whether to generate the C# backend by default
pub const GENERATE_BACKEND: bool = true;

/// Whether to generate the Angular client by default
pub const GENERATE_CLIENT: bool = true;

/// Default output root; each table gets its own folder below it
pub const OUTPUT_DIR: &str = "./generated";

/// Maximum bound parameters per generated statement
pub const PARAM_BUDGET: usize = DEFAULT_PARAM_BUDGET;

/// Per-row divisor of transactional bulk inserts/updates (compatible policy)
pub const TRANSACTIONAL_DIVISOR: usize = TRANSACTIONAL_PARAMS_DIVISOR;

/// Whether tables are generated on the rayon pool by default
pub const PARALLEL: bool = true;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;
