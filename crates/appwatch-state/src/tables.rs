//! redb table definitions for the appwatch state store.

use redb::TableDefinition;

/// Application records keyed by `{namespace}/{name}`.
pub const APPLICATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("applications");
