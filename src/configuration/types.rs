use clap::ValueEnum;
use serde::Deserialize;

/// Which session store implementation the service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local map, lost on restart
    #[default]
    Memory,
    /// SeaORM database at `database_url`
    Database,
}
