//! Pipeline YAML configuration types.

use std::path::PathBuf;

use medallion_store::ConnectionParams;
use serde::Deserialize;

/// Top-level pipeline configuration, parsed once at start-up.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub version: String,
    pub pipeline: String,
    #[serde(default)]
    pub bronze: BronzeConfig,
    #[serde(default)]
    pub warehouse: DatabaseConfig,
    #[serde(default)]
    pub gold: GoldConfig,
    /// Remote copy of the gold tables. Absent means local gold only.
    #[serde(default)]
    pub replica: Option<ReplicaConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BronzeConfig {
    /// Directory holding `<table>.csv` input files.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
}

impl Default for BronzeConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./bronze_inputs")
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_database() -> String {
    "medallion".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoldConfig {
    /// Schema in the warehouse that receives gold tables.
    #[serde(default = "default_gold_schema")]
    pub schema: String,
}

impl Default for GoldConfig {
    fn default() -> Self {
        Self {
            schema: default_gold_schema(),
        }
    }
}

fn default_gold_schema() -> String {
    "gold".to_string()
}

/// Replica database plus the schema gold tables are copied into.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicaConfig {
    #[serde(flatten)]
    pub connection: DatabaseConfig,
    #[serde(default = "default_replica_schema")]
    pub schema: String,
}

fn default_replica_schema() -> String {
    "public".to_string()
}
