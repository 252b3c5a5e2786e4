//! `PostgreSQL`-backed warehouse.
//!
//! Uses `tokio-postgres` with the connection driver spawned onto the
//! ambient tokio runtime. Every multi-statement mutation runs inside one
//! transaction, so a failed reload or publish leaves the previous table
//! contents visible.

use medallion_types::{AuditRecord, GoldColumn, GoldResult, RawRow, RawTable, SilverLayer, TableName};
use pg_escape::quote_identifier;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config as PgConfig, NoTls, SimpleQueryMessage, Transaction};

use crate::backend::{BronzeSink, GoldSource, GoldTarget, PublishStats, RawSource, SilverSink};
use crate::error::{self, StoreError};
use crate::schema::{
    create_bronze_table, insert_statement, silver_column_type, validate_identifier, AUDIT_SCHEMA,
    AUDIT_TABLE, BRONZE_SCHEMA, CREATE_AUDIT, CREATE_SILVER, SILVER_SCHEMA,
};

/// Timestamp format for `audit.rejected_rows.timestamp` (UTC, no zone).
const AUDIT_TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Connection parameters for one PostgreSQL database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionParams {
    /// `host:port/database`, safe to log.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

/// A connected PostgreSQL warehouse.
pub struct PgWarehouse {
    client: Client,
    target: String,
}

impl PgWarehouse {
    /// Connect using `params`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`] if the connection cannot be established.
    pub async fn connect(params: &ConnectionParams) -> error::Result<Self> {
        let mut pg = PgConfig::new();
        pg.host(&params.host);
        pg.port(params.port);
        pg.user(&params.user);
        if !params.password.is_empty() {
            pg.password(&params.password);
        }
        pg.dbname(&params.database);

        let target = params.target();
        let (client, connection) = pg.connect(NoTls).await.map_err(|source| StoreError::Connect {
            target: target.clone(),
            source,
        })?;

        let driver_target = target.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(addr = driver_target.as_str(), error = %e, "PostgreSQL connection error");
            }
        });

        tracing::debug!(addr = target.as_str(), "Connected to PostgreSQL");
        Ok(Self { client, target })
    }

    /// `host:port/database` this warehouse is connected to.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Round-trip a trivial query to prove the connection works.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn ping(&mut self) -> error::Result<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| StoreError::postgres("connection test", e))?;
        Ok(())
    }

    /// Run a query through the simple protocol and collect text rows.
    async fn text_rows(&self, sql: &str, context: &str) -> error::Result<Vec<Vec<Option<String>>>> {
        let messages = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| StoreError::postgres(context, e))?;

        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let mut values = Vec::with_capacity(row.len());
                for i in 0..row.len() {
                    let value = row
                        .try_get(i)
                        .map_err(|e| StoreError::postgres(context, e))?;
                    values.push(value.map(str::to_owned));
                }
                rows.push(values);
            }
        }
        Ok(rows)
    }
}

/// Insert `rows` through one prepared statement inside `tx`.
async fn insert_rows(
    tx: &Transaction<'_>,
    sql: &str,
    rows: &[Vec<Option<String>>],
    context: &str,
) -> error::Result<u64> {
    let stmt = tx
        .prepare(sql)
        .await
        .map_err(|e| StoreError::postgres(format!("{context}: prepare"), e))?;

    let mut count = 0u64;
    for row in rows {
        let params: Vec<&(dyn ToSql + Sync)> =
            row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        tx.execute(&stmt, &params)
            .await
            .map_err(|e| StoreError::postgres(format!("{context}: execute"), e))?;
        count += 1;
    }
    Ok(count)
}

fn silver_cast(column: &str) -> String {
    match silver_column_type(column) {
        "text" => String::new(),
        other => format!("::{other}"),
    }
}

impl RawSource for PgWarehouse {
    async fn read_raw_table(&mut self, table: TableName) -> error::Result<RawTable> {
        let sql = format!(
            "SELECT {} FROM {BRONZE_SCHEMA}.{table}",
            table.columns().join(", ")
        );
        let rows = self
            .text_rows(&sql, &format!("read {BRONZE_SCHEMA}.{table}"))
            .await?;
        Ok(RawTable::new(table, rows.into_iter().map(RawRow::new).collect()))
    }
}

impl BronzeSink for PgWarehouse {
    async fn ensure_bronze_schema(&mut self) -> error::Result<()> {
        let mut ddl = format!("CREATE SCHEMA IF NOT EXISTS {BRONZE_SCHEMA};\n");
        for table in TableName::ALL {
            ddl.push_str(&create_bronze_table(table));
            ddl.push_str(";\n");
        }
        self.client
            .batch_execute(&ddl)
            .await
            .map_err(|e| StoreError::postgres("ensure bronze schema", e))?;
        tracing::info!(schema = BRONZE_SCHEMA, "Bronze schema and tables ensured");
        Ok(())
    }

    async fn reload_bronze_table(&mut self, rows: &RawTable) -> error::Result<u64> {
        let table = rows.table;
        let columns = table.columns();
        let context = format!("reload {BRONZE_SCHEMA}.{table}");

        // Pad or cut every row to the column count so each statement binds
        // exactly one parameter per column.
        let values: Vec<Vec<Option<String>>> = rows
            .rows
            .iter()
            .map(|row| (0..columns.len()).map(|i| row.get(i).map(str::to_owned)).collect())
            .collect();

        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| StoreError::postgres(format!("{context}: begin tx"), e))?;
        tx.batch_execute(&format!("TRUNCATE TABLE {BRONZE_SCHEMA}.{table}"))
            .await
            .map_err(|e| StoreError::postgres(format!("{context}: truncate"), e))?;
        let sql = insert_statement(&format!("{BRONZE_SCHEMA}.{table}"), columns, |_| String::new());
        let count = insert_rows(&tx, &sql, &values, &context).await?;
        tx.commit()
            .await
            .map_err(|e| StoreError::postgres(format!("{context}: commit"), e))?;
        Ok(count)
    }
}

impl SilverSink for PgWarehouse {
    async fn ensure_silver_schema(&mut self) -> error::Result<()> {
        self.client
            .batch_execute(CREATE_SILVER)
            .await
            .map_err(|e| StoreError::postgres("ensure silver schema", e))?;
        self.client
            .batch_execute(CREATE_AUDIT)
            .await
            .map_err(|e| StoreError::postgres("ensure audit schema", e))?;
        tracing::info!(
            schema = SILVER_SCHEMA,
            audit = AUDIT_SCHEMA,
            "Silver and audit schemas ensured with required tables"
        );
        Ok(())
    }

    async fn publish_silver(
        &mut self,
        silver: &SilverLayer,
        audit: &[AuditRecord],
    ) -> error::Result<PublishStats> {
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| StoreError::postgres("publish silver: begin tx", e))?;

        let all_tables = TableName::ALL
            .iter()
            .map(|t| format!("{SILVER_SCHEMA}.{t}"))
            .collect::<Vec<_>>()
            .join(", ");
        tx.batch_execute(&format!("TRUNCATE TABLE {all_tables} CASCADE"))
            .await
            .map_err(|e| StoreError::postgres("publish silver: truncate", e))?;
        tracing::debug!("Silver tables truncated");

        let mut stats = PublishStats::default();
        for table in TableName::ALL {
            let sql = insert_statement(
                &format!("{SILVER_SCHEMA}.{table}"),
                table.columns(),
                silver_cast,
            );
            stats.rows_written += insert_rows(
                &tx,
                &sql,
                &silver.table_values(table),
                &format!("publish {SILVER_SCHEMA}.{table}"),
            )
            .await?;
        }

        let audit_rows: Vec<Vec<Option<String>>> = audit
            .iter()
            .map(|record| {
                vec![
                    Some(record.table.as_str().to_string()),
                    Some(record.rejected_data.to_string()),
                    Some(record.reason.as_str().to_string()),
                    Some(
                        record
                            .recorded_at
                            .naive_utc()
                            .format(AUDIT_TIMESTAMP_FMT)
                            .to_string(),
                    ),
                ]
            })
            .collect();
        let audit_sql = insert_statement(
            &format!("{AUDIT_SCHEMA}.{AUDIT_TABLE}"),
            &["table_name", "rejected_data", "reason", "timestamp"],
            |c| match c {
                "rejected_data" => "::jsonb".to_string(),
                "timestamp" => "::timestamp".to_string(),
                _ => String::new(),
            },
        );
        stats.audit_records_written =
            insert_rows(&tx, &audit_sql, &audit_rows, "append audit records").await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::postgres("publish silver: commit", e))?;
        Ok(stats)
    }
}

impl GoldSource for PgWarehouse {
    async fn run_gold_query(&mut self, sql: &str) -> error::Result<GoldResult> {
        let stmt = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| StoreError::postgres("describe gold query", e))?;
        let columns = stmt
            .columns()
            .iter()
            .map(|c| GoldColumn {
                name: c.name().to_string(),
                pg_type: c.type_().name().to_string(),
            })
            .collect();
        let rows = self.text_rows(sql, "run gold query").await?;
        Ok(GoldResult { columns, rows })
    }
}

impl GoldTarget for PgWarehouse {
    async fn ensure_gold_schema(&mut self, schema: &str) -> error::Result<()> {
        validate_identifier(schema)?;
        self.client
            .batch_execute(&format!(
                "CREATE SCHEMA IF NOT EXISTS {}",
                quote_identifier(schema)
            ))
            .await
            .map_err(|e| StoreError::postgres(format!("ensure schema {schema}"), e))?;
        Ok(())
    }

    async fn replace_gold_table(
        &mut self,
        schema: &str,
        name: &str,
        result: &GoldResult,
    ) -> error::Result<u64> {
        validate_identifier(schema)?;
        validate_identifier(name)?;
        let expected = result.columns.len();
        if let Some((row, values)) = result
            .rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(StoreError::ShapeMismatch {
                table: name.to_string(),
                row,
                found: values.len(),
                expected,
            });
        }

        let qualified = format!("{}.{}", quote_identifier(schema), quote_identifier(name));
        let context = format!("replace {schema}.{name}");
        let column_ddl = result
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.pg_type))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| StoreError::postgres(format!("{context}: begin tx"), e))?;
        tx.batch_execute(&format!(
            "DROP TABLE IF EXISTS {qualified} CASCADE; CREATE TABLE {qualified} ({column_ddl})"
        ))
        .await
        .map_err(|e| StoreError::postgres(format!("{context}: recreate"), e))?;

        let count = if result.columns.is_empty() {
            0
        } else {
            let names = result
                .columns
                .iter()
                .map(|c| quote_identifier(&c.name).to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = result
                .columns
                .iter()
                .enumerate()
                .map(|(i, c)| format!("${}::text::{}", i + 1, c.pg_type))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("INSERT INTO {qualified} ({names}) VALUES ({placeholders})");
            insert_rows(&tx, &sql, &result.rows, &context).await?
        };

        tx.commit()
            .await
            .map_err(|e| StoreError::postgres(format!("{context}: commit"), e))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use medallion_types::{Numeric, Reason, Student};

    use super::*;

    /// Helper: get Postgres connection parameters from env or skip test.
    fn test_params() -> ConnectionParams {
        let url = std::env::var("TEST_POSTGRES_URL")
            .expect("TEST_POSTGRES_URL not set, skipping Postgres integration test");
        let config: PgConfig = url.parse().expect("TEST_POSTGRES_URL must be a valid URL");
        ConnectionParams {
            host: match config.get_hosts().first() {
                Some(tokio_postgres::config::Host::Tcp(host)) => host.clone(),
                _ => "localhost".to_string(),
            },
            port: config.get_ports().first().copied().unwrap_or(5432),
            user: config.get_user().unwrap_or("postgres").to_string(),
            password: config
                .get_password()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .unwrap_or_default(),
            database: config.get_dbname().unwrap_or("postgres").to_string(),
        }
    }

    #[test]
    fn target_omits_credentials() {
        let params = ConnectionParams {
            host: "db.internal".into(),
            port: 6543,
            user: "etl".into(),
            password: "hunter2".into(),
            database: "medallion".into(),
        };
        assert_eq!(params.target(), "db.internal:6543/medallion");
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn bronze_reload_replaces_rows() {
        let mut wh = PgWarehouse::connect(&test_params()).await.unwrap();
        wh.ensure_bronze_schema().await.unwrap();

        let first = RawTable::new(
            TableName::Courses,
            vec![
                RawRow::new([Some("1"), Some("Rust"), Some("Systems"), Some("100"), None]),
                RawRow::new([Some("2"), Some("Go"), None, Some("abc"), Some("Rob")]),
            ],
        );
        assert_eq!(wh.reload_bronze_table(&first).await.unwrap(), 2);

        let second = RawTable::new(
            TableName::Courses,
            vec![RawRow::new([Some("3"), None, None, None, None])],
        );
        assert_eq!(wh.reload_bronze_table(&second).await.unwrap(), 1);

        let read = wh.read_raw_table(TableName::Courses).await.unwrap();
        assert_eq!(read.rows, second.rows);
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn publish_silver_truncates_and_appends_audit() {
        let mut wh = PgWarehouse::connect(&test_params()).await.unwrap();
        wh.ensure_silver_schema().await.unwrap();

        let mut silver = SilverLayer::default();
        silver.students.push(Student {
            student_id: Numeric::from(5),
            name: Some("John Smith".into()),
            email: Some("j@x.com".into()),
            city: "Pune".into(),
            signup_date: None,
        });
        let audit = vec![AuditRecord {
            table: TableName::Students,
            rejected_data: serde_json::json!({"student_id": "x"}),
            reason: Reason::NonNumericStudentId,
            recorded_at: Utc::now(),
        }];

        let stats = wh.publish_silver(&silver, &audit).await.unwrap();
        assert_eq!(stats.rows_written, 1);
        assert_eq!(stats.audit_records_written, 1);

        // Publishing the same snapshot again must not duplicate silver rows.
        let stats = wh.publish_silver(&silver, &audit).await.unwrap();
        assert_eq!(stats.rows_written, 1);
        let rows = wh
            .text_rows("SELECT count(*) FROM silver.students", "count")
            .await
            .unwrap();
        assert_eq!(rows[0][0].as_deref(), Some("1"));
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn gold_replace_preserves_column_types() {
        let mut wh = PgWarehouse::connect(&test_params()).await.unwrap();
        wh.ensure_gold_schema("gold_test").await.unwrap();

        let result = wh
            .run_gold_query("SELECT 1::numeric AS total, 'a'::text AS label, DATE '2024-01-31' AS day")
            .await
            .unwrap();
        assert_eq!(result.columns[0].pg_type, "numeric");
        assert_eq!(result.columns[2].pg_type, "date");

        let written = wh
            .replace_gold_table("gold_test", "sample", &result)
            .await
            .unwrap();
        assert_eq!(written, 1);
        let copy = wh
            .run_gold_query("SELECT * FROM gold_test.sample")
            .await
            .unwrap();
        assert_eq!(copy, result);
    }
}
