//! Target table provisioning.

use tracing::{debug, info};

use csvland_model::{EventSink, RunEvent, TableSpec};

use crate::client::DatabaseClient;
use crate::ddl::create_table_sql_with;
use crate::error::ProvisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The table was already there; nothing was executed.
    Existing,
    /// The table was created from the [`TableSpec`].
    Created,
}

impl ProvisionOutcome {
    pub fn created(self) -> bool {
        self == Self::Created
    }
}

/// Makes sure the target table exists.
///
/// An existing table is used as is; its columns are not compared with
/// `spec`. A missing table is created only when `allow_create` is set.
pub fn ensure_table(
    client: &dyn DatabaseClient,
    spec: &TableSpec,
    allow_create: bool,
    sink: &dyn EventSink,
) -> Result<ProvisionOutcome, ProvisionError> {
    let exists = client
        .table_exists(&spec.name)
        .map_err(|source| ProvisionError::ExistenceCheck {
            table: spec.name.clone(),
            source,
        })?;

    let outcome = if exists {
        debug!(table = %spec.name, "table exists, skipping DDL");
        ProvisionOutcome::Existing
    } else if !allow_create {
        return Err(ProvisionError::TableMissing {
            table: spec.name.clone(),
        });
    } else {
        let sql = create_table_sql_with(spec, |column_type| {
            client.column_type_sql(column_type)
        });
        debug!(sql = %sql, "creating table");
        client
            .execute(&sql, &[])
            .map_err(|source| ProvisionError::DdlExecution {
                table: spec.name.clone(),
                source,
            })?;
        info!(table = %spec.name, columns = spec.columns.len(), "table created");
        ProvisionOutcome::Created
    };

    sink.emit(&RunEvent::TableProvisioned {
        table: spec.name.clone(),
        created: outcome.created(),
    });
    Ok(outcome)
}
