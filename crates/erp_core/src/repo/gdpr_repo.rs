//! GDPR exclusion config repository.
//!
//! # Invariants
//! - Configs and their fields load in insertion order (`position`).
//! - `create_config` writes header and fields in one transaction.

use crate::model::gdpr::{DataToExcludeConfig, DataToExcludeConfigId, MetaField, MetaModel};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, TransactionBehavior};

pub trait GdprRepository {
    fn create_config(&mut self, config: &DataToExcludeConfig) -> RepoResult<DataToExcludeConfigId>;
    fn list_configs(&self) -> RepoResult<Vec<DataToExcludeConfig>>;
    fn delete_config(&self, id: DataToExcludeConfigId) -> RepoResult<()>;
}

pub struct SqliteGdprRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteGdprRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl GdprRepository for SqliteGdprRepository<'_> {
    fn create_config(&mut self, config: &DataToExcludeConfig) -> RepoResult<DataToExcludeConfigId> {
        config.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM gdpr_data_to_exclude_configs;",
            [],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO gdpr_data_to_exclude_configs (uuid, position, model_name)
             VALUES (?1, ?2, ?3);",
            params![config.uuid.to_string(), position, config.model.name()],
        )?;
        for (index, field) in config.fields.iter().enumerate() {
            tx.execute(
                "INSERT INTO gdpr_data_to_exclude_fields (config_uuid, position, field_name)
                 VALUES (?1, ?2, ?3);",
                params![config.uuid.to_string(), index as i64, field.name.as_str()],
            )?;
        }
        tx.commit()?;

        Ok(config.uuid)
    }

    fn list_configs(&self) -> RepoResult<Vec<DataToExcludeConfig>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, model_name
             FROM gdpr_data_to_exclude_configs
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut configs = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let model = MetaModel::new(row.get::<_, String>("model_name")?);
            let fields = load_fields(self.conn, &uuid_text, &model)?;
            configs.push(DataToExcludeConfig {
                uuid: parse_uuid(&uuid_text, "gdpr_data_to_exclude_configs.uuid")?,
                model,
                fields,
            });
        }

        Ok(configs)
    }

    fn delete_config(&self, id: DataToExcludeConfigId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM gdpr_data_to_exclude_configs WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "gdpr exclusion config",
                id,
            });
        }
        Ok(())
    }
}

fn load_fields(conn: &Connection, config_uuid: &str, model: &MetaModel) -> RepoResult<Vec<MetaField>> {
    let mut stmt = conn.prepare(
        "SELECT field_name
         FROM gdpr_data_to_exclude_fields
         WHERE config_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([config_uuid])?;
    let mut fields = Vec::new();
    while let Some(row) = rows.next()? {
        fields.push(MetaField {
            model: model.clone(),
            name: row.get(0)?,
        });
    }
    Ok(fields)
}
