use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Store, config_entries};

use super::{Engine, with_tx};

const MAX_KEY_LEN: usize = 64;

fn validate_key(key: &str) -> ResultEngine<String> {
    let key = key.trim();
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(EngineError::InvalidInput(format!("invalid config key: {key}")));
    }
    Ok(key.to_string())
}

impl Engine {
    /// The whole shop configuration as a key/value map.
    pub async fn shop_config(&self) -> ResultEngine<BTreeMap<String, String>> {
        let rows = self.database.find_many(config_entries::Entity::find()).await?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    pub async fn config_value(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self
            .database
            .find_one::<config_entries::Entity>(key.to_string())
            .await?
            .map(|row| row.value))
    }

    /// Upserts every given key in one transaction and returns the full map.
    pub async fn set_config(
        &self,
        entries: BTreeMap<String, String>,
    ) -> ResultEngine<BTreeMap<String, String>> {
        let entries = entries
            .into_iter()
            .map(|(key, value)| Ok((validate_key(&key)?, value)))
            .collect::<ResultEngine<Vec<_>>>()?;
        if entries.is_empty() {
            return Err(EngineError::InvalidInput("no config keys given".to_string()));
        }

        let now = Utc::now();
        with_tx!(self, |db_tx| {
            for (key, value) in entries {
                let active = config_entries::ActiveModel {
                    key: ActiveValue::Set(key.clone()),
                    value: ActiveValue::Set(value),
                    updated_at: ActiveValue::Set(now),
                };
                if db_tx
                    .find_one::<config_entries::Entity>(key)
                    .await?
                    .is_some()
                {
                    db_tx.update(active).await?;
                } else {
                    db_tx.create(active).await?;
                }
            }
            Ok::<_, EngineError>(())
        })?;

        self.shop_config().await
    }
}
