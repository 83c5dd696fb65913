use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{BalanceStore, DEFAULT_BALANCE, Debit, Error, account::parse_stored};

/// In-process store. Every operation holds the lock for its whole
/// read-modify-write, which is what makes the conditional decrement atomic.
#[derive(Default, Debug)]
pub struct MemoryStore {
    fields: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            fields: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.fields.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.fields.lock().await.is_empty()
    }
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn get(&self, field: &str) -> Result<Option<String>, Error> {
        Ok(self.fields.lock().await.get(field).cloned())
    }

    async fn conditional_decrement(
        &self,
        balance_field: &str,
        charge_field: &str,
        default_charge: i64,
    ) -> Result<Debit, Error> {
        let mut fields = self.fields.lock().await;
        let balance = parse_stored(
            balance_field,
            fields.get(balance_field).cloned(),
            DEFAULT_BALANCE,
        )?;
        let charge = parse_stored(charge_field, fields.get(charge_field).cloned(), default_charge)?;

        if balance < charge {
            return Ok(Debit::Refused { balance, charge });
        }

        let remaining = balance.checked_sub(charge).ok_or_else(|| {
            Error::rejected(format!(
                "decrementing {balance_field} ({balance}) by {charge} would overflow"
            ))
        })?;
        fields.insert(balance_field.to_string(), remaining.to_string());
        Ok(Debit::Applied { remaining, charge })
    }

    async fn set(&self, field: &str, value: &str) -> Result<(), Error> {
        self.fields
            .lock()
            .await
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn set_all(&self, entries: &[(String, String)]) -> Result<(), Error> {
        let mut fields = self.fields.lock().await;
        for (field, value) in entries {
            fields.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        tracing::info!("memory store released");
        Ok(())
    }
}
