use async_trait::async_trait;

use crate::domain::{Debit, Error};

/// Key-value capability the gateway charges against.
///
/// Implementations share one long-lived connection across callers, so every
/// method takes `&self` and must be safe to call concurrently.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn get(&self, field: &str) -> Result<Option<String>, Error>;

    /// In one isolated step: read the balance (absent is 0) and the charge
    /// (absent is `default_charge`), and subtract the charge from the
    /// balance only if the balance covers it. A refusal leaves the store
    /// untouched.
    async fn conditional_decrement(
        &self,
        balance_field: &str,
        charge_field: &str,
        default_charge: i64,
    ) -> Result<Debit, Error>;

    async fn set(&self, field: &str, value: &str) -> Result<(), Error>;

    /// Writes every entry. The fallback issues the writes one by one and
    /// reports which fields landed when a later one fails.
    async fn set_all(&self, entries: &[(String, String)]) -> Result<(), Error> {
        let mut written = Vec::with_capacity(entries.len());
        for (field, value) in entries {
            match self.set(field, value).await {
                Ok(()) => written.push(field.clone()),
                Err(e) if written.is_empty() => return Err(e),
                Err(e) => {
                    return Err(Error::PartialReset {
                        written,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), Error>;
}

#[async_trait]
impl<T: BalanceStore + ?Sized> BalanceStore for Box<T> {
    async fn get(&self, field: &str) -> Result<Option<String>, Error> {
        (**self).get(field).await
    }

    async fn conditional_decrement(
        &self,
        balance_field: &str,
        charge_field: &str,
        default_charge: i64,
    ) -> Result<Debit, Error> {
        (**self)
            .conditional_decrement(balance_field, charge_field, default_charge)
            .await
    }

    async fn set(&self, field: &str, value: &str) -> Result<(), Error> {
        (**self).set(field, value).await
    }

    async fn set_all(&self, entries: &[(String, String)]) -> Result<(), Error> {
        (**self).set_all(entries).await
    }

    async fn close(&self) -> Result<(), Error> {
        (**self).close().await
    }
}
