use std::future::Future;
use std::time::Instant;

use crate::config::GatewayOptions;
use crate::domain::{
    Account, BalanceStore, ChargeOutcome, DEFAULT_BALANCE, DEFAULT_CHARGE, Error,
    account::parse_stored,
};

/// Balance ledger gateway: check-and-deduct charging over a shared store.
///
/// The store is injected once and reused by every call. Share the gateway
/// behind an `Arc` to charge from many tasks at once; `shutdown` needs the
/// gateway back by value, so it can only run after every caller let go.
#[derive(Debug)]
pub struct Gateway<S>
where
    S: BalanceStore,
{
    store: S,
    options: GatewayOptions,
}

impl<S> Gateway<S>
where
    S: BalanceStore,
{
    pub fn new(store: S, options: GatewayOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Deducts the key's charge amount when its balance covers it.
    ///
    /// Balance and charge are read, compared and (maybe) decremented in a
    /// single store-side step, so the verdict always comes from one snapshot
    /// and concurrent charges or resets on the same key cannot interleave
    /// with it. Never retried: a timed-out attempt may still have applied.
    pub async fn charge_request(&self, key: &str) -> Result<ChargeOutcome, Error> {
        let started = Instant::now();
        let account = Account::new(key)?;

        let debit = self
            .bounded(
                "conditional decrement",
                self.store.conditional_decrement(
                    &account.balance_field,
                    &account.charge_field,
                    DEFAULT_CHARGE,
                ),
            )
            .await?;
        let outcome = ChargeOutcome::from_debit(key, debit);

        tracing::info!(
            %outcome,
            latency_ms = started.elapsed().as_millis() as u64,
            "charge request"
        );
        Ok(outcome)
    }

    /// Overwrites balance and charge amount together.
    pub async fn reset_account(&self, key: &str, balance: i64, charge: i64) -> Result<(), Error> {
        let account = Account::new(key)?;
        let entries = [
            (account.balance_field, balance.to_string()),
            (account.charge_field, charge.to_string()),
        ];

        self.bounded("reset", self.store.set_all(&entries)).await?;
        tracing::info!(key, balance, charge, "account reset");
        Ok(())
    }

    /// Current balance, for diagnostics. Read-only, so retried on
    /// transient failures.
    pub async fn balance(&self, key: &str) -> Result<i64, Error> {
        let account = Account::new(key)?;
        parse_stored(
            &account.balance_field,
            self.read(&account.balance_field).await?,
            DEFAULT_BALANCE,
        )
    }

    /// Releases the store connection. Consuming `self` guarantees nothing
    /// else is still using it and that it is released once.
    pub async fn shutdown(self) -> Result<(), Error> {
        self.store.close().await
    }

    async fn read(&self, field: &str) -> Result<Option<String>, Error> {
        let mut backoff = self.options.retry_backoff;
        let mut attempt = 0;

        loop {
            match self.bounded("get", self.store.get(field)).await {
                Err(e) if e.is_transient() && attempt < self.options.read_retries => {
                    attempt += 1;
                    tracing::warn!(field, attempt, error = %e, "retrying store read");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                res => return res,
            }
        }
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match tokio::time::timeout(self.options.op_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(Error::timed_out(format!(
                "{op} after {:?}",
                self.options.op_timeout
            ))),
        }
    }
}
