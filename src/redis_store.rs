use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, Script};
use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::domain::{BalanceStore, Debit, Error, account::parse_stored};

/// KEYS: balance field, charge field. ARGV: default charge.
/// Replies `{applied, balance, charge}`; balance is the post-decrement value
/// when applied. Raw strings are passed through so large integers never go
/// through Lua's doubles on the way back.
const CONDITIONAL_DECREMENT_LUA: &str = r#"
local raw_balance = redis.call('GET', KEYS[1]) or '0'
local raw_charge = redis.call('GET', KEYS[2]) or ARGV[1]
local balance = tonumber(raw_balance)
local charge = tonumber(raw_charge)
if balance == nil or charge == nil then
    return redis.error_reply('ERR balance or charge is not an integer')
end
if balance < charge then
    return {0, raw_balance, raw_charge}
end
redis.call('DECRBY', KEYS[1], raw_charge)
return {1, redis.call('GET', KEYS[1]), raw_charge}
"#;

fn store_error(op: &str, err: RedisError) -> Error {
    let reason = format!("redis {op}: {err}");
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        Error::unreachable(reason)
    } else {
        Error::rejected(reason)
    }
}

/// Redis-backed store over one multiplexed connection, opened once and
/// cloned into every call.
pub struct RedisStore {
    manager: RwLock<Option<ConnectionManager>>,
    decrement: Script,
}

impl RedisStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, Error> {
        let url = config.redis_url();
        let client = redis::Client::open(url.as_str())
            .map_err(|err| Error::Config(format!("redis url {url}: {err}")))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| store_error("connect", err))?;

        tracing::info!(endpoint = %config.endpoint, port = config.port, "redis client ready");

        Ok(Self {
            manager: RwLock::new(Some(manager)),
            decrement: Script::new(CONDITIONAL_DECREMENT_LUA),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, Error> {
        self.manager
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::rejected("redis connection closed"))
    }
}

#[async_trait]
impl BalanceStore for RedisStore {
    async fn get(&self, field: &str) -> Result<Option<String>, Error> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(field)
            .await
            .map_err(|err| store_error(&format!("get {field}"), err))?;
        Ok(value)
    }

    async fn conditional_decrement(
        &self,
        balance_field: &str,
        charge_field: &str,
        default_charge: i64,
    ) -> Result<Debit, Error> {
        let mut conn = self.connection().await?;
        let (applied, raw_balance, raw_charge): (i64, String, String) = self
            .decrement
            .key(balance_field)
            .key(charge_field)
            .arg(default_charge)
            .invoke_async(&mut conn)
            .await
            .map_err(|err| store_error(&format!("decrement {balance_field}"), err))?;

        let balance = parse_stored(balance_field, Some(raw_balance), 0)?;
        let charge = parse_stored(charge_field, Some(raw_charge), default_charge)?;
        Ok(if applied == 1 {
            Debit::Applied {
                remaining: balance,
                charge,
            }
        } else {
            Debit::Refused { balance, charge }
        })
    }

    async fn set(&self, field: &str, value: &str) -> Result<(), Error> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(field, value)
            .await
            .map_err(|err| store_error(&format!("set {field}"), err))
    }

    // MULTI/EXEC: either every field is written or none is.
    async fn set_all(&self, entries: &[(String, String)]) -> Result<(), Error> {
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (field, value) in entries {
            pipe.set(field, value).ignore();
        }
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|err| store_error("multi set", err))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        match self.manager.write().await.take() {
            Some(manager) => {
                drop(manager);
                tracing::info!("redis client disconnected");
                Ok(())
            }
            None => Err(Error::rejected("redis connection already closed")),
        }
    }
}
