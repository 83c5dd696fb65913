use std::env;
use std::sync::Arc;

use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use charge_gateway::{
    Backend, BalanceStore, ChargeOutcome, Error, Gateway, MemoryStore, RedisStore, StoreConfig,
};

const USAGE: &str = "usage: charge_gateway <key> <balance> <charge> <requests>";

/// One demo run: reset `key`, then fire `requests` concurrent charges at it.
#[derive(Debug)]
struct Demo {
    key: String,
    balance: i64,
    charge: i64,
    requests: usize,
}

impl Demo {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, Error> {
        let mut next = || args.next().ok_or_else(|| Error::Config(USAGE.to_string()));
        let key = next()?;
        let balance = next()?;
        let charge = next()?;
        let requests = next()?;

        let invalid = |what: &str, raw: &str| Error::Config(format!("{what} {raw:?}; {USAGE}"));
        Ok(Self {
            balance: balance.parse().map_err(|_| invalid("balance", &balance))?,
            charge: charge.parse().map_err(|_| invalid("charge", &charge))?,
            requests: requests.parse().map_err(|_| invalid("requests", &requests))?,
            key,
        })
    }
}

async fn run<S>(gateway: &Arc<Gateway<S>>, demo: &Demo) -> Result<(), Box<dyn std::error::Error>>
where
    S: BalanceStore + 'static,
{
    gateway
        .reset_account(&demo.key, demo.balance, demo.charge)
        .await?;

    let handles = (0..demo.requests).map(|_| {
        let gateway = Arc::clone(gateway);
        let key = demo.key.clone();
        tokio::spawn(async move { gateway.charge_request(&key).await })
    });
    // Wait for every task before looking at results so none outlives the run.
    let results = join_all(handles).await;

    let mut authorized = 0;
    let mut refused = 0;
    for result in results {
        let outcome: ChargeOutcome = result??;
        if outcome.is_authorized {
            authorized += 1;
        } else {
            refused += 1;
        }
        println!("{}", serde_json::to_string(&outcome)?);
    }

    let balance = gateway.balance(&demo.key).await?;
    println!("authorized={authorized} refused={refused} balance={balance}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let demo = Demo::from_args(env::args().skip(1))?;
    let config = StoreConfig::from_env()?;

    // Connect once up front; every request reuses this store.
    let store: Box<dyn BalanceStore> = match config.backend {
        Backend::Redis => Box::new(RedisStore::connect(&config).await?),
        Backend::Memory => Box::new(MemoryStore::new()),
    };
    let gateway = Arc::new(Gateway::new(store, config.gateway));

    let result = run(&gateway, &demo).await;

    // Release the connection even when the run failed.
    let shutdown = match Arc::try_unwrap(gateway) {
        Ok(gateway) => gateway.shutdown().await,
        Err(_) => {
            tracing::warn!("gateway still shared at exit; connection dropped without close");
            Ok(())
        }
    };

    result?;
    shutdown?;
    Ok(())
}
