use crate::domain::Error;

pub const KEY_BALANCE_SUFFIX: &str = "/balance";
pub const KEY_CHARGE_SUFFIX: &str = "/charge";

/// Charge applied to keys that were never reset.
pub const DEFAULT_CHARGE: i64 = 5;
pub const DEFAULT_BALANCE: i64 = 0;

/// Store field names for one account key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub key: String,
    pub balance_field: String, // remaining charge-units
    pub charge_field: String,  // cost per authorized request
}

impl Account {
    pub fn new(key: &str) -> Result<Self, Error> {
        if key.trim().is_empty() {
            return Err(Error::InvalidKey(key.to_string()));
        }

        Ok(Self {
            key: key.to_string(),
            balance_field: format!("{key}{KEY_BALANCE_SUFFIX}"),
            charge_field: format!("{key}{KEY_CHARGE_SUFFIX}"),
        })
    }
}

/// Absent fields take `default`; present ones must hold an integer.
pub fn parse_stored(field: &str, raw: Option<String>, default: i64) -> Result<i64, Error> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::rejected(format!("field {field} holds a non-integer value {value:?}"))),
    }
}
