use serde::Serialize;

/// What the store's atomic check-and-deduct step saw and did. Both numbers
/// come from the same snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debit {
    Applied { remaining: i64, charge: i64 },
    Refused { balance: i64, charge: i64 },
}

/// Result of one charge request. Never persisted; serializes to the
/// `{key, remainingBalance, charges, isAuthorized}` shape callers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeOutcome {
    pub key: String,
    pub remaining_balance: i64,
    pub charges: i64,
    pub is_authorized: bool,
}

impl ChargeOutcome {
    pub fn authorized(key: &str, remaining_balance: i64, charges: i64) -> Self {
        Self {
            key: key.to_string(),
            remaining_balance,
            charges,
            is_authorized: true,
        }
    }

    pub fn refused(key: &str, remaining_balance: i64, charges: i64) -> Self {
        Self {
            key: key.to_string(),
            remaining_balance,
            charges,
            is_authorized: false,
        }
    }

    pub fn from_debit(key: &str, debit: Debit) -> Self {
        match debit {
            Debit::Applied { remaining, charge } => Self::authorized(key, remaining, charge),
            Debit::Refused { balance, charge } => Self::refused(key, balance, charge),
        }
    }
}

impl core::fmt::Display for ChargeOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "key={},remaining={},charges={},authorized={}",
            self.key, self.remaining_balance, self.charges, self.is_authorized
        )
    }
}
