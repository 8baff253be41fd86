use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// One of the two fixed identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Account {
    Hardik,
    Ananya,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown account: {0}")]
pub struct ParseAccountError(pub String);

impl Account {
    pub const ALL: [Account; 2] = [Account::Hardik, Account::Ananya];

    pub fn as_str(self) -> &'static str {
        match self {
            Account::Hardik => "hardik",
            Account::Ananya => "ananya",
        }
    }

    /// The non-self account.
    pub fn other(self) -> Account {
        match self {
            Account::Hardik => Account::Ananya,
            Account::Ananya => Account::Hardik,
        }
    }

    fn password(self) -> &'static str {
        match self {
            Account::Hardik => "iloveananya",
            Account::Ananya => "ilovehardik",
        }
    }

    /// Check a credential pair as typed into the login form.
    ///
    /// The username is trimmed and lower-cased; the password must match exactly.
    pub fn authenticate(username: &str, password: &str) -> Option<Account> {
        let account = username.trim().to_lowercase().parse::<Account>().ok()?;
        (account.password() == password).then_some(account)
    }
}

impl FromStr for Account {
    type Err = ParseAccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hardik" => Ok(Account::Hardik),
            "ananya" => Ok(Account::Ananya),
            _ => Err(ParseAccountError(s.to_string())),
        }
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
