use std::marker::PhantomData;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{CredentialLimits, DataConfig};
use crate::entity::{Authenticatable, Column};
use crate::error::DataError;
use crate::filter::{FilterOp, Predicate};
use crate::param::{BindParam, SqlType};
use crate::plan::CountPlan;
use crate::store::{bounded, RecordStore};

/// A password hash. Never printed, never serialized.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub username: String,
    #[serde(alias = "passwordHash")]
    pub password_hash: Secret,
}

impl Credential {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: Secret::new(password_hash),
        }
    }
}

/// Checks a username and password hash as one existence count.
///
/// The answer is a plain `bool`: an unknown user and a wrong hash for a
/// known user both produce `false` through the same statement.
pub struct CredentialValidator<E, S> {
    store: S,
    timeout: Duration,
    limits: CredentialLimits,
    _marker: PhantomData<E>,
}

impl<E, S> CredentialValidator<E, S>
where
    E: Authenticatable,
    S: RecordStore,
{
    pub fn new(store: S, config: &DataConfig) -> Self {
        Self {
            store,
            timeout: config.statement_timeout(),
            limits: config.credentials,
            _marker: PhantomData,
        }
    }

    pub async fn validate(&self, credential: &Credential) -> Result<bool, DataError> {
        let username = Column::new(
            E::username_column(),
            SqlType::VarChar(self.limits.username_max_len),
        );
        let secret = Column::new(
            E::secret_column(),
            SqlType::VarChar(self.limits.password_hash_max_len),
        );
        let predicate = Predicate::and(vec![
            Predicate::clause(
                &username,
                FilterOp::Eq,
                username.bind(credential.username.as_str())?,
            ),
            Predicate::clause(
                &secret,
                FilterOp::Eq,
                BindParam::secret(secret.name, secret.ty, credential.password_hash.expose())?,
            ),
        ]);
        let plan = CountPlan::new(E::table_name(), predicate);
        let matches = bounded("count_credentials", self.timeout, self.store.count(&plan)).await?;
        tracing::debug!(table = E::table_name(), "credential check completed");
        Ok(matches > 0)
    }
}

impl<E, S: Clone> Clone for CredentialValidator<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
            limits: self.limits,
            _marker: PhantomData,
        }
    }
}
