use garde::Validate;
use rowgate_data::{
    AtomicCreator, Credential, CredentialValidator, DataConfig, RecordReader, RecordStore,
};

use crate::error::CatalogError;
use crate::models::{NewUser, User};

#[derive(Clone)]
pub struct UserService<S> {
    reader: RecordReader<User, S>,
    validator: CredentialValidator<User, S>,
    creator: AtomicCreator<User, S>,
}

impl<S: RecordStore + Clone> UserService<S> {
    pub fn new(store: S, config: &DataConfig) -> Self {
        Self {
            reader: RecordReader::new(store.clone(), config),
            validator: CredentialValidator::new(store.clone(), config),
            creator: AtomicCreator::new(store, config),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, CatalogError> {
        Ok(self.reader.find_by_id(id).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, CatalogError> {
        Ok(self.reader.get_by_id(id).await?)
    }

    /// `Ok(false)` for an unknown username and for a wrong hash alike.
    pub async fn validate_credentials(
        &self,
        credential: &Credential,
    ) -> Result<bool, CatalogError> {
        Ok(self.validator.validate(credential).await?)
    }

    pub async fn create(&self, draft: NewUser) -> Result<User, CatalogError> {
        draft.validate()?;
        let user = self.creator.create(&draft).await?;
        tracing::info!(id = user.id, "user created");
        Ok(user)
    }
}
