use chrono::{DateTime, Utc};
use garde::Validate;
use rowgate_data::{
    Authenticatable, BindParam, Column, Creatable, DataError, Entity, Record, Secret, SqlType,
};
use serde::{Deserialize, Serialize};

/// A user as it leaves the directory. The password hash has no field here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_date: DateTime<Utc>,
    pub is_active: bool,
    pub role: Option<String>,
}

impl User {
    pub const ID: Column = Column::new("id", SqlType::Integer);
    pub const USERNAME: Column = Column::new("username", SqlType::VarChar(64));
    pub const EMAIL: Column = Column::new("email", SqlType::VarChar(255));
    pub const CREATED_DATE: Column = Column::new("created_date", SqlType::Timestamp);
    pub const IS_ACTIVE: Column = Column::new("is_active", SqlType::Bool);
    pub const ROLE: Column = Column::new("role", SqlType::VarChar(50));
    /// Written on create, compared on login, never projected.
    pub const PASSWORD_HASH: Column = Column::new("password_hash", SqlType::VarChar(256));
}

const USER_COLUMNS: [Column; 6] = [
    User::ID,
    User::USERNAME,
    User::EMAIL,
    User::CREATED_DATE,
    User::IS_ACTIVE,
    User::ROLE,
];

impl Entity for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [Column] {
        &USER_COLUMNS
    }

    fn from_record(record: Record) -> Result<Self, DataError> {
        Ok(Self {
            id: record.get_i64("id")?,
            username: record.get_str("username")?,
            email: record.get_str("email")?,
            created_date: record.get_timestamp("created_date")?,
            is_active: record.get_bool("is_active")?,
            role: record.get_opt_str("role")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Creatable for User {
    type Draft = NewUser;

    fn insert_values(draft: &NewUser) -> Result<Vec<(&'static str, BindParam)>, DataError> {
        let hash = User::PASSWORD_HASH;
        Ok(vec![
            ("username", User::USERNAME.bind(draft.username.as_str())?),
            ("email", User::EMAIL.bind(draft.email.as_str())?),
            ("password_hash", BindParam::secret(hash.name, hash.ty, draft.password_hash.expose())?),
            ("role", User::ROLE.bind(draft.role.as_deref())?),
        ])
    }
}

impl Authenticatable for User {
    fn username_column() -> &'static str {
        User::USERNAME.name
    }

    fn secret_column() -> &'static str {
        User::PASSWORD_HASH.name
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[garde(length(chars, min = 1, max = 64))]
    pub username: String,
    #[garde(email, length(chars, max = 255))]
    pub email: String,
    #[garde(custom(hash_length))]
    #[serde(alias = "passwordHash")]
    pub password_hash: Secret,
    #[garde(length(chars, min = 1, max = 50))]
    #[serde(default)]
    pub role: Option<String>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: Secret::new(password_hash),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

fn hash_length(value: &Secret, _: &()) -> garde::Result {
    match value.expose().chars().count() {
        1..=256 => Ok(()),
        _ => Err(garde::Error::new("length must be between 1 and 256")),
    }
}
