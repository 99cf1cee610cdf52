mod common;

use common::catalog;
use rowgate_catalog::{CatalogError, NewUser};
use rowgate_data::{Credential, DataError, ErrorKind};

const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNo";

#[tokio::test]
async fn test_create_returns_user_without_hash() {
    let catalog = catalog().await;
    let user = catalog
        .users
        .create(NewUser::new("ann", "ann@example.com", HASH).with_role("admin"))
        .await
        .unwrap();
    assert_eq!(user.username, "ann");
    assert_eq!(user.role.as_deref(), Some("admin"));
    assert!(user.is_active);

    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains(HASH));
    assert!(!json.contains("password"));
    assert!(!format!("{user:?}").contains(HASH));
}

#[tokio::test]
async fn test_get_by_id_matches_created_user() {
    let catalog = catalog().await;
    let created = catalog
        .users
        .create(NewUser::new("bob", "bob@example.com", HASH))
        .await
        .unwrap();
    let fetched = catalog.users.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.role, None);
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    let catalog = catalog().await;
    let err = catalog.users.get_by_id(42).await.unwrap_err();
    assert!(matches!(err, CatalogError::Data(DataError::NotFound(_))));
}

#[tokio::test]
async fn test_credentials_are_opaque() {
    let catalog = catalog().await;
    catalog
        .users
        .create(NewUser::new("ann", "ann@example.com", HASH))
        .await
        .unwrap();

    let valid = catalog
        .users
        .validate_credentials(&Credential::new("ann", HASH))
        .await
        .unwrap();
    let wrong_hash = catalog
        .users
        .validate_credentials(&Credential::new("ann", "not-the-hash"))
        .await
        .unwrap();
    let unknown_user = catalog
        .users
        .validate_credentials(&Credential::new("nobody", HASH))
        .await
        .unwrap();

    assert!(valid);
    assert!(!wrong_hash);
    assert!(!unknown_user);
}

#[tokio::test]
async fn test_hostile_username_is_data() {
    let catalog = catalog().await;
    catalog
        .users
        .create(NewUser::new("ann", "ann@example.com", HASH))
        .await
        .unwrap();
    let hostile = catalog
        .users
        .validate_credentials(&Credential::new("ann' OR '1'='1", "x' OR '1'='1"))
        .await
        .unwrap();
    assert!(!hostile);
}

#[tokio::test]
async fn test_over_length_credentials_are_rejected_without_echo() {
    let catalog = catalog().await;
    let long_hash = "h".repeat(300);
    let err = catalog
        .users
        .validate_credentials(&Credential::new("ann", long_hash.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidParameter));
    assert!(!err.to_string().contains(&long_hash));
}

#[tokio::test]
async fn test_duplicate_username_fails_write_and_leaves_one_row() {
    let catalog = catalog().await;
    let first = catalog
        .users
        .create(NewUser::new("ann", "ann@example.com", HASH))
        .await
        .unwrap();
    let err = catalog
        .users
        .create(NewUser::new("ann", "other@example.com", "other-hash"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::WriteFailed));
    assert!(!err.to_string().contains("other-hash"));

    assert!(catalog
        .users
        .validate_credentials(&Credential::new("ann", HASH))
        .await
        .unwrap());
    assert_eq!(catalog.users.find_by_id(first.id + 1).await.unwrap(), None);
}

#[tokio::test]
async fn test_invalid_user_draft_is_validation_error() {
    let catalog = catalog().await;
    let err = catalog
        .users
        .create(NewUser::new("ann", "not-an-email", HASH))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
    assert!(err.is_client_error());
    assert!(!err.to_string().contains(HASH));
}

#[test]
fn test_new_user_deserializes_camel_case_hash() {
    let draft: NewUser = serde_json::from_str(
        r#"{"username":"ann","email":"ann@example.com","passwordHash":"h1"}"#,
    )
    .unwrap();
    assert_eq!(draft.password_hash.expose(), "h1");
    assert_eq!(draft.role, None);
}
