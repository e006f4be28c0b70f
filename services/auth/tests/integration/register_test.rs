use tokio_util::sync::CancellationToken;

use portier_auth::error::{AuthServiceError, IdentityField};
use portier_auth::usecase::user::{RegisterUserInput, RegisterUserUseCase};
use portier_domain::id::RoleId;

use crate::helpers::{FakeHasher, MockCredentialStore};

fn candidate() -> RegisterUserInput {
    RegisterUserInput {
        username: "newuser".to_owned(),
        first_name: "Jane".to_owned(),
        last_name: "Roe".to_owned(),
        email: "jane.roe@example.com".to_owned(),
        mobile_number: "09121112233".to_owned(),
        password: "hunter22".to_owned(),
    }
}

#[tokio::test]
async fn should_create_user_with_default_role_and_hashed_password() {
    let store = MockCredentialStore {
        default_role: 3,
        ..MockCredentialStore::empty()
    };
    let created = store.created_handle();
    let usecase = RegisterUserUseCase {
        credentials: store,
        hasher: FakeHasher,
    };

    let user = usecase
        .execute(candidate(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(user.username, "newuser");
    assert_eq!(user.roles.len(), 1);
    assert_eq!(user.roles[0].role_id, RoleId(3));

    let created = created.lock().unwrap();
    assert_eq!(created.len(), 1, "expected exactly one user to be created");
    assert_eq!(created[0].password_hash, "hashed:hunter22");
    assert_eq!(created[0].mobile_number, "09121112233");
}

#[tokio::test]
async fn should_reject_each_duplicate_identity_without_creating() {
    let cases = [
        (
            MockCredentialStore {
                taken_mobile_numbers: vec!["09121112233".to_owned()],
                ..MockCredentialStore::empty()
            },
            IdentityField::MobileNumber,
        ),
        (
            MockCredentialStore {
                taken_usernames: vec!["newuser".to_owned()],
                ..MockCredentialStore::empty()
            },
            IdentityField::Username,
        ),
        (
            MockCredentialStore {
                taken_emails: vec!["jane.roe@example.com".to_owned()],
                ..MockCredentialStore::empty()
            },
            IdentityField::Email,
        ),
    ];

    for (store, expected) in cases {
        let created = store.created_handle();
        let usecase = RegisterUserUseCase {
            credentials: store,
            hasher: FakeHasher,
        };

        let result = usecase.execute(candidate(), &CancellationToken::new()).await;

        assert!(
            matches!(result, Err(AuthServiceError::DuplicateIdentity(field)) if field == expected),
            "expected DuplicateIdentity({expected}), got {result:?}"
        );
        assert!(created.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn should_fail_fast_on_duplicate_while_other_checks_pending() {
    let store = MockCredentialStore {
        taken_mobile_numbers: vec!["09121112233".to_owned()],
        hang_username_check: true,
        ..MockCredentialStore::empty()
    };
    let usecase = RegisterUserUseCase {
        credentials: store,
        hasher: FakeHasher,
    };

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        usecase.execute(candidate(), &CancellationToken::new()),
    )
    .await
    .expect("registration should not wait for the pending username check");

    assert!(matches!(
        result,
        Err(AuthServiceError::DuplicateIdentity(IdentityField::MobileNumber))
    ));
}

#[tokio::test]
async fn should_propagate_store_error_from_existence_check() {
    let store = MockCredentialStore {
        exists_error: Some("connection reset".to_owned()),
        ..MockCredentialStore::empty()
    };
    let created = store.created_handle();
    let usecase = RegisterUserUseCase {
        credentials: store,
        hasher: FakeHasher,
    };

    let err = usecase
        .execute(candidate(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "connection reset");
    assert!(created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_not_create_when_canceled_before_checks_finish() {
    let store = MockCredentialStore {
        hang_username_check: true,
        ..MockCredentialStore::empty()
    };
    let created = store.created_handle();
    let usecase = RegisterUserUseCase {
        credentials: store,
        hasher: FakeHasher,
    };

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = usecase.execute(candidate(), &cancel).await;

    assert!(matches!(result, Err(AuthServiceError::Canceled)));
    assert!(created.lock().unwrap().is_empty());
}
