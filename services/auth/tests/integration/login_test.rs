use chrono::Utc;
use tokio_util::sync::CancellationToken;

use portier_auth::error::AuthServiceError;
use portier_auth::usecase::token::{LoginInput, LoginUseCase, TokenIssuer};

use crate::helpers::{MockCredentialStore, TEST_PASSWORD, test_jwt_config, test_user};

fn login_input(identifier: &str, password: &str) -> LoginInput {
    LoginInput {
        identifier: identifier.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn should_issue_token_pair_for_valid_credentials() {
    let user = test_user();
    let tokens = TokenIssuer::new(test_jwt_config());
    let usecase = LoginUseCase {
        credentials: MockCredentialStore::with_user(user.clone(), TEST_PASSWORD),
        tokens: tokens.clone(),
    };

    let detail = usecase
        .execute(
            login_input("testuser", TEST_PASSWORD),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!detail.access_token.is_empty());
    assert!(!detail.refresh_token.is_empty());
    assert!(detail.refresh_token_exp > detail.access_token_exp);

    let claims = tokens.validate_access_token(&detail.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.username, "testuser");
    assert_eq!(claims.roles, vec!["user"]);

    let refresh_claims = tokens.validate_refresh_token(&detail.refresh_token).unwrap();
    assert_eq!(refresh_claims.sub, user.id.to_string());
}

#[tokio::test]
async fn should_apply_access_and_refresh_ttls_from_login_time() {
    let usecase = LoginUseCase {
        credentials: MockCredentialStore::with_user(test_user(), TEST_PASSWORD),
        tokens: TokenIssuer::new(test_jwt_config()),
    };

    let before = Utc::now().timestamp() as u64;
    let detail = usecase
        .execute(
            login_input("testuser", TEST_PASSWORD),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let after = Utc::now().timestamp() as u64;

    assert!((before + 15 * 60..=after + 15 * 60).contains(&detail.access_token_exp));
    assert!((before + 24 * 60 * 60..=after + 24 * 60 * 60).contains(&detail.refresh_token_exp));
    assert_eq!(
        detail.refresh_token_exp - detail.access_token_exp,
        24 * 60 * 60 - 15 * 60
    );
}

#[tokio::test]
async fn should_surface_store_error_verbatim() {
    let usecase = LoginUseCase {
        credentials: MockCredentialStore::failing_fetch("user not found"),
        tokens: TokenIssuer::new(test_jwt_config()),
    };

    let result = usecase
        .execute(
            login_input("invaliduser", "invalidpass"),
            &CancellationToken::new(),
        )
        .await;

    let err = result.expect_err("expected error, got token detail");
    assert_eq!(err.to_string(), "user not found");
}

#[tokio::test]
async fn should_not_distinguish_wrong_password_from_unknown_user() {
    let usecase = LoginUseCase {
        credentials: MockCredentialStore::with_user(test_user(), TEST_PASSWORD),
        tokens: TokenIssuer::new(test_jwt_config()),
    };

    let wrong_password = usecase
        .execute(login_input("testuser", "nope"), &CancellationToken::new())
        .await
        .unwrap_err();
    let unknown_user = usecase
        .execute(
            login_input("nobody", TEST_PASSWORD),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthServiceError::CredentialNotFound));
    assert!(matches!(unknown_user, AuthServiceError::CredentialNotFound));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn should_abandon_lookup_when_canceled() {
    let usecase = LoginUseCase {
        credentials: MockCredentialStore {
            hang_fetch: true,
            ..MockCredentialStore::with_user(test_user(), TEST_PASSWORD)
        },
        tokens: TokenIssuer::new(test_jwt_config()),
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let result = usecase
        .execute(login_input("testuser", TEST_PASSWORD), &cancel)
        .await;
    assert!(
        matches!(result, Err(AuthServiceError::Canceled)),
        "expected Canceled, got {result:?}"
    );
}
