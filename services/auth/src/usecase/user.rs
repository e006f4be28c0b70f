use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use portier_domain::user::{NewUser, RoleAssignment, User};

use crate::domain::repository::{CredentialStore, PasswordHasher};
use crate::error::{AuthServiceError, IdentityField};
use crate::usecase::cancellable;

pub struct RegisterUserInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub password: String,
}

pub struct RegisterUserUseCase<S: CredentialStore, H: PasswordHasher> {
    pub credentials: S,
    pub hasher: H,
}

fn unique(field: IdentityField, exists: bool) -> Result<(), AuthServiceError> {
    if exists {
        warn!(field = %field, "registration rejected: duplicate identity");
        return Err(AuthServiceError::DuplicateIdentity(field));
    }
    Ok(())
}

impl<S: CredentialStore, H: PasswordHasher> RegisterUserUseCase<S, H> {
    /// Create a user with the default role once mobile number, username and
    /// email are all free. The three checks run concurrently; the first
    /// duplicate (or store error) aborts the rest and nothing is created.
    pub async fn execute(
        &self,
        input: RegisterUserInput,
        cancel: &CancellationToken,
    ) -> Result<User, AuthServiceError> {
        let mobile = async {
            let exists = self
                .credentials
                .exists_mobile_number(&input.mobile_number)
                .await?;
            unique(IdentityField::MobileNumber, exists)
        };
        let username = async {
            let exists = self.credentials.exists_username(&input.username).await?;
            unique(IdentityField::Username, exists)
        };
        let email = async {
            let exists = self.credentials.exists_email(&input.email).await?;
            unique(IdentityField::Email, exists)
        };
        cancellable(cancel, async {
            tokio::try_join!(mobile, username, email)?;
            Ok::<(), AuthServiceError>(())
        })
        .await?;

        let password_hash = cancellable(cancel, self.hasher.hash(&input.password)).await?;
        let role_id = cancellable(cancel, self.credentials.get_default_role()).await?;

        let candidate = NewUser {
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            mobile_number: input.mobile_number,
            password_hash,
            roles: vec![RoleAssignment::new(role_id)],
        };
        let user = cancellable(cancel, self.credentials.create_user(&candidate)).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}
