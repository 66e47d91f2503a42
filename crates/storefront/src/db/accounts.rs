//! Account repository: users, password hashes and address books.

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use afrovibz_core::{AddressId, Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::{Address, AddressInput, User};

struct Account {
    user: User,
    password_hash: String,
    addresses: Vec<Address>,
}

struct AccountTable {
    accounts: Vec<Account>,
    next_user_id: UserId,
    next_address_id: AddressId,
}

impl AccountTable {
    fn account_mut(&mut self, user_id: UserId) -> Result<&mut Account, RepositoryError> {
        self.accounts
            .iter_mut()
            .find(|a| a.user.id == user_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {user_id}")))
    }
}

/// Repository for user accounts.
pub struct AccountRepository {
    table: RwLock<AccountTable>,
}

impl Default for AccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(AccountTable {
                accounts: Vec::new(),
                next_user_id: UserId::new(1),
                next_address_id: AddressId::new(1),
            }),
        }
    }

    /// Create a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    #[instrument(skip(self, password_hash), fields(email = %email))]
    pub async fn create(
        &self,
        email: Email,
        name: &str,
        role: UserRole,
        password_hash: String,
    ) -> Result<User, RepositoryError> {
        let mut table = self.table.write().await;
        if table.accounts.iter().any(|a| a.user.email == email) {
            return Err(RepositoryError::Conflict(format!(
                "email {email} already registered"
            )));
        }

        let user = User {
            id: table.next_user_id,
            email,
            name: name.trim().to_string(),
            role,
            created_at: Utc::now(),
        };
        table.next_user_id = user.id.next();
        table.accounts.push(Account {
            user: user.clone(),
            password_hash,
            addresses: Vec::new(),
        });

        tracing::info!(user_id = %user.id, %role, "User created");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: UserId) -> Option<User> {
        let table = self.table.read().await;
        table
            .accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
    }

    /// Get a user and their password hash by email.
    pub async fn get_password_hash(&self, email: &Email) -> Option<(User, String)> {
        let table = self.table.read().await;
        table
            .accounts
            .iter()
            .find(|a| &a.user.email == email)
            .map(|a| (a.user.clone(), a.password_hash.clone()))
    }

    /// All users, in registration order.
    pub async fn list_users(&self) -> Vec<User> {
        let table = self.table.read().await;
        table.accounts.iter().map(|a| a.user.clone()).collect()
    }

    /// A user's saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn addresses(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let table = self.table.read().await;
        let account = table
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {user_id}")))?;

        let mut addresses = account.addresses.clone();
        addresses.sort_by_key(|a| !a.is_default);
        Ok(addresses)
    }

    /// One of a user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or address does not exist.
    pub async fn address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Address, RepositoryError> {
        self.addresses(user_id)
            .await?
            .into_iter()
            .find(|a| a.id == address_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("address {address_id}")))
    }

    /// Save a new address. The first address saved becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if a street field is missing.
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self, input))]
    pub async fn add_address(
        &self,
        user_id: UserId,
        input: AddressInput,
    ) -> Result<Address, RepositoryError> {
        input.validate(true).map_err(RepositoryError::Validation)?;

        let mut table = self.table.write().await;
        let id = table.next_address_id;
        let account = table.account_mut(user_id)?;

        let mut address = input.into_address(id);
        if account.addresses.is_empty() {
            address.is_default = true;
        }
        if address.is_default {
            for existing in &mut account.addresses {
                existing.is_default = false;
            }
        }
        account.addresses.push(address.clone());
        table.next_address_id = id.next();
        Ok(address)
    }

    /// Delete a saved address.
    ///
    /// When the default is removed the oldest remaining address takes over.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or address does not exist.
    #[instrument(skip(self))]
    pub async fn delete_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        let account = table.account_mut(user_id)?;

        let index = account
            .addresses
            .iter()
            .position(|a| a.id == address_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("address {address_id}")))?;
        let removed = account.addresses.remove(index);

        if removed.is_default
            && let Some(first) = account.addresses.first_mut()
        {
            first.is_default = true;
        }
        Ok(())
    }

    /// Make one address the default, clearing the flag on the others.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or address does not exist.
    #[instrument(skip(self))]
    pub async fn set_default_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Address, RepositoryError> {
        let mut table = self.table.write().await;
        let account = table.account_mut(user_id)?;

        if !account.addresses.iter().any(|a| a.id == address_id) {
            return Err(RepositoryError::NotFound(format!("address {address_id}")));
        }

        let mut chosen = None;
        for address in &mut account.addresses {
            address.is_default = address.id == address_id;
            if address.is_default {
                chosen = Some(address.clone());
            }
        }
        chosen.ok_or_else(|| RepositoryError::NotFound(format!("address {address_id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(name: &str) -> AddressInput {
        AddressInput {
            full_name: name.to_string(),
            phone: "+234 800 000 0000".to_string(),
            line1: "5 Admiralty Way".to_string(),
            city: "Lagos".to_string(),
            region: "Lagos".to_string(),
            country: "Nigeria".to_string(),
            ..AddressInput::default()
        }
    }

    async fn repo_with_user() -> (AccountRepository, User) {
        let repo = AccountRepository::new();
        let user = repo
            .create(
                Email::parse("tola@example.com").unwrap(),
                "Tola",
                UserRole::Customer,
                "hash".to_string(),
            )
            .await
            .unwrap();
        (repo, user)
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (repo, _) = repo_with_user().await;
        let err = repo
            .create(
                Email::parse("TOLA@example.com").unwrap(),
                "Other",
                UserRole::Customer,
                "hash".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_get_password_hash() {
        let (repo, user) = repo_with_user().await;
        let (found, hash) = repo.get_password_hash(&user.email).await.unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(hash, "hash");
        assert!(
            repo.get_password_hash(&Email::parse("nobody@example.com").unwrap())
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_first_address_becomes_default() {
        let (repo, user) = repo_with_user().await;
        let first = repo.add_address(user.id, address("Home")).await.unwrap();
        let second = repo.add_address(user.id, address("Office")).await.unwrap();
        assert!(first.is_default);
        assert!(!second.is_default);
    }

    #[tokio::test]
    async fn test_single_default_address() {
        let (repo, user) = repo_with_user().await;
        repo.add_address(user.id, address("Home")).await.unwrap();
        let office = repo.add_address(user.id, address("Office")).await.unwrap();

        repo.set_default_address(user.id, office.id).await.unwrap();
        let addresses = repo.addresses(user.id).await.unwrap();
        assert_eq!(addresses.iter().filter(|a| a.is_default).count(), 1);
        assert_eq!(addresses.first().unwrap().id, office.id);
    }

    #[tokio::test]
    async fn test_deleting_default_promotes_next() {
        let (repo, user) = repo_with_user().await;
        let home = repo.add_address(user.id, address("Home")).await.unwrap();
        let office = repo.add_address(user.id, address("Office")).await.unwrap();

        repo.delete_address(user.id, home.id).await.unwrap();
        let remaining = repo.address(user.id, office.id).await.unwrap();
        assert!(remaining.is_default);
    }

    #[tokio::test]
    async fn test_address_requires_street() {
        let (repo, user) = repo_with_user().await;
        let mut input = address("Home");
        input.line1 = String::new();
        assert!(matches!(
            repo.add_address(user.id, input).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_addresses_are_per_user() {
        let (repo, user) = repo_with_user().await;
        let other = repo
            .create(
                Email::parse("kofi@example.com").unwrap(),
                "Kofi",
                UserRole::Customer,
                "hash".to_string(),
            )
            .await
            .unwrap();
        let home = repo.add_address(user.id, address("Home")).await.unwrap();

        assert!(repo.address(other.id, home.id).await.is_err());
        assert!(repo.delete_address(other.id, home.id).await.is_err());
    }
}
