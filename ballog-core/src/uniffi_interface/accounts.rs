use std::sync::Arc;

use log::debug;

use crate::account::{Account, AccountDirectory, LocalAccountStore, Registration};
use crate::runtime::global_runtime;
use crate::uniffi_interface::errors::BallogError;

/// Local account store handle for the app's sign-in and sign-up screens.
#[derive(uniffi::Object)]
pub struct AccountService {
    store: LocalAccountStore,
}

#[uniffi::export]
impl AccountService {
    #[uniffi::constructor]
    pub fn open(db_path: String) -> Result<Arc<Self>, BallogError> {
        debug!("Opening account store at {}", db_path);
        let store = global_runtime().block_on(LocalAccountStore::open(&db_path))?;
        Ok(Arc::new(Self { store }))
    }

    pub fn create_account(&self, registration: Registration) -> Result<Account, BallogError> {
        Ok(global_runtime().block_on(self.store.create_account(&registration))?)
    }

    pub fn fetch_account(&self, username: String) -> Option<Account> {
        global_runtime().block_on(self.store.fetch_account(&username))
    }

    pub fn authenticate(
        &self,
        username: String,
        password: String,
    ) -> Result<Option<Account>, BallogError> {
        Ok(global_runtime().block_on(self.store.authenticate(&username, &password))?)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>, BallogError> {
        Ok(global_runtime().block_on(self.store.list_accounts())?)
    }

    pub fn delete_account(&self, username: String) -> Result<bool, BallogError> {
        Ok(global_runtime().block_on(self.store.delete_account(&username))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::IN_MEMORY_DATABASE;

    #[test]
    fn open_runs_migrations() {
        let service = AccountService::open(IN_MEMORY_DATABASE.to_string()).unwrap();
        assert!(service.list_accounts().unwrap().is_empty());
        assert!(service.fetch_account("anyone".into()).is_none());
    }

    #[test]
    fn sign_up_then_sign_in() {
        let store = global_runtime()
            .block_on(LocalAccountStore::open(IN_MEMORY_DATABASE))
            .unwrap()
            .with_hash_cost(4);
        let service = AccountService { store };
        let account = service
            .create_account(Registration {
                username: "captain".into(),
                password: "armband".into(),
                email: "captain@ballog.app".into(),
                is_admin: true,
            })
            .unwrap();
        assert!(account.is_admin);
        assert_eq!(
            service
                .authenticate("captain".into(), "armband".into())
                .unwrap(),
            Some(account)
        );
        assert!(service.fetch_account("captain".into()).is_some());
        assert!(service.delete_account("captain".into()).unwrap());
        assert!(service.list_accounts().unwrap().is_empty());
    }
}
