use crate::{
    domain::{Customer, CustomerId, Shop, Task, TaskId, Ticket, TicketId, User, UserId},
    error::{InfofixError, Result},
    storage::{CustomerStore, Storage, TaskStore, TicketStore, UserStore},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// File-based storage: one pretty-printed JSON file per record
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".infofix";
    const TICKETS_DIR: &'static str = "tickets";
    const TASKS_DIR: &'static str = "tasks";
    const USERS_DIR: &'static str = "users";
    const CUSTOMERS_DIR: &'static str = "customers";
    const SHOP_FILE: &'static str = "shop.json";

    /// Creates a new FileStorage instance rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().join(Self::DATA_DIR),
        }
    }

    fn dir(&self, name: &str) -> PathBuf {
        self.root_path.join(name)
    }

    fn shop_file(&self) -> PathBuf {
        self.root_path.join(Self::SHOP_FILE)
    }

    /// Record keys are escaped byte-wise so distinct keys never share a file:
    /// ASCII letters, digits and `-` pass through, anything else becomes `_XX`.
    fn record_file(&self, dir: &str, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{:02X}", byte));
            }
        }
        self.dir(dir).join(format!("{}.json", name))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_record<T: Serialize + Sync>(
        &self,
        dir: &str,
        key: &str,
        value: &T,
    ) -> Result<()> {
        self.ensure_directory_exists(&self.dir(dir)).await?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.record_file(dir, key), json).await?;
        Ok(())
    }

    async fn read_record<T: DeserializeOwned>(&self, dir: &str, key: &str) -> Result<Option<T>> {
        let path = self.record_file(dir, key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn remove_record(&self, dir: &str, key: &str) -> Result<bool> {
        let path = self.record_file(dir, key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).await?;
        Ok(true)
    }

    /// Reads every record in a directory, skipping files that fail to parse
    async fn read_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>> {
        let dir_path = self.dir(dir);
        if !dir_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir_path).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            match serde_json::from_str(&contents) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl TicketStore for FileStorage {
    async fn save_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.write_record(Self::TICKETS_DIR, ticket.id.as_str(), ticket)
            .await
    }

    async fn load_ticket(&self, id: &TicketId) -> Result<Ticket> {
        self.read_record(Self::TICKETS_DIR, id.as_str())
            .await?
            .ok_or_else(|| InfofixError::TicketNotFound(id.to_string()))
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = self.read_all(Self::TICKETS_DIR).await?;
        tickets.sort_by_key(|t| t.id.number());
        Ok(tickets)
    }

    async fn search_tickets(&self, query: &str) -> Result<Vec<Ticket>> {
        let query_lower = query.to_lowercase();
        let tickets = self.list_tickets().await?;

        Ok(tickets
            .into_iter()
            .filter(|t| {
                t.customer_name.to_lowercase().contains(&query_lower)
                    || t.issue.to_lowercase().contains(&query_lower)
                    || t.device.brand.to_lowercase().contains(&query_lower)
                    || t.device.model.to_lowercase().contains(&query_lower)
                    || t
                        .device
                        .serial
                        .as_ref()
                        .map(|s| s.to_lowercase().contains(&query_lower))
                        .unwrap_or(false)
            })
            .collect())
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<()> {
        if self.remove_record(Self::TICKETS_DIR, id.as_str()).await? {
            Ok(())
        } else {
            Err(InfofixError::TicketNotFound(id.to_string()))
        }
    }
}

#[async_trait]
impl TaskStore for FileStorage {
    async fn save_task(&self, task: &Task) -> Result<()> {
        self.write_record(Self::TASKS_DIR, &task.id.to_string(), task)
            .await
    }

    async fn load_task(&self, id: &TaskId) -> Result<Task> {
        self.read_record(Self::TASKS_DIR, &id.to_string())
            .await?
            .ok_or_else(|| InfofixError::TaskNotFound(id.to_string()))
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.read_all(Self::TASKS_DIR).await?;
        tasks.sort_by_key(|t| t.due_at);
        Ok(tasks)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        if self.remove_record(Self::TASKS_DIR, &id.to_string()).await? {
            Ok(())
        } else {
            Err(InfofixError::TaskNotFound(id.to_string()))
        }
    }
}

#[async_trait]
impl UserStore for FileStorage {
    async fn save_user(&self, user: &User) -> Result<()> {
        self.write_record(Self::USERS_DIR, user.id.as_str(), user)
            .await
    }

    async fn load_user(&self, id: &UserId) -> Result<User> {
        self.read_record(Self::USERS_DIR, id.as_str())
            .await?
            .ok_or_else(|| InfofixError::UserNotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.read_all(Self::USERS_DIR).await?;
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}

#[async_trait]
impl CustomerStore for FileStorage {
    async fn save_customer(&self, customer: &Customer) -> Result<()> {
        self.write_record(Self::CUSTOMERS_DIR, &customer.id.to_string(), customer)
            .await
    }

    async fn load_customer(&self, id: &CustomerId) -> Result<Customer> {
        self.read_record(Self::CUSTOMERS_DIR, &id.to_string())
            .await?
            .ok_or_else(|| InfofixError::CustomerNotFound(id.to_string()))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let mut customers: Vec<Customer> = self.read_all(Self::CUSTOMERS_DIR).await?;
        customers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(customers)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        for dir in [
            Self::TICKETS_DIR,
            Self::TASKS_DIR,
            Self::USERS_DIR,
            Self::CUSTOMERS_DIR,
        ] {
            self.ensure_directory_exists(&self.dir(dir)).await?;
        }

        if !self.shop_file().exists() {
            self.save_shop(&Shop::default()).await?;
        }

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Customer data\n*\n").await?;
        }

        Ok(())
    }

    async fn load_shop(&self) -> Result<Shop> {
        let shop_file = self.shop_file();
        if !shop_file.exists() {
            return Err(InfofixError::ShopNotInitialized);
        }

        let contents = fs::read_to_string(&shop_file).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save_shop(&self, shop: &Shop) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        let json = serde_json::to_string_pretty(shop)?;
        fs::write(self.shop_file(), json).await?;
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.shop_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Device, Role, TicketStatus};
    use tempfile::TempDir;

    fn ticket(n: u32, customer: &str, model: &str) -> Ticket {
        Ticket::new(
            TicketId::new(n),
            CustomerId::new(),
            customer,
            Device::new("Laptop", "Dell", model),
            "Osu",
        )
    }

    async fn storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(!storage.is_initialized().await);
        assert!(matches!(
            storage.load_shop().await,
            Err(InfofixError::ShopNotInitialized)
        ));

        storage.initialize().await.unwrap();

        assert!(storage.is_initialized().await);
        assert!(storage.dir(FileStorage::TICKETS_DIR).exists());
        assert_eq!(storage.load_shop().await.unwrap().next_ticket_number, 1);
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_shop() {
        let (_dir, storage) = storage().await;
        let mut shop = storage.load_shop().await.unwrap();
        shop.next_ticket_id();
        storage.save_shop(&shop).await.unwrap();

        storage.initialize().await.unwrap();
        assert_eq!(storage.load_shop().await.unwrap().next_ticket_number, 2);
    }

    #[tokio::test]
    async fn test_ticket_save_load_delete() {
        let (_dir, storage) = storage().await;

        let mut t = ticket(1, "Ama", "XPS 13");
        t.status = TicketStatus::OnHold;
        t.hold_reason = Some("Awaiting Parts".to_string());
        storage.save_ticket(&t).await.unwrap();

        let loaded = storage.load_ticket(&t.id).await.unwrap();
        assert_eq!(loaded, t);

        storage.delete_ticket(&t.id).await.unwrap();
        assert!(matches!(
            storage.load_ticket(&t.id).await,
            Err(InfofixError::TicketNotFound(_))
        ));
        assert!(storage.delete_ticket(&t.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_tickets_numeric_order() {
        let (_dir, storage) = storage().await;
        for n in [10, 2, 1] {
            storage.save_ticket(&ticket(n, "A", "M")).await.unwrap();
        }

        let ids: Vec<u32> = storage
            .list_tickets()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id.number())
            .collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[tokio::test]
    async fn test_search_tickets() {
        let (_dir, storage) = storage().await;

        let mut t1 = ticket(1, "Kofi Annan", "Latitude 7490");
        t1.issue = "Keyboard not working".to_string();
        let mut t2 = ticket(2, "Abena", "Inspiron 15");
        t2.device.serial = Some("SN-ABC-123".to_string());

        storage.save_ticket(&t1).await.unwrap();
        storage.save_ticket(&t2).await.unwrap();

        assert_eq!(storage.search_tickets("KOFI").await.unwrap().len(), 1);
        assert_eq!(storage.search_tickets("keyboard").await.unwrap().len(), 1);
        assert_eq!(storage.search_tickets("abc-123").await.unwrap()[0].id, t2.id);
        assert_eq!(storage.search_tickets("lenovo").await.unwrap().len(), 0);
        assert_eq!(storage.search_tickets("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_records_are_skipped() {
        let (_dir, storage) = storage().await;
        storage.save_ticket(&ticket(1, "A", "M")).await.unwrap();
        fs::write(storage.dir(FileStorage::TICKETS_DIR).join("junk.json"), "{")
            .await
            .unwrap();

        assert_eq!(storage.list_tickets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tasks_round_trip() {
        let (_dir, storage) = storage().await;
        let now = chrono::Utc::now();

        let later = Task::new(
            "Later",
            now + chrono::Duration::hours(5),
            UserId::new("tech-1"),
            UserId::new("mgr-1"),
        );
        let sooner = Task::new("Sooner", now, UserId::new("tech-1"), UserId::new("mgr-1"));
        storage.save_task(&later).await.unwrap();
        storage.save_task(&sooner).await.unwrap();

        let tasks = storage.list_tasks().await.unwrap();
        assert_eq!(tasks[0].title, "Sooner");
        assert_eq!(storage.load_task(&later.id).await.unwrap(), later);

        storage.delete_task(&sooner.id).await.unwrap();
        assert_eq!(storage.list_tasks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_users_with_unusual_ids() {
        let (_dir, storage) = storage().await;
        let user = User::new("auth0|abc/def", "Esi", Role::Technician);
        storage.save_user(&user).await.unwrap();

        assert_eq!(storage.load_user(&user.id).await.unwrap(), user);
        assert!(matches!(
            storage.load_user(&UserId::new("missing")).await,
            Err(InfofixError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ids_differing_in_punctuation_stay_separate() {
        let (_dir, storage) = storage().await;
        let dotted = User::new("tech.1", "Alpha", Role::Technician);
        let underscored = User::new("tech_1", "Beta", Role::Admin);
        storage.save_user(&dotted).await.unwrap();
        storage.save_user(&underscored).await.unwrap();

        assert_eq!(storage.load_user(&dotted.id).await.unwrap(), dotted);
        assert_eq!(storage.load_user(&underscored.id).await.unwrap(), underscored);
        assert_eq!(storage.list_users().await.unwrap().len(), 2);
    }

    #[test]
    fn test_record_file_names() {
        let storage = FileStorage::new("/shop");
        let name = |key: &str| {
            storage
                .record_file(FileStorage::USERS_DIR, key)
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap()
        };

        assert_eq!(name("IFX12"), "IFX12.json");
        assert_eq!(name("mgr-1"), "mgr-1.json");
        assert_eq!(name("tech.1"), "tech_2E1.json");
        assert_eq!(name("tech_1"), "tech_5F1.json");
        assert_eq!(name("../x"), "_2E_2E_2Fx.json");
    }

    #[tokio::test]
    async fn test_customer_search() {
        let (_dir, storage) = storage().await;
        storage
            .save_customer(&Customer::new("Nana Yeboah", "0201112222"))
            .await
            .unwrap();
        storage
            .save_customer(&Customer::new("Akosua Frimpong", "0555000111"))
            .await
            .unwrap();

        let found = storage.search_customers("0555").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Akosua Frimpong");

        let all = storage.list_customers().await.unwrap();
        assert_eq!(all[0].name, "Akosua Frimpong");
    }
}
