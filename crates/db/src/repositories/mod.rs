//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod backup_repo;
pub mod borrow_request_repo;
pub mod contact_message_repo;
pub mod dashboard_repo;
pub mod item_repo;
pub mod notification_repo;
pub mod review_repo;
pub mod role_repo;
pub mod session_repo;
pub mod settings_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use backup_repo::BackupRepo;
pub use borrow_request_repo::BorrowRequestRepo;
pub use contact_message_repo::ContactMessageRepo;
pub use dashboard_repo::DashboardRepo;
pub use item_repo::ItemRepo;
pub use notification_repo::NotificationRepo;
pub use review_repo::ReviewRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use settings_repo::SettingsRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
