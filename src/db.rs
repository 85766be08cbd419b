pub mod costs_repo;
pub use costs_repo::CostRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod schedule_repo;
pub use schedule_repo::ScheduleRepository;
pub mod billing_repo;
pub use billing_repo::BillingRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
