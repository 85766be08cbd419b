pub mod costs;
pub mod catalog;
pub mod visits;
pub mod receipts;
pub mod expenses;
pub mod settings;
pub mod reports;
