pub mod eligibility;
pub mod item_service;
pub mod models;
pub mod redemption_service;

// Re-exports for shorter import paths
pub use eligibility::EligibilitySnapshot;
pub use item_service::RedemptionItemService;
pub use models::*;
pub use redemption_service::RedemptionService;
