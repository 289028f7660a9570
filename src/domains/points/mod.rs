pub mod models;
pub mod point_service;
pub mod publish_points;
pub mod view_points;

// Re-exports for shorter import paths
pub use models::*;
pub use point_service::PointService;
pub use publish_points::award_publish_points;
pub use view_points::ViewPointService;
