pub mod health_route;
pub mod query;
pub mod study;
pub mod upload;
pub mod voice;
