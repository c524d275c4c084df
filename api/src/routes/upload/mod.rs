pub mod upload_request;
pub mod upload_route;
