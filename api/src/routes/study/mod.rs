pub mod mcq_route;
pub mod qa_route;
pub mod study_request;
pub mod summary_route;
