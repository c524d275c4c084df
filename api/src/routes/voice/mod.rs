pub mod ws_event;
pub mod ws_route;
