pub mod status_api;
