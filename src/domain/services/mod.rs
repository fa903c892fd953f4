pub mod assignment_service;
pub mod auth_service;
pub mod export_service;
pub mod import_service;
pub mod reconcile;
pub mod validation;
