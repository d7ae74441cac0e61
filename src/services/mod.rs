pub mod connection_registry;
pub mod image_service;
pub mod nearby_search;
pub mod reaction_service;
pub mod seed_service;
pub mod token_service;
pub mod trash_can_service;
pub mod user_service;
