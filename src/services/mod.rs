pub mod favorites;
pub mod projects;
