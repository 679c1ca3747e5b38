pub mod chat {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod resolver;
    pub mod handle;
    pub mod service;
    pub mod route;
}
pub mod realtime;
pub mod translation;
