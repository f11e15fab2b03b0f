pub mod error;
pub mod models {
    pub mod document;
    pub mod search;
}
pub mod db {
    pub mod corpus;
    pub mod index;
}
pub mod search {
    pub mod backend;
    pub mod coordinator;
    pub mod fallback;
    pub mod filter;
    pub mod indexed;
    pub mod query;
    pub mod ranking;
}

#[cfg(feature = "server")]
pub mod api {
    pub mod errors;
    pub mod search;
}
#[cfg(feature = "server")]
pub mod app;
#[cfg(feature = "server")]
pub mod config;
