pub mod chunker;
pub mod config;
pub mod db;
pub mod embed;
pub mod event;
pub mod finder;
pub mod fnv;
pub mod hook;
pub mod ids;
pub mod indexer;
pub mod pane_context;
pub mod sparse;
pub mod store;
pub mod transcript;
pub mod transition;
pub mod turns;
pub mod vectorstore;
