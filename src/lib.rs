pub mod cache;
pub mod controller;
pub mod debounce;
pub mod domain;
pub mod export;
pub mod fields;
pub mod filter;
pub mod model;
pub mod pager;
pub mod prompt;
pub mod sort;
pub mod store;
pub mod ui;
pub mod view;
