pub mod catalog;
pub mod collaborative;
pub mod content;
pub mod rating;
