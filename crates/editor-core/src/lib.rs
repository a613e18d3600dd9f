pub mod buffer;
pub mod cpp;
pub mod cursor;
pub mod errors;
pub mod highlight;
pub mod history;
pub mod indent;
pub mod search;
