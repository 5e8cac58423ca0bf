pub mod datetime;
pub mod markup;
pub mod theme;
pub mod url;
