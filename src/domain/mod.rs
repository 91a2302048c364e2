pub mod conglomerate;
pub mod name;
pub mod records;
pub mod request;
