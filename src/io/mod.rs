pub mod excel_read;
pub mod excel_write;
pub mod fixture;
pub mod json;
pub mod nominatim;
