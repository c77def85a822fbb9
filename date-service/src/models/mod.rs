pub mod date_record;

pub use date_record::DateRecord;
