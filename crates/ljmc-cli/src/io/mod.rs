pub mod report;
pub mod tables;
pub mod xyz;
