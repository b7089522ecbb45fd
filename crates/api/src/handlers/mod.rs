pub mod assets;
pub mod audit;
pub mod custody;
pub mod dashboard;
pub mod imports;
pub mod scan;
pub mod users;
