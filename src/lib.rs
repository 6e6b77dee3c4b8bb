pub mod cli;
pub mod clock;
pub mod currency;
pub mod database;
pub mod expenses;
pub mod models;
pub mod repos;
pub mod reports;
pub mod trips;

#[cfg(test)]
mod test_support;
