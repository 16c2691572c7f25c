pub mod client;
pub mod models;

#[cfg(test)]
pub mod testing;
