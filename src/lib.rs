pub mod api;
pub mod cli;
pub mod db;

pub fn banner() -> &'static str {
    "Leadgress lead capture service"
}
