pub mod copy;
pub mod fetch;
pub mod plugins;
