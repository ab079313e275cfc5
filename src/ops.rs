pub mod blocking;
pub mod materialize;
