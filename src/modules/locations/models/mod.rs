mod location;

pub use location::{Location, LocationFilter, NewLocation};
