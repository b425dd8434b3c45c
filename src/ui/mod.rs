/// Presentation layer: renders the filter widgets and the prepared views.
/// Holds no behaviour of its own beyond displaying what it is given.

pub mod panels;
pub mod plot;
