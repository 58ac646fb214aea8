//! Navigation controller: Elm-style model/update/cmd loop that turns clicks
//! and committed history changes into renders.

pub mod controller;
pub mod model;
pub mod update;

#[cfg(test)]
mod test_properties;

pub use controller::{HeadlessController, NavigationController, ViewSnapshot};
pub use model::{NavCmd, NavModel, NavMsg};
