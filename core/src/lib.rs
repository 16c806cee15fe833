//! Risk entity loader: exposures, impact functions, measures and discount
//! rates read from spreadsheet workbooks or MAT files into one `Entity`.

pub mod config;
pub mod discounts;
pub mod entity;
pub mod error;
pub mod exposures;
pub mod impact_funcs;
pub mod loader;
pub mod measures;
pub mod source;
pub mod tag;

pub use entity::{Entity, SubEntity};
pub use error::{EntityError, EntityResult};
pub use loader::{Diagnostic, Loader, SourceFormat};
