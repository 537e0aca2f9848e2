//! Neighbor lists for atoms in fully periodic systems.
//!
//! Two builders are provided: [`compute_distances`] produces a dense tensor
//! of distances between all atoms and their periodic images, queried with
//! [`query_neighbors`]; while [`compute_oneway`] and
//! [`compute_oneway_cell_list`] produce a sparse list where each pair of atoms
//! appears only once. All builders share the same [`NeighborOptions`].
#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::must_use_candidate, clippy::comparison_chain)]
#![allow(clippy::redundant_field_names, clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unreadable_literal, clippy::option_if_let_else, clippy::range_plus_one)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::cast_sign_loss)]
#![allow(clippy::default_trait_access, clippy::neg_cmp_op_on_partial_ord)]

// Tests lints
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod types;
pub use types::*;

mod errors;
pub use self::errors::Error;

mod cell;
pub use self::cell::{UnitCell, CellShape};

mod options;
pub use self::options::NeighborOptions;

pub mod neighbors;
pub use self::neighbors::{CellShift, Pair, ImageDistances, OneWayNeighbors};
pub use self::neighbors::{compute_distances, query_neighbors};
pub use self::neighbors::{compute_oneway, compute_oneway_cell_list};

#[cfg(test)]
pub(crate) mod test_utils;
