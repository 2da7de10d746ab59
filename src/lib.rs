//! Flashio reads the output of block-structured simulation codes (currently
//! FLASH plot and checkpoint snapshots) into time-ordered series of records.
//! Each snapshot yields a field record of halo-extended block arrays, whose
//! guard cells are filled from neighboring blocks or from the domain
//! boundary conditions, a record of named scalars, and a record of metadata
//! tables. The first snapshot of a run also yields the grid geometry and the
//! run-wide parameters. Series are indexed by time, by position, or by
//! ranges of either, and can be viewed attribute-wise as stacked arrays or
//! as columns of values.

pub mod adjacency;
pub mod array;
pub mod block_array;
pub mod boundary;
pub mod dataset;
pub mod error;
pub mod halo;
pub mod index_space;
pub mod key_index;
pub mod names;
pub mod record;
pub mod select;
pub mod series;
pub mod snapshot;
pub mod view;

pub use dataset::{DataPath, DatasetOptions, SimulationDataset};
pub use error::{Error, Result};
pub use series::{Keyed, SortedSeries};
