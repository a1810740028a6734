//! Minimal prelude for SDK consumers.

pub use crate::config::{block_source, BlockSource, NavigatorConfig};
pub use crate::data::{BlockSummary, ChainFetcher, FetcherConfig};
pub use crate::geometry::{BoundingVolume, Ray};
pub use crate::layout::{LayoutStrategy, PackStrategy, PackerSettings, ReferenceRange};
pub use crate::navigation::{NavigationController, NavigationSettings, NavigationState, Phase};
pub use crate::picking::{GazeState, Selection};
pub use crate::render::{BlockRenderer, GlassCubeRenderer, GlassCubeSettings};
pub use crate::sdk::NavigatorBuilder;
