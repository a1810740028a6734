//! Strata: immersive block space navigator. Runs the block_space app.

use bevy::prelude::*;
use block_space::sdk::NavigatorBuilder;

fn main() -> AppExit {
    let _ = dotenvy::dotenv();
    NavigatorBuilder::new().build().run()
}
