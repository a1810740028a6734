//! SDK entry points and builder for composing the navigator app.

use bevy::prelude::*;

use crate::config::{self, BlockSource, NavigatorConfig};
use crate::data::{
    init_demo_channel, init_fixture_channel, init_rpc_channel, BlockChannel, FetcherConfig,
};
use crate::layout::LayoutStrategy;
use crate::navigation::{navigation_plugin, NavigationController, NavigationSettings};
use crate::picking::{picking_plugin, GazePoller};
use crate::render::{BlockRenderer, GlassCubeRenderer, RendererResource};
use crate::scene::{scene_plugin, ActiveLayout};
use crate::ui::hud_plugin;

/// Builder for constructing a Strata app with customizable plugins.
pub struct NavigatorBuilder {
    source: Option<BlockSource>,
    config: Option<NavigatorConfig>,
    renderer: Option<Box<dyn BlockRenderer>>,
    layout: LayoutStrategy,
    navigation: NavigationSettings,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_hud: bool,
    enable_gaze: bool,
}

impl Default for NavigatorBuilder {
    fn default() -> Self {
        Self {
            source: None,
            config: None,
            renderer: None,
            layout: LayoutStrategy::default(),
            navigation: NavigationSettings::default(),
            window_title: "Strata".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::srgb(0.02, 0.02, 0.05),
            enable_hud: true,
            enable_gaze: true,
        }
    }
}

impl NavigatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit block source. Without one the source comes from the
    /// environment.
    pub fn source(mut self, source: BlockSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Shorthand for an RPC source.
    pub fn rpc(self, config: FetcherConfig) -> Self {
        self.source(BlockSource::Rpc(config))
    }

    /// Poll and tick rates. Without this they come from the environment.
    pub fn config(mut self, config: NavigatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Provide a custom block renderer implementation.
    pub fn renderer(mut self, renderer: impl BlockRenderer) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn layout(mut self, layout: LayoutStrategy) -> Self {
        self.layout = layout;
        self
    }

    /// Momentum tuning. `tick_interval` is overridden by the configured tick
    /// rate.
    pub fn navigation(mut self, settings: NavigationSettings) -> Self {
        self.navigation = settings;
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn disable_hud(mut self) -> Self {
        self.enable_hud = false;
        self
    }

    pub fn disable_gaze(mut self) -> Self {
        self.enable_gaze = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }));

        // Env is read after DefaultPlugins so config warnings reach the log.
        let config = navigator_config(self.config.unwrap_or_else(NavigatorConfig::from_env));
        let source = self.source.unwrap_or_else(config::block_source);
        let controller = navigation_controller(self.navigation, config.momentum_tick_hz);
        let renderer = self
            .renderer
            .unwrap_or_else(|| Box::new(GlassCubeRenderer::default()));

        app.insert_resource(ClearColor(self.clear_color))
            .insert_resource(block_channel(source))
            .insert_resource(Time::<Fixed>::from_hz(config.momentum_tick_hz))
            .insert_resource(controller)
            .insert_resource(ActiveLayout(self.layout))
            .add_plugins((scene_plugin, navigation_plugin, picking_plugin));

        renderer.setup(&mut app);
        app.insert_resource(RendererResource(renderer));

        if self.enable_gaze {
            match GazePoller::from_hz(config.gaze_poll_hz) {
                Ok(poller) => {
                    app.insert_resource(poller);
                }
                Err(err) => warn!("strata: {err}; gaze disabled"),
            }
        }
        if self.enable_hud {
            app.add_plugins(hud_plugin);
        }

        app
    }
}

fn navigator_config(config: NavigatorConfig) -> NavigatorConfig {
    match config.validate() {
        Ok(()) => config,
        Err(err) => {
            warn!("strata: {err}; using default rates");
            NavigatorConfig::default()
        }
    }
}

fn navigation_controller(settings: NavigationSettings, tick_hz: f64) -> NavigationController {
    let settings = settings.with_tick_hz(tick_hz as f32);
    NavigationController::new(settings).unwrap_or_else(|err| {
        warn!("strata: {err}; using default navigation settings");
        NavigationController::new(NavigationSettings::default().with_tick_hz(tick_hz as f32))
            .unwrap_or_default()
    })
}

fn block_channel(source: BlockSource) -> BlockChannel {
    match source {
        BlockSource::Demo => {
            info!("strata: showing demo blocks");
            init_demo_channel()
        }
        BlockSource::Fixture(path) => init_fixture_channel(&path).unwrap_or_else(|err| {
            warn!("strata: {err}; showing demo blocks");
            init_demo_channel()
        }),
        BlockSource::Rpc(config) => init_rpc_channel(config),
    }
}
