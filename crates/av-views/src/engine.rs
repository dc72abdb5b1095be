//! Update engine
//!
//! Owns the filter and camera state. UI and surface events go through
//! [`UpdateEngine::dispatch`]; every accepted event recomputes the scene and
//! hands it to the registered rendering surfaces.

use std::sync::Arc;

use indexmap::IndexSet;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use av_core::events::events::{EventRejected, RenderFailed, SceneEmitted};
use av_core::{
    CameraState, EventBus, FilterState, Metric, RenderSurface, ReportedViewport, SceneDescriptor,
    UnknownMetric, ViewportError,
};
use av_data::config::{DEFAULT_MARKER_SIZE, DEFAULT_TIME_OF_DAY};
use av_data::{DashboardConfig, Dataset};

use crate::composer::ViewComposer;

/// Events the engine reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Dropdown selection; absent fields are left unchanged
    FilterChanged {
        time_of_day: Option<String>,
        metric: Option<String>,
    },
    /// Viewport reported by the rendering surface
    ViewportReported {
        viewport: Option<ReportedViewport>,
        autosize: bool,
    },
}

impl EngineEvent {
    pub fn time_of_day(bucket: impl Into<String>) -> Self {
        EngineEvent::FilterChanged {
            time_of_day: Some(bucket.into()),
            metric: None,
        }
    }

    pub fn metric(key: impl Into<String>) -> Self {
        EngineEvent::FilterChanged {
            time_of_day: None,
            metric: Some(key.into()),
        }
    }

    /// A user-adjusted viewport
    pub fn viewport(viewport: ReportedViewport) -> Self {
        EngineEvent::ViewportReported {
            viewport: Some(viewport),
            autosize: false,
        }
    }
}

/// Errors returned by the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown time-of-day bucket '{0}'")]
    UnknownTimeOfDay(String),

    #[error(transparent)]
    UnknownMetric(#[from] UnknownMetric),

    #[error(transparent)]
    InvalidViewport(#[from] ViewportError),

    #[error("dataset has no time-of-day buckets")]
    NoTimeOfDayBuckets,
}

impl EngineError {
    /// Whether the error came from an out-of-domain event
    pub fn is_domain_violation(&self) -> bool {
        !matches!(self, EngineError::NoTimeOfDayBuckets)
    }
}

/// Initial selections and deployment constants
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Preferred first bucket; falls back to the first one in the data
    pub default_time_of_day: String,
    pub default_metric: Metric,
    pub marker_size: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_time_of_day: DEFAULT_TIME_OF_DAY.to_string(),
            default_metric: Metric::Bikes,
            marker_size: DEFAULT_MARKER_SIZE,
        }
    }
}

impl From<&DashboardConfig> for EngineSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            default_time_of_day: config.default_time_of_day.clone(),
            default_metric: config.default_metric,
            marker_size: config.marker_size,
        }
    }
}

/// The reactive update engine
pub struct UpdateEngine {
    dataset: Arc<Dataset>,
    buckets: IndexSet<String>,
    filter: FilterState,
    camera: CameraState,
    composer: ViewComposer,
    surfaces: Vec<Box<dyn RenderSurface>>,
    event_bus: Arc<EventBus>,
}

impl UpdateEngine {
    /// Create an engine over a loaded dataset
    pub fn new(dataset: Arc<Dataset>, settings: EngineSettings) -> Result<Self, EngineError> {
        let buckets = dataset.distinct_time_of_day_buckets();

        let time_of_day = if buckets.contains(&settings.default_time_of_day) {
            settings.default_time_of_day
        } else {
            let first = buckets.first().cloned().ok_or(EngineError::NoTimeOfDayBuckets)?;
            warn!(
                "Default bucket '{}' not in dataset; starting with '{}'",
                settings.default_time_of_day, first
            );
            first
        };

        info!(
            "Update engine ready: {} records, {} buckets, starting at '{}' / {}",
            dataset.len(),
            buckets.len(),
            time_of_day,
            settings.default_metric
        );

        Ok(Self {
            dataset,
            buckets,
            filter: FilterState::new(time_of_day, settings.default_metric),
            camera: CameraState::default(),
            composer: ViewComposer::new(settings.marker_size),
            surfaces: Vec::new(),
            event_bus: Arc::new(EventBus::new()),
        })
    }

    /// Publish outcomes on a shared bus
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Register a rendering surface
    pub fn add_surface(&mut self, surface: Box<dyn RenderSurface>) {
        info!("Registered rendering surface '{}'", surface.surface_name());
        self.surfaces.push(surface);
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Options for the time-of-day dropdown
    pub fn time_of_day_options(&self) -> &IndexSet<String> {
        &self.buckets
    }

    /// Options for the metric dropdown
    pub fn metric_options(&self) -> [Metric; 2] {
        Metric::ALL
    }

    /// Apply an event, then compose and emit the new scene
    ///
    /// A rejected event leaves all state untouched and emits nothing.
    pub fn dispatch(&mut self, event: EngineEvent) -> Result<SceneDescriptor, EngineError> {
        debug!("Dispatching {:?}", event);

        if let Err(err) = self.apply(event) {
            warn!("Rejected event: {}", err);
            self.event_bus.publish(EventRejected {
                reason: err.to_string(),
            });
            return Err(err);
        }

        Ok(self.refresh())
    }

    /// Compose and emit the scene for the current state
    pub fn refresh(&mut self) -> SceneDescriptor {
        let scene = self.current_scene();
        self.emit(&scene);
        scene
    }

    /// Compose the scene for the current state without emitting it
    pub fn current_scene(&self) -> SceneDescriptor {
        let filtered = self.dataset.filter_by_time_of_day(&self.filter.time_of_day);
        self.composer.compose(&filtered, self.filter.metric, self.camera)
    }

    fn apply(&mut self, event: EngineEvent) -> Result<(), EngineError> {
        match event {
            EngineEvent::FilterChanged { time_of_day, metric } => {
                // Validate both fields before touching either
                if let Some(bucket) = &time_of_day {
                    if !self.buckets.contains(bucket) {
                        return Err(EngineError::UnknownTimeOfDay(bucket.clone()));
                    }
                }
                let metric = metric.map(|key| key.parse::<Metric>()).transpose()?;

                if let Some(bucket) = time_of_day {
                    self.filter.time_of_day = bucket;
                }
                if let Some(metric) = metric {
                    self.filter.metric = metric;
                }
            }
            EngineEvent::ViewportReported { viewport, autosize } => {
                self.camera = match viewport {
                    Some(viewport) if !autosize => viewport.into_camera()?,
                    _ => CameraState::default(),
                };
            }
        }
        Ok(())
    }

    fn emit(&mut self, scene: &SceneDescriptor) {
        for surface in self.surfaces.iter_mut() {
            if let Err(err) = surface.render(scene) {
                error!("Surface '{}' failed to render: {}", surface.surface_name(), err);
                self.event_bus.publish(RenderFailed {
                    surface: surface.surface_name().to_string(),
                    error: err.to_string(),
                });
            }
        }

        self.event_bus.publish(SceneEmitted {
            time_of_day: self.filter.time_of_day.clone(),
            metric: self.filter.metric.key().to_string(),
            marker_count: scene.markers.len(),
        });
    }
}
