use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// System-wide event bus
///
/// Publishes outcomes (loads, rejections, renders) to operator-facing
/// observers. Handlers only observe; they cannot change engine state.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Common system events
pub mod events {
    use super::Event;

    /// Dataset loaded event
    #[derive(Debug, Clone)]
    pub struct DatasetLoaded {
        pub source_name: String,
        pub rows_read: usize,
        pub rows_retained: usize,
        pub time_of_day_buckets: usize,
    }

    /// A UI or surface event was refused; engine state is unchanged
    #[derive(Debug, Clone)]
    pub struct EventRejected {
        pub reason: String,
    }

    /// A scene was composed and handed to the surfaces
    #[derive(Debug, Clone)]
    pub struct SceneEmitted {
        pub time_of_day: String,
        pub metric: String,
        pub marker_count: usize,
    }

    /// A surface could not draw a scene
    #[derive(Debug, Clone)]
    pub struct RenderFailed {
        pub surface: String,
        pub error: String,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        DatasetLoaded,
        EventRejected,
        SceneEmitted,
        RenderFailed
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Subscribe a closure that receives the concrete event type
    ///
    /// Handlers run while the bus is locked, so a handler must not publish
    /// or subscribe on the same bus.
    pub fn subscribe_fn<E, F>(&self, mut f: F)
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(handler_from_fn(move |event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                f(event);
            }
        }));
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::events::{EventRejected, RenderFailed};

    #[test]
    fn test_publish_reaches_typed_subscribers() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe_fn(move |event: &EventRejected| {
            sink.lock().push(event.reason.clone());
        });

        bus.publish(EventRejected {
            reason: "unknown metric 'Scooters'".to_string(),
        });

        assert_eq!(*seen.lock(), vec!["unknown metric 'Scooters'".to_string()]);
    }

    #[test]
    fn test_other_event_types_are_not_delivered() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0usize));

        let counter = count.clone();
        bus.subscribe_fn(move |_: &RenderFailed| {
            *counter.lock() += 1;
        });

        bus.publish(EventRejected {
            reason: "ignored".to_string(),
        });
        assert_eq!(*count.lock(), 0);

        bus.publish(RenderFailed {
            surface: "figure".to_string(),
            error: "map provider access token is missing".to_string(),
        });
        assert_eq!(*count.lock(), 1);
    }
}
