use std::any::{Any, TypeId};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

/// Application-wide bus for lifecycle events (imports, workspaces, settings)
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Common system events
pub mod events {
    use super::Event;
    use crate::settings::SettingsDelta;
    use crate::state::WorkspaceId;

    /// A dataset was installed in a workspace
    #[derive(Debug, Clone)]
    pub struct DatasetImported {
        pub workspace: WorkspaceId,
        pub name: String,
        pub feature_count: usize,
        pub property_count: usize,
    }

    /// An import was aborted; no dataset was installed
    #[derive(Debug, Clone)]
    pub struct ImportFailed {
        pub workspace: WorkspaceId,
        pub error: String,
    }

    #[derive(Debug, Clone)]
    pub struct WorkspaceCreated {
        pub workspace: WorkspaceId,
    }

    #[derive(Debug, Clone)]
    pub struct WorkspaceClosed {
        pub workspace: WorkspaceId,
    }

    #[derive(Debug, Clone)]
    pub struct WorkspaceSwitched {
        pub from: WorkspaceId,
        pub to: WorkspaceId,
    }

    #[derive(Debug, Clone)]
    pub struct SettingsSaved {
        pub delta: SettingsDelta,
    }

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
        DatasetImported,
        ImportFailed,
        WorkspaceCreated,
        WorkspaceClosed,
        WorkspaceSwitched,
        SettingsSaved
    );
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        self.handlers
            .lock()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(handler);
    }

    pub fn handler_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Subscribe a closure that receives the concrete event type
    pub fn on<E, F>(&self, mut f: F)
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(handler_from_fn(move |event: &dyn Event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                f(event);
            }
        }));
    }

    /// Publish an event to every handler of its type.
    ///
    /// Handlers run without the bus locked, so they may publish or subscribe.
    /// An event of the type being dispatched that is published from one of its
    /// own handlers does not reach those handlers.
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = TypeId::of::<E>();
        let Some(mut dispatching) = self.handlers.lock().remove(&type_id) else {
            return;
        };

        for handler in dispatching.iter_mut() {
            handler.handle(&event);
        }

        let mut handlers = self.handlers.lock();
        if let Some(added) = handlers.remove(&type_id) {
            dispatching.extend(added);
        }
        handlers.insert(type_id, dispatching);
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
