//! Inset view lifecycle
//!
//! Every rebuild tears down all existing insets before building the new list,
//! so there is never a partially updated set of panels. Each rebuild gets a new
//! generation number; view events carrying an older generation belong to
//! panels that no longer exist and are dropped without touching any container.

use tracing::{debug, info, warn};

use crate::config::InsetPlacementSpec;
use crate::error::InsetError;
use crate::geometry::{Extent, SpatialReference};
use crate::inset::container::InsetContainer;
use crate::inset::view::{
    forward_ready, InsetId, InsetLabel, InsetView, MapProvider, ViewEvent, ViewEventSender,
    ViewRequest,
};
use crate::map::PrimaryView;
use crate::projection::ProjectionEngine;
use crate::resolver::Placement;

#[derive(Debug)]
pub struct InsetInstance<V> {
    id: InsetId,
    spec: InsetPlacementSpec,
    container: InsetContainer,
    bound_extent: Option<Extent>,
    live_extent: Option<Extent>,
    view: Option<V>,
    ready: bool,
    failure: Option<InsetError>,
}

impl<V> InsetInstance<V> {
    pub fn id(&self) -> InsetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &InsetPlacementSpec {
        &self.spec
    }

    pub fn container(&self) -> &InsetContainer {
        &self.container
    }

    /// Bookmark extent in the inset's spatial reference
    pub fn bound_extent(&self) -> Option<&Extent> {
        self.bound_extent.as_ref()
    }

    pub fn live_extent(&self) -> Option<&Extent> {
        self.live_extent.as_ref()
    }

    pub fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut V> {
        self.view.as_mut()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn failure(&self) -> Option<&InsetError> {
        self.failure.as_ref()
    }

    fn fail(&mut self, error: InsetError) {
        warn!(id = %self.id, name = %self.spec.name, error = %error, "Inset failed");
        self.container.show_error(error.to_string());
        self.failure = Some(error);
    }
}

/// Summary of one rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildReport {
    pub generation: u64,
    pub requested: usize,
    pub failed: usize,
}

/// What handling a view event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// View ready: label and containment watcher installed
    Ready,
    /// View could not become ready; error shown in its container
    Failed,
    /// Camera left the bookmark extent and was moved back
    Reset,
    /// Camera moved but stayed inside the bookmark extent
    Within,
    /// Event from a torn-down rebuild
    Stale,
    /// Event for an instance that cannot act on it
    Ignored,
}

pub struct InsetViewManager<P: MapProvider> {
    provider: P,
    base_size: f64,
    generation: u64,
    instances: Vec<InsetInstance<P::View>>,
    events: ViewEventSender,
}

impl<P: MapProvider> InsetViewManager<P> {
    /// `events` is the channel view readiness and camera changes are reported on
    pub fn new(provider: P, base_size: f64, events: ViewEventSender) -> Self {
        Self {
            provider,
            base_size,
            generation: 0,
            instances: Vec::new(),
            events,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn instances(&self) -> &[InsetInstance<P::View>] {
        &self.instances
    }

    pub fn instance_mut(&mut self, slot: usize) -> Option<&mut InsetInstance<P::View>> {
        self.instances.get_mut(slot)
    }

    /// True once every current instance is ready or failed
    pub fn is_settled(&self) -> bool {
        self.instances
            .iter()
            .all(|instance| instance.container.is_settled())
    }

    /// Destroy every inset and start a new generation
    pub fn teardown(&mut self) {
        for mut instance in self.instances.drain(..) {
            if let Some(view) = instance.view.as_mut() {
                view.destroy();
            }
        }
        self.generation += 1;
    }

    /// Replace all insets with `placements`, in order. Failures stay inside
    /// their own instance.
    ///
    /// Must be called from within a tokio runtime: view readiness is awaited
    /// on spawned tasks that report back through the event channel.
    pub fn rebuild<E: ProjectionEngine>(
        &mut self,
        primary: &PrimaryView,
        placements: &[Placement],
        projection: &E,
    ) -> RebuildReport {
        let previous = self.instances.len();
        self.teardown();
        debug!(generation = self.generation, previous, next = placements.len(), "Rebuilding insets");

        for (slot, placement) in placements.iter().enumerate() {
            let id = InsetId {
                generation: self.generation,
                slot,
            };
            let instance = self.build_instance(id, primary, placement, projection);
            self.instances.push(instance);
        }

        let failed = self
            .instances
            .iter()
            .filter(|instance| instance.failure.is_some())
            .count();
        info!(generation = self.generation, insets = placements.len(), failed, "Insets rebuilt");

        RebuildReport {
            generation: self.generation,
            requested: placements.len(),
            failed,
        }
    }

    fn build_instance<E: ProjectionEngine>(
        &mut self,
        id: InsetId,
        primary: &PrimaryView,
        placement: &Placement,
        projection: &E,
    ) -> InsetInstance<P::View> {
        let Placement { spec, bookmark } = placement;
        let mut instance = InsetInstance {
            id,
            spec: spec.clone(),
            container: InsetContainer::for_extent(
                spec.position,
                spec.index,
                &bookmark.extent,
                self.base_size,
            ),
            bound_extent: None,
            live_extent: None,
            view: None,
            ready: false,
            failure: None,
        };

        let mut extent = bookmark.extent;
        if spec.spatial_reference_id != extent.spatial_reference.wkid {
            let target = SpatialReference::new(spec.spatial_reference_id);
            extent = match projection.project(&extent, target) {
                Ok(projected) => projected,
                Err(e) => {
                    instance.fail(InsetError::Projection {
                        name: spec.name.clone(),
                        wkid: spec.spatial_reference_id,
                        source: e,
                    });
                    return instance;
                }
            };
        }
        instance.bound_extent = Some(extent);

        let request = ViewRequest {
            id,
            title: &spec.name,
            map: primary.map().clone(),
            container: &instance.container,
            extent,
            spatial_reference: extent.spatial_reference,
            ui_components: Vec::new(),
        };
        match self.provider.create_view(request) {
            Ok((view, ready)) => {
                instance.live_extent = Some(view.extent());
                instance.view = Some(view);
                tokio::spawn(forward_ready(id, ready, self.events.clone()));
            }
            Err(e) => {
                instance.fail(InsetError::ViewInit {
                    name: spec.name.clone(),
                    message: e.to_string(),
                });
            }
        }
        instance
    }

    pub fn handle_event(&mut self, event: ViewEvent) -> EventOutcome {
        match event {
            ViewEvent::Ready { id, result } => {
                let events = self.events.clone();
                let Some(instance) = self.current_instance(id) else {
                    debug!(id = %id, "Ignoring readiness of a torn-down inset");
                    return EventOutcome::Stale;
                };
                let Some(view) = instance.view.as_mut() else {
                    return EventOutcome::Ignored;
                };

                match result {
                    Ok(()) => {
                        view.add_label(InsetLabel {
                            text: instance.spec.name.clone(),
                            tooltip: instance.spec.spatial_reference_id.to_string(),
                        });
                        view.watch_extent(id, events);
                        instance.live_extent = Some(view.extent());
                        instance.ready = true;
                        instance.container.show_map();
                        debug!(id = %id, name = %instance.spec.name, "Inset ready");
                        EventOutcome::Ready
                    }
                    Err(e) => {
                        view.destroy();
                        instance.view = None;
                        instance.fail(InsetError::ViewInit {
                            name: instance.spec.name.clone(),
                            message: e.to_string(),
                        });
                        EventOutcome::Failed
                    }
                }
            }
            ViewEvent::ExtentChanged { id, extent } => {
                let Some(instance) = self.current_instance(id) else {
                    return EventOutcome::Stale;
                };
                Self::constrain(instance, extent)
            }
        }
    }

    /// Keep the camera inside the bookmark extent
    fn constrain(instance: &mut InsetInstance<P::View>, live: Extent) -> EventOutcome {
        let (Some(bound), Some(view)) = (instance.bound_extent, instance.view.as_mut()) else {
            return EventOutcome::Ignored;
        };
        if !instance.ready {
            return EventOutcome::Ignored;
        }

        if bound.contains(&live) {
            instance.live_extent = Some(live);
            return EventOutcome::Within;
        }

        debug!(id = %instance.id, name = %instance.spec.name, live = ?live, "Inset left its bookmark extent, resetting");
        instance.live_extent = Some(bound);
        view.set_extent(bound);
        EventOutcome::Reset
    }

    fn current_instance(&mut self, id: InsetId) -> Option<&mut InsetInstance<P::View>> {
        if id.generation != self.generation {
            return None;
        }
        self.instances
            .get_mut(id.slot)
            .filter(|instance| instance.id == id)
    }
}

impl<P: MapProvider> Drop for InsetViewManager<P> {
    fn drop(&mut self) {
        for instance in self.instances.iter_mut() {
            if let Some(view) = instance.view.as_mut() {
                view.destroy();
            }
        }
    }
}
