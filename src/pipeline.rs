//! Configuration → placements → inset views
//!
//! One explicit sequence of stages: a configuration (stored document or edited
//! working configuration) is resolved against the primary map's bookmarks and
//! the result rebuilds every inset. Reconfiguration arrives on a single change
//! channel; view readiness and camera changes arrive on the manager's event
//! channel.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::{ConfigurationDocument, InsetPlacementSpec};
use crate::inset::{EventOutcome, InsetViewManager, MapProvider, RebuildReport, ViewEventReceiver};
use crate::map::PrimaryView;
use crate::projection::{ProjectionEngine, ProjectionError};
use crate::reconciler::WorkingConfiguration;
use crate::resolver::resolve;

pub struct InsetPipeline<P: MapProvider, E: ProjectionEngine> {
    primary: PrimaryView,
    projection: E,
    manager: InsetViewManager<P>,
    events: ViewEventReceiver,
}

impl<P: MapProvider, E: ProjectionEngine> InsetPipeline<P, E> {
    /// Waits for the projection engine before anything can be built
    pub async fn start(
        primary: PrimaryView,
        provider: P,
        mut projection: E,
        base_size: f64,
    ) -> Result<Self, ProjectionError> {
        if !projection.is_loaded() {
            projection.load().await?;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            primary,
            projection,
            manager: InsetViewManager::new(provider, base_size, tx),
            events: rx,
        })
    }

    pub fn primary(&self) -> &PrimaryView {
        &self.primary
    }

    pub fn manager(&self) -> &InsetViewManager<P> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut InsetViewManager<P> {
        &mut self.manager
    }

    pub fn apply_specs(&mut self, specs: &[InsetPlacementSpec]) -> RebuildReport {
        let placements = resolve(
            self.primary.bookmarks(),
            specs,
            self.primary.spatial_reference(),
        );
        debug!(rows = specs.len(), placements = placements.len(), "Resolved placements");
        self.manager
            .rebuild(&self.primary, &placements, &self.projection)
    }

    /// Render the stored rows as they are; bookmarks without a row are not shown
    /// unless the document has no rows at all.
    pub fn apply_document(&mut self, document: Option<&ConfigurationDocument>) -> RebuildReport {
        let specs = document
            .map(ConfigurationDocument::placement_specs)
            .unwrap_or_default();
        self.apply_specs(&specs)
    }

    pub fn apply_working(&mut self, working: &WorkingConfiguration) -> RebuildReport {
        self.apply_specs(working.rows())
    }

    /// Process view events until every current inset is ready or failed
    pub async fn settle(&mut self) {
        while !self.manager.is_settled() {
            match self.events.recv().await {
                Some(event) => {
                    self.manager.handle_event(event);
                }
                None => break,
            }
        }
    }

    /// Handle one pending view event without waiting
    pub fn poll_event(&mut self) -> Option<EventOutcome> {
        let event = self.events.try_recv().ok()?;
        Some(self.manager.handle_event(event))
    }

    /// Rebuild on every configuration change and keep insets constrained,
    /// until the change channel closes.
    pub async fn run(&mut self, mut changes: mpsc::UnboundedReceiver<WorkingConfiguration>) {
        info!("Inset pipeline running");
        loop {
            tokio::select! {
                change = changes.recv() => match change {
                    Some(working) => {
                        self.apply_working(&working);
                    }
                    None => break,
                },
                Some(event) = self.events.recv() => {
                    self.manager.handle_event(event);
                }
            }
        }
        info!("Configuration channel closed, inset pipeline stopped");
    }
}
