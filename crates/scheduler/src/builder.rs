use std::sync::Arc;

use docwatch_provider::TransportRegistry;
use docwatch_store::{ActivityLog, DocumentRepository, ReminderRepository, ReminderStore};

use crate::config::OrchestratorConfig;
use crate::dispatch::Dispatcher;
use crate::error::SchedulerError;
use crate::metrics::SchedulerMetrics;
use crate::orchestrator::ReminderOrchestrator;

/// Fluent builder for a [`ReminderOrchestrator`].
///
/// The three repositories are required, either separately or through
/// [`store`](Self::store). With no transports registered every send fails
/// as unconfigured.
#[derive(Default)]
pub struct OrchestratorBuilder {
    documents: Option<Arc<dyn DocumentRepository>>,
    reminders: Option<Arc<dyn ReminderRepository>>,
    activity: Option<Arc<dyn ActivityLog>>,
    transports: Option<Arc<TransportRegistry>>,
    config: OrchestratorConfig,
    metrics: Option<Arc<SchedulerMetrics>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one backend for documents, reminders, and the activity log.
    #[must_use]
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: DocumentRepository + ReminderRepository + ActivityLog + 'static,
    {
        let documents: Arc<dyn DocumentRepository> = store.clone();
        let reminders: Arc<dyn ReminderRepository> = store.clone();
        let activity: Arc<dyn ActivityLog> = store;
        self.documents(documents)
            .reminders(reminders)
            .activity(activity)
    }

    /// Like [`store`](Self::store), for a backend chosen at runtime.
    #[must_use]
    pub fn shared_store(self, store: Arc<dyn ReminderStore>) -> Self {
        let documents: Arc<dyn DocumentRepository> = store.clone();
        let reminders: Arc<dyn ReminderRepository> = store.clone();
        let activity: Arc<dyn ActivityLog> = store;
        self.documents(documents)
            .reminders(reminders)
            .activity(activity)
    }

    #[must_use]
    pub fn documents(mut self, documents: Arc<dyn DocumentRepository>) -> Self {
        self.documents = Some(documents);
        self
    }

    #[must_use]
    pub fn reminders(mut self, reminders: Arc<dyn ReminderRepository>) -> Self {
        self.reminders = Some(reminders);
        self
    }

    #[must_use]
    pub fn activity(mut self, activity: Arc<dyn ActivityLog>) -> Self {
        self.activity = Some(activity);
        self
    }

    #[must_use]
    pub fn transports(self, registry: TransportRegistry) -> Self {
        self.shared_transports(Arc::new(registry))
    }

    /// Share a registry that is also used elsewhere (e.g. health checks).
    #[must_use]
    pub fn shared_transports(mut self, registry: Arc<TransportRegistry>) -> Self {
        self.transports = Some(registry);
        self
    }

    #[must_use]
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn metrics(mut self, metrics: Arc<SchedulerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<ReminderOrchestrator, SchedulerError> {
        let documents = self
            .documents
            .ok_or_else(|| SchedulerError::Configuration("document repository is required".into()))?;
        let reminders = self
            .reminders
            .ok_or_else(|| SchedulerError::Configuration("reminder repository is required".into()))?;
        let activity = self
            .activity
            .ok_or_else(|| SchedulerError::Configuration("activity log is required".into()))?;

        if self.config.max_concurrent == 0 {
            return Err(SchedulerError::Configuration(
                "max_concurrent must be at least 1".into(),
            ));
        }
        if self.config.delivery_timeout.is_zero() {
            return Err(SchedulerError::Configuration(
                "delivery_timeout must be greater than zero".into(),
            ));
        }

        let transports = self.transports.unwrap_or_default();
        let dispatcher = Dispatcher::new(transports, self.config.delivery_timeout);

        Ok(ReminderOrchestrator {
            documents,
            reminders,
            activity,
            dispatcher,
            config: self.config,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}
