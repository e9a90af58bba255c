//! Host-facing reconciler shared by every resource kind.
//!
//! [`Driver`] runs the plan pipeline (schema validation, cross-field rules,
//! common-defaults merge, static defaults, immutability guard, backend-assisted
//! checks, unknown marking), performs the backend call under the host's
//! cancellation token and writes state exactly once, after every diagnostic
//! has been collected.

use std::future::Future;

use async_trait::async_trait;
use provider_kit::plan::{apply_static_defaults, check_immutable, mark_computed_unknown, merge_common_defaults};
use provider_kit::{
    Diagnostic, Diagnostics, Flatten, ObjectValue, Operation, Record, Redacted, ResourceRequest, Schema, expand,
};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::error::DomainError;
use super::resource::Resource;
use crate::infra::api::ApiClient;

/// Result of planning one resource instance.
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    /// `None` when an error diagnostic stopped the pipeline.
    pub planned: Option<ObjectValue>,
    pub diagnostics: Diagnostics,
}

/// Object-safe view of a resource kind, as registered with the provider.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &'static Schema;

    /// Schema validators plus cross-field rules, without touching the backend.
    fn validate_config(&self, config: &ObjectValue) -> Diagnostics;

    async fn plan(&self, config: &ObjectValue, prior: Option<&ObjectValue>, cancel: &CancellationToken)
    -> PlanOutcome;

    async fn create(&self, req: &mut dyn ResourceRequest);

    async fn read(&self, req: &mut dyn ResourceRequest);

    async fn update(&self, req: &mut dyn ResourceRequest);

    async fn delete(&self, req: &mut dyn ResourceRequest);

    async fn import(&self, req: &mut dyn ResourceRequest);
}

/// Generic [`ResourceHandler`] over a [`Resource`].
pub struct Driver<R> {
    resource: R,
    api: ApiClient,
}

impl<R: Resource> Driver<R> {
    #[must_use]
    pub fn new(resource: R, api: ApiClient) -> Self {
        Self { resource, api }
    }

    fn fail(&self, req: &mut dyn ResourceRequest, action: &str, err: &DomainError) {
        tracing::warn!(resource = self.type_name(), action, error = %err, "operation failed");
        req.append_diagnostic(err.to_diagnostic(self.type_name(), action));
    }

    fn missing_input(&self, req: &mut dyn ResourceRequest, action: &str, what: &str) {
        req.append_diagnostic(Diagnostic::error(
            format!("{action} {} failed: invalid request", self.type_name()),
            format!("the host supplied no {what}"),
        ));
    }

    /// Local part of the pipeline; returns `None` once an error is recorded.
    fn prepare_local(
        &self,
        config: &ObjectValue,
        prior: Option<&ObjectValue>,
        diags: &mut Diagnostics,
    ) -> Option<ObjectValue> {
        let schema = self.resource.schema();
        diags.extend(schema.validate(config));
        self.resource.validate_config(config, diags);
        if diags.has_errors() {
            return None;
        }

        let merged = match self.resource.common_defaults() {
            Some(attr) => merge_common_defaults(config, attr, schema),
            None => config.clone(),
        };
        let mut plan = apply_static_defaults(&merged, schema);
        self.resource.complete_plan(&mut plan);

        diags.extend(check_immutable(schema, prior, &plan));
        if diags.has_errors() {
            return None;
        }
        Some(plan)
    }

    async fn prepare(
        &self,
        config: &ObjectValue,
        prior: Option<&ObjectValue>,
        cancel: &CancellationToken,
        diags: &mut Diagnostics,
    ) -> Result<Option<ObjectValue>, DomainError> {
        let Some(plan) = self.prepare_local(config, prior, diags) else {
            return Ok(None);
        };
        guarded(cancel, self.resource.check_plan(&self.api, &plan, diags)).await?;
        if diags.has_errors() {
            return Ok(None);
        }
        let planned = mark_computed_unknown(self.resource.schema(), &plan, prior);
        tracing::debug!(plan = %Redacted::new(self.resource.schema(), &planned), "plan prepared");
        Ok(Some(planned))
    }

    fn settle(&self, operation: Operation, basis: &ObjectValue, record: &Record, diags: &mut Diagnostics) -> ObjectValue {
        let mut state = Flatten::new(self.resource.schema(), operation)
            .basis(basis)
            .policy(self.resource.drift_policy())
            .run(record, diags);
        self.resource.finish_state(&mut state);
        state
    }

    async fn write(
        &self,
        operation: Operation,
        plan: &ObjectValue,
        prior: Option<&ObjectValue>,
        cancel: &CancellationToken,
        diags: &mut Diagnostics,
    ) -> Result<Option<ObjectValue>, DomainError> {
        let Some(planned) = self.prepare(plan, prior, cancel, diags).await? else {
            return Ok(None);
        };
        let record = expand(self.resource.schema(), &planned);
        let response = match prior {
            Some(prior) => {
                guarded(cancel, self.resource.update(&self.api, record, &planned, prior)).await?
            }
            None => guarded(cancel, self.resource.create(&self.api, record, &planned)).await?,
        };
        Ok(Some(self.settle(operation, &planned, &response, diags)))
    }

    async fn apply(&self, req: &mut dyn ResourceRequest, operation: Operation) {
        let action = if operation == Operation::Create { "create" } else { "update" };
        let Some(plan) = req.plan().cloned() else {
            self.missing_input(req, action, "plan");
            return;
        };
        let prior = if operation == Operation::Update {
            let Some(prior) = req.state().cloned() else {
                self.missing_input(req, action, "prior state");
                return;
            };
            Some(prior)
        } else {
            None
        };
        let cancel = req.cancellation();

        let mut diags = Diagnostics::new();
        let outcome = self.write(operation, &plan, prior.as_ref(), &cancel, &mut diags).await;
        req.append_diagnostics(diags);
        match outcome {
            Ok(Some(state)) => {
                tracing::info!(resource = self.type_name(), %operation, "applied");
                req.set_state(Some(state));
            }
            Ok(None) => {}
            Err(err) => self.fail(req, action, &err),
        }
    }
}

/// Runs `fut` unless the host cancels first; a cancelled call is dropped.
async fn guarded<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(DomainError::Cancelled),
        result = fut => result,
    }
}

#[async_trait]
impl<R: Resource> ResourceHandler for Driver<R> {
    fn type_name(&self) -> &'static str {
        self.resource.schema().type_name()
    }

    fn schema(&self) -> &'static Schema {
        self.resource.schema()
    }

    fn validate_config(&self, config: &ObjectValue) -> Diagnostics {
        let mut diags = self.resource.schema().validate(config);
        self.resource.validate_config(config, &mut diags);
        diags
    }

    #[instrument(skip_all, fields(resource = ResourceHandler::type_name(self), operation = "PLAN"))]
    async fn plan(
        &self,
        config: &ObjectValue,
        prior: Option<&ObjectValue>,
        cancel: &CancellationToken,
    ) -> PlanOutcome {
        let mut diagnostics = Diagnostics::new();
        let planned = match self.prepare(config, prior, cancel, &mut diagnostics).await {
            Ok(planned) => planned,
            Err(err) => {
                diagnostics.push(err.to_diagnostic(self.type_name(), "plan"));
                None
            }
        };
        PlanOutcome { planned, diagnostics }
    }

    #[instrument(skip_all, fields(resource = ResourceHandler::type_name(self), operation = %Operation::Create))]
    async fn create(&self, req: &mut dyn ResourceRequest) {
        self.apply(req, Operation::Create).await;
    }

    #[instrument(skip_all, fields(resource = ResourceHandler::type_name(self), operation = %Operation::Read))]
    async fn read(&self, req: &mut dyn ResourceRequest) {
        let Some(prior) = req.state().cloned() else {
            self.missing_input(req, "read", "prior state");
            return;
        };
        let cancel = req.cancellation();
        match guarded(&cancel, self.resource.read(&self.api, &prior)).await {
            Ok(record) => {
                let mut diags = Diagnostics::new();
                let state = self.settle(Operation::Read, &prior, &record, &mut diags);
                req.append_diagnostics(diags);
                req.set_state(Some(state));
            }
            Err(err) if err.is_not_found() => {
                tracing::info!(resource = self.type_name(), "object no longer exists, removing it from state");
                req.set_state(None);
            }
            Err(err) => self.fail(req, "read", &err),
        }
    }

    #[instrument(skip_all, fields(resource = ResourceHandler::type_name(self), operation = %Operation::Update))]
    async fn update(&self, req: &mut dyn ResourceRequest) {
        self.apply(req, Operation::Update).await;
    }

    #[instrument(skip_all, fields(resource = ResourceHandler::type_name(self), operation = "DELETE"))]
    async fn delete(&self, req: &mut dyn ResourceRequest) {
        let Some(prior) = req.state().cloned() else {
            self.missing_input(req, "delete", "prior state");
            return;
        };
        let cancel = req.cancellation();
        match guarded(&cancel, self.resource.delete(&self.api, &prior)).await {
            Ok(()) => req.set_state(None),
            Err(err) if err.is_not_found() => {
                tracing::debug!(resource = self.type_name(), "already deleted");
                req.set_state(None);
            }
            Err(err) => self.fail(req, "delete", &err),
        }
    }

    #[instrument(skip_all, fields(resource = ResourceHandler::type_name(self), operation = %Operation::Import))]
    async fn import(&self, req: &mut dyn ResourceRequest) {
        let Some(id) = req.import_id().map(str::to_owned) else {
            self.missing_input(req, "import", "import id");
            return;
        };
        let seed = match self.resource.import_state(&id) {
            Ok(seed) => seed,
            Err(err) => {
                self.fail(req, "import", &err);
                return;
            }
        };
        let cancel = req.cancellation();
        match guarded(&cancel, self.resource.read(&self.api, &seed)).await {
            Ok(record) => {
                let mut diags = Diagnostics::new();
                let state = self.settle(Operation::Import, &seed, &record, &mut diags);
                req.append_diagnostics(diags);
                req.set_state(Some(state));
            }
            Err(err) if err.is_not_found() => {
                let err = DomainError::not_found(self.type_name(), id);
                self.fail(req, "import", &err);
            }
            Err(err) => self.fail(req, "import", &err),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, LazyLock};

    use super::*;
    use crate::domain::resource::{key, simple_import_id};
    use provider_kit::{Attribute, HostRequest, Value, WireCase};
    use provider_http::{HttpError, HttpTransport, StaticToken, TransportRequest, TransportResponse};
    use serde_json::json;
    use tracing_test::traced_test;

    static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
        Schema::new(
            "cidaas_widget",
            WireCase::Snake,
            vec![
                Attribute::string("name").required().identifier(),
                Attribute::string("id").read_only(),
                Attribute::string("label").default("none"),
                Attribute::string("password").sensitive(),
            ],
        )
    });

    /// Answers every call with a fixed record and counts the calls.
    struct Widget {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Resource for Widget {
        fn schema(&self) -> &'static Schema {
            &SCHEMA
        }

        async fn create(&self, _api: &ApiClient, mut record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            record.insert("id".to_owned(), json!("generated"));
            Ok(record)
        }

        async fn read(&self, _api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = key(state, "name")?;
            if name == "gone" {
                return Err(DomainError::not_found("widget", name));
            }
            let mut record = Record::new();
            record.insert("name".to_owned(), json!(name));
            record.insert("id".to_owned(), json!("generated"));
            Ok(record)
        }

        async fn update(
            &self,
            api: &ApiClient,
            record: Record,
            plan: &ObjectValue,
            _prior: &ObjectValue,
        ) -> Result<Record, DomainError> {
            self.create(api, record, plan).await
        }

        async fn delete(&self, _api: &ApiClient, _state: &ObjectValue) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::not_found("widget", "x"))
        }

        fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
            simple_import_id(id, "name")
        }
    }

    struct Unused;

    #[async_trait]
    impl HttpTransport for Unused {
        async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, HttpError> {
            Err(HttpError::ServiceClosed)
        }
    }

    fn driver() -> (Driver<Widget>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let api = ApiClient::new(
            url::Url::parse("https://tenant.example/").unwrap(),
            Arc::new(Unused),
            Arc::new(StaticToken::new(secrecy::SecretString::from("t".to_owned()))),
        );
        (Driver::new(Widget { calls: calls.clone() }, api), calls)
    }

    #[tokio::test]
    async fn plan_fills_defaults_and_marks_computed_unknown() {
        let (driver, _) = driver();
        let config = ObjectValue::new().with("name", "a");
        let outcome = driver.plan(&config, None, &CancellationToken::new()).await;
        let planned = outcome.planned.unwrap();
        assert_eq!(planned.get("label"), &Value::from("none"));
        assert!(planned.get("id").is_unknown());
    }

    #[tokio::test]
    async fn create_writes_state_once_without_unknowns() {
        let (driver, calls) = driver();
        let config = ObjectValue::new().with("name", "a");
        let mut req = HostRequest::create(config.clone(), config);
        driver.create(&mut req).await;
        assert_eq!(req.state_writes(), 1);
        let state = req.new_state().unwrap();
        assert_eq!(state.str_of("id"), Some("generated"));
        assert!(!Value::Object(state.clone()).contains_unknown());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn identifier_change_stops_before_backend() {
        let (driver, calls) = driver();
        let prior = ObjectValue::new().with("name", "a").with("id", "generated");
        let plan = ObjectValue::new().with("name", "b");
        let mut req = HostRequest::update(plan.clone(), plan, prior);
        driver.update(&mut req).await;
        assert!(req.diagnostics().has_errors());
        assert_eq!(req.state_writes(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn read_of_missing_object_removes_state() {
        let (driver, _) = driver();
        let mut req = HostRequest::read(ObjectValue::new().with("name", "gone"));
        driver.read(&mut req).await;
        assert_eq!(req.written_state(), Some(None));
        assert!(req.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn delete_of_missing_object_succeeds() {
        let (driver, _) = driver();
        let mut req = HostRequest::delete(ObjectValue::new().with("name", "a"));
        driver.delete(&mut req).await;
        assert_eq!(req.written_state(), Some(None));
        assert!(!req.diagnostics().has_errors());
    }

    #[tokio::test]
    async fn import_of_missing_object_is_an_error() {
        let (driver, _) = driver();
        let mut req = HostRequest::import("gone");
        driver.import(&mut req).await;
        assert!(req.diagnostics().has_errors());
        assert_eq!(req.state_writes(), 0);
    }

    #[tokio::test]
    async fn cancelled_create_leaves_state_untouched() {
        let (driver, calls) = driver();
        let token = CancellationToken::new();
        token.cancel();
        let config = ObjectValue::new().with("name", "a");
        let mut req = HostRequest::create(config.clone(), config).with_cancellation(token);
        driver.create(&mut req).await;
        assert_eq!(req.state_writes(), 0);
        let diag = req.diagnostics().errors().next().unwrap();
        assert!(diag.summary.contains("operation cancelled"), "{}", diag.summary);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[traced_test]
    #[tokio::test]
    async fn plans_are_logged_without_secrets() {
        let (driver, _) = driver();
        let config = ObjectValue::new().with("name", "a").with("password", "hunter2");
        let outcome = driver.plan(&config, None, &CancellationToken::new()).await;
        assert_eq!(outcome.planned.unwrap().str_of("password"), Some("hunter2"));
        assert!(logs_contain("plan prepared"));
        assert!(!logs_contain("hunter2"));
    }

    #[traced_test]
    #[tokio::test]
    async fn vanished_objects_are_logged() {
        let (driver, _) = driver();
        let mut req = HostRequest::read(ObjectValue::new().with("name", "gone"));
        driver.read(&mut req).await;
        assert!(logs_contain("removing it from state"));
    }
}
