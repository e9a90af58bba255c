//! Contract between the plugin host and a resource reconciler.

use tokio_util::sync::CancellationToken;

use crate::diag::{Diagnostic, Diagnostics};
use crate::value::ObjectValue;

/// One host-driven operation on one resource instance.
///
/// Readers return the trees the host already holds; writers record the
/// outcome. `set_state(None)` removes the resource from state.
pub trait ResourceRequest: Send {
    fn config(&self) -> Option<&ObjectValue>;
    fn plan(&self) -> Option<&ObjectValue>;
    fn state(&self) -> Option<&ObjectValue>;
    fn import_id(&self) -> Option<&str>;
    fn set_state(&mut self, state: Option<ObjectValue>);
    fn append_diagnostic(&mut self, diagnostic: Diagnostic);
    /// Signalled by the host to abandon the operation.
    fn cancellation(&self) -> CancellationToken;

    fn append_diagnostics(&mut self, diagnostics: Diagnostics) {
        for d in diagnostics {
            self.append_diagnostic(d);
        }
    }
}

/// In-process [`ResourceRequest`] used by embedders and tests.
#[derive(Debug, Default)]
pub struct HostRequest {
    config: Option<ObjectValue>,
    plan: Option<ObjectValue>,
    state: Option<ObjectValue>,
    import_id: Option<String>,
    written: Option<Option<ObjectValue>>,
    writes: usize,
    diagnostics: Diagnostics,
    cancel: CancellationToken,
}

impl HostRequest {
    /// Request to create a resource from `config`, planned as `plan`.
    #[must_use]
    pub fn create(config: ObjectValue, plan: ObjectValue) -> Self {
        Self {
            config: Some(config),
            plan: Some(plan),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn update(config: ObjectValue, plan: ObjectValue, prior: ObjectValue) -> Self {
        Self {
            config: Some(config),
            plan: Some(plan),
            state: Some(prior),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn read(prior: ObjectValue) -> Self {
        Self {
            state: Some(prior),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn delete(prior: ObjectValue) -> Self {
        Self::read(prior)
    }

    #[must_use]
    pub fn import(id: impl Into<String>) -> Self {
        Self {
            import_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Shares the cancellation token with the caller.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Final state: `None` when nothing was written, `Some(None)` when the
    /// resource was removed.
    #[must_use]
    pub fn written_state(&self) -> Option<Option<&ObjectValue>> {
        self.written.as_ref().map(Option::as_ref)
    }

    /// State after the operation, falling back to the prior state.
    #[must_use]
    pub fn new_state(&self) -> Option<&ObjectValue> {
        match &self.written {
            Some(written) => written.as_ref(),
            None => self.state.as_ref(),
        }
    }

    #[must_use]
    pub fn state_writes(&self) -> usize {
        self.writes
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl ResourceRequest for HostRequest {
    fn config(&self) -> Option<&ObjectValue> {
        self.config.as_ref()
    }

    fn plan(&self) -> Option<&ObjectValue> {
        self.plan.as_ref()
    }

    fn state(&self) -> Option<&ObjectValue> {
        self.state.as_ref()
    }

    fn import_id(&self) -> Option<&str> {
        self.import_id.as_deref()
    }

    fn set_state(&mut self, state: Option<ObjectValue>) {
        self.writes += 1;
        self.written = Some(state);
    }

    fn append_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn tracks_writes_and_removal() {
        let mut req = HostRequest::read(ObjectValue::new().with("id", "1"));
        assert!(req.written_state().is_none());
        assert_eq!(req.new_state().unwrap().str_of("id"), Some("1"));
        req.set_state(None);
        assert_eq!(req.state_writes(), 1);
        assert_eq!(req.written_state(), Some(None));
        assert!(req.new_state().is_none());
    }
}
