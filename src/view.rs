use crate::diagnostics::DiagnosticSink;
use crate::domain::StudyMetadata;
use crate::error::KiraError;
use crate::loader::{LoadTask, StudySource};
use crate::locale::NumberLocale;
use crate::render::{Fragment, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Loaded,
    Failed,
}

/// Per-instance view state: loaded study, loading flag, expanded taxon group.
#[derive(Debug, Clone)]
pub struct ViewState {
    metadata: Option<StudyMetadata>,
    loading: bool,
    phase: LoadPhase,
    expanded_group: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            metadata: None,
            loading: true,
            phase: LoadPhase::Loading,
            expanded_group: None,
        }
    }

    pub fn metadata(&self) -> Option<&StudyMetadata> {
        self.metadata.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn expanded_group(&self) -> Option<&str> {
        self.expanded_group.as_deref()
    }

    /// Applies the loader outcome. Only the first outcome is taken; returns
    /// whether this call changed the state.
    pub fn apply_load(
        &mut self,
        result: Result<StudyMetadata, KiraError>,
        source: &str,
        sink: &dyn DiagnosticSink,
    ) -> bool {
        if self.phase != LoadPhase::Loading {
            return false;
        }
        match result {
            Ok(metadata) => {
                self.metadata = Some(metadata);
                self.phase = LoadPhase::Loaded;
            }
            Err(err) => {
                sink.record_failure(source, &err);
                self.phase = LoadPhase::Failed;
            }
        }
        self.loading = false;
        true
    }

    /// Single-selection toggle: the expanded name collapses, any other known
    /// group replaces it. Unknown names leave the state untouched.
    pub fn toggle_group(&mut self, name: &str) -> bool {
        let Some(metadata) = self.metadata.as_ref() else {
            return false;
        };
        if metadata.group(name).is_none() {
            return false;
        }
        if self.expanded_group.as_deref() == Some(name) {
            self.expanded_group = None;
        } else {
            self.expanded_group = Some(name.to_string());
        }
        true
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded_group.as_deref() == Some(name)
    }
}

/// The study card component: owns its view state and the one load task.
pub struct StudyViewer<D: DiagnosticSink> {
    state: ViewState,
    task: Option<LoadTask>,
    source: String,
    sink: D,
}

impl<D: DiagnosticSink> StudyViewer<D> {
    /// Creates the state in `Loading` and starts exactly one fetch.
    pub fn mount<S: StudySource + 'static>(source: S, sink: D) -> Self {
        let label = source.describe();
        tracing::debug!(source = %label, "viewer.mount");
        Self {
            state: ViewState::new(),
            task: Some(LoadTask::spawn(source)),
            source: label,
            sink,
        }
    }

    /// Applies a finished load if one is ready. Returns true on a state change.
    pub fn pump(&mut self) -> bool {
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        let Some(result) = task.poll() else {
            return false;
        };
        self.task = None;
        self.state.apply_load(result, &self.source, &self.sink)
    }

    /// Blocks until the load finishes and applies it.
    pub fn wait(&mut self) -> bool {
        let Some(mut task) = self.task.take() else {
            return false;
        };
        match task.wait() {
            Some(result) => self.state.apply_load(result, &self.source, &self.sink),
            None => false,
        }
    }

    pub fn toggle_group(&mut self, name: &str) -> bool {
        self.state.toggle_group(name)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, locale: NumberLocale) -> Vec<Fragment> {
        render(&self.state, locale)
    }
}
