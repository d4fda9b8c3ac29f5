//! Build orchestration
//!
//! Composes the engine for one build invocation:
//!
//! ```text
//! Start → SourcesCollected → Resolved → Matched → CacheChecked
//!       → Installed | Reused → Persisted → Done
//! ```
//!
//! Any failure before install leaves the previously persisted layer metadata
//! authoritative. Metadata is computed in full and written once at the end;
//! if that write fails after an install, the old record is removed so the
//! next build rebuilds instead of trusting it.

use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::error::PylayerResult;
use crate::install::Installer;
use crate::layer::{decide, CacheDecision, LayerMetadata, LayerStore};
use crate::refinery::{MatchedDependency, PlanRefinery};
use crate::resolve::{resolve, ResolvedRequest};
use crate::source::SourceSet;
use crate::ui::{Emitter, TaskSpinner, UiContext};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Orchestrator states, for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Start,
    SourcesCollected,
    Resolved,
    Matched,
    CacheChecked,
    Installed,
    Reused,
    Persisted,
    Done,
    ResolutionFailed,
    MatchFailed,
    InstallFailed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::SourcesCollected => "sources-collected",
            Self::Resolved => "resolved",
            Self::Matched => "matched",
            Self::CacheChecked => "cache-checked",
            Self::Installed => "installed",
            Self::Reused => "reused",
            Self::Persisted => "persisted",
            Self::Done => "done",
            Self::ResolutionFailed => "resolution-failed",
            Self::MatchFailed => "match-failed",
            Self::InstallFailed => "install-failed",
        };
        write!(f, "{}", name)
    }
}

/// What a successful build did
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub request: ResolvedRequest,
    pub dependency: MatchedDependency,
    pub decision: CacheDecision,
    pub metadata: LayerMetadata,
}

/// One build invocation
pub struct Build {
    sources: SourceSet,
    catalog: Catalog,
    refinery: PlanRefinery,
    store: Box<dyn LayerStore>,
    installer: Box<dyn Installer>,
    clock: Arc<dyn Clock>,
    emitter: Emitter,
    display_name: String,
}

impl Build {
    pub fn new(
        sources: SourceSet,
        catalog: Catalog,
        refinery: PlanRefinery,
        store: impl LayerStore + 'static,
        installer: impl Installer + 'static,
    ) -> Self {
        Self {
            sources,
            catalog,
            refinery,
            store: Box::new(store),
            installer: Box::new(installer),
            clock: Arc::new(SystemClock),
            emitter: Emitter::stdout(UiContext::detect()),
            display_name: "CPython".to_string(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Name used in log lines (e.g. `CPython`)
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Run the build to completion or to the first failure
    pub async fn run(&self) -> PylayerResult<BuildOutcome> {
        let mut state = BuildState::Start;
        let name = self.display_name.as_str();

        self.emitter.process(&format!("Resolving {} version", name));

        let sources = match self.sources.collect().await {
            Ok(sources) => sources,
            Err(e) => {
                self.fail(state, BuildState::ResolutionFailed);
                return Err(e);
            }
        };
        state = self.advance(state, BuildState::SourcesCollected);

        let request = resolve(&sources);
        state = self.advance(state, BuildState::Resolved);
        self.emitter.candidates(&request);

        let dependency = match self.refinery.match_dependency(&request, &self.catalog) {
            Ok(dependency) => dependency,
            Err(e) => {
                self.fail(state, BuildState::MatchFailed);
                return Err(e);
            }
        };
        state = self.advance(state, BuildState::Matched);
        self.emitter
            .selected(name, &request, &dependency.version.to_string());

        let previous = self.store.load().await?;
        let decision = decide(&dependency, previous.as_ref());
        state = self.advance(state, BuildState::CacheChecked);
        info!("Cache decision for {} {}: {}", name, dependency.version, decision);

        let metadata = match (decision, previous) {
            (CacheDecision::Reuse, Some(previous)) => {
                state = self.advance(state, BuildState::Reused);
                self.emitter.process(&format!(
                    "Reusing cached layer {}",
                    self.store.layer_dir().display()
                ));
                previous
            }
            _ => {
                let metadata = match self.install(&dependency).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        self.fail(state, BuildState::InstallFailed);
                        if e.is_retryable() {
                            info!("Install failure may be transient; previous layer left intact");
                        }
                        return Err(e);
                    }
                };
                state = self.advance(state, BuildState::Installed);
                metadata
            }
        };

        if let Err(e) = self.store.store(&metadata).await {
            // The old record no longer describes the installed contents
            if decision == CacheDecision::Rebuild {
                if let Err(cleanup) = self.store.invalidate().await {
                    warn!("Could not remove stale layer metadata: {}", cleanup);
                }
            }
            warn!("Layer metadata not persisted; next build will rebuild");
            return Err(e);
        }
        state = self.advance(state, BuildState::Persisted);
        self.advance(state, BuildState::Done);

        Ok(BuildOutcome {
            request,
            dependency,
            decision,
            metadata,
        })
    }

    async fn install(&self, dependency: &MatchedDependency) -> PylayerResult<LayerMetadata> {
        self.emitter.process("Executing build process");
        self.emitter.subprocess(&format!(
            "Installing {} {}",
            self.display_name, dependency.version
        ));

        let started = Instant::now();
        let spinner = TaskSpinner::start(self.emitter.context(), "Downloading");
        let result = self
            .installer
            .install(dependency, &self.store.layer_dir())
            .await;
        spinner.finish();
        result?;
        self.emitter.completed_in(started.elapsed());

        Ok(LayerMetadata::for_install(dependency, self.clock.now()))
    }

    fn advance(&self, from: BuildState, to: BuildState) -> BuildState {
        debug!("Build state {} -> {}", from, to);
        to
    }

    fn fail(&self, from: BuildState, to: BuildState) {
        warn!("Build state {} -> {}", from, to);
    }
}
