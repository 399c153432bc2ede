//! Whole-run graph construction.
//!
//! Ties the per-provider resolver together into one run over every provider
//! declaration: resolve each provider, survive panics by degrading the
//! affected provider to a diagnostic, and assign collision-free names over
//! the combined result.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::call_site::CallSiteRef;
use crate::catalog::TypeCatalog;
use crate::diagnostics::{descriptors, Diagnostic};
use crate::error::GraphError;
use crate::naming::NameMap;
use crate::registration::{KnownTypes, ProviderDescription};
use crate::resolver::GraphResolver;
use crate::type_ref::TypeRef;

/// One fully resolved provider: its root call sites and everything reported
/// while resolving them.
#[derive(Debug)]
pub struct ServiceProvider {
    pub ty: TypeRef,
    /// Deduplicated root call sites, in root-service declaration order.
    pub root_call_sites: Vec<CallSiteRef>,
    pub known_types: KnownTypes,
    pub diagnostics: Vec<Diagnostic>,
}

impl ServiceProvider {
    /// True if any diagnostic blocks code generation for this provider.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Input of one graph construction run.
#[derive(Debug, Default)]
pub struct GraphRequest {
    pub providers: Vec<ProviderDescription>,
    pub catalog: TypeCatalog,
}

/// Output of one graph construction run.
#[derive(Debug)]
pub struct ServiceGraph {
    pub providers: Vec<ServiceProvider>,
    /// Collision-free member names over every provider's call sites.
    pub names: NameMap,
    /// Run-level diagnostics not attributable to a single provider's
    /// registrations.
    pub diagnostics: Vec<Diagnostic>,
}

impl ServiceGraph {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
            || self.providers.iter().any(ServiceProvider::has_errors)
    }
}

/// Resolves every provider in the request into a [`ServiceGraph`].
///
/// Never panics: a panic while resolving one provider is caught, converted
/// to [`GraphError::Unexpected`], and reported as a diagnostic on the run.
pub fn build_service_graph(request: &GraphRequest) -> ServiceGraph {
    let mut providers = Vec::with_capacity(request.providers.len());
    let mut run_diagnostics = Vec::new();

    for description in &request.providers {
        let resolved = panic::catch_unwind(AssertUnwindSafe(|| {
            let resolver = GraphResolver::new(description, &request.catalog);
            resolver.run()
        }));
        match resolved {
            Ok((root_call_sites, diagnostics)) => {
                providers.push(ServiceProvider {
                    ty: description.ty.clone(),
                    root_call_sites,
                    known_types: description.known_types.clone(),
                    diagnostics,
                });
            }
            Err(payload) => {
                let failure = GraphError::Unexpected(panic_message(payload.as_ref()));
                error!(provider = %description.ty, %failure, "provider resolution panicked");
                run_diagnostics.push(Diagnostic::new(
                    &descriptors::UNEXPECTED_ERROR,
                    vec![failure.to_string()],
                    description.location.clone(),
                ));
            }
        }
    }

    let names = NameMap::from_providers(&providers);
    debug!(
        providers = providers.len(),
        diagnostics = run_diagnostics.len(),
        "graph construction finished"
    );
    ServiceGraph {
        providers,
        names,
        diagnostics: run_diagnostics,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
