//! Dependency-aware ingestion order
//!
//! A request is either a single context name or a literal list of sources.
//! After expansion the list is de-duplicated, checked against the registry
//! and topologically sorted on `depends_on`, with the requested position as
//! the tie-break: a request that already respects its dependencies comes
//! back unchanged.

use super::context::ContextConfig;
use super::registry::SourceRegistry;
use super::{OrderError, OrderResult};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// What to do when a source depends on one outside the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DependencyPolicy {
    /// Fail the batch
    #[default]
    Strict,
    /// Assume an earlier batch ingested it; warn only
    AssumeIngested,
}

/// SABs of a named context; empty for an unknown name.
pub fn expand_context(name: &str, contexts: &ContextConfig) -> Vec<String> {
    contexts.expand(name)
}

/// Resolve a request into the sequence of registry keys to ingest.
pub fn resolve_order<S: AsRef<str>>(
    requested: &[S],
    contexts: &ContextConfig,
    registry: &SourceRegistry,
    policy: DependencyPolicy,
) -> OrderResult<Vec<String>> {
    let tokens: Vec<&str> = requested
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err(OrderError::NoSources);
    }

    let expanded: Vec<String> = match tokens.as_slice() {
        [single] if contexts.is_context(single) => {
            let sabs = contexts.expand(single);
            debug!(context = *single, sources = ?sabs, "expanded context");
            sabs
        }
        _ => tokens.iter().map(|t| t.to_uppercase()).collect(),
    };

    let mut seen = HashSet::new();
    let mut batch = Vec::with_capacity(expanded.len());
    for sab in expanded {
        if seen.insert(sab.clone()) {
            batch.push(sab);
        } else {
            warn!(sab = %sab, "source requested more than once; ingesting it once");
        }
    }
    if batch.is_empty() {
        return Err(OrderError::NoSources);
    }

    let unknown: Vec<String> = batch.iter().filter(|s| !registry.contains(s)).cloned().collect();
    if !unknown.is_empty() {
        return Err(OrderError::UnknownSources(unknown));
    }

    topological_order(batch, registry, policy)
}

/// Kahn's algorithm over in-batch dependencies; ready sources leave in
/// requested order.
fn topological_order(
    batch: Vec<String>,
    registry: &SourceRegistry,
    policy: DependencyPolicy,
) -> OrderResult<Vec<String>> {
    let position: HashMap<&str, usize> = batch.iter().enumerate().map(|(i, s)| (s.as_str(), i)).collect();

    let mut in_degree = vec![0usize; batch.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); batch.len()];
    for (i, sab) in batch.iter().enumerate() {
        let deps = registry.get(sab).map(|e| e.depends_on.as_slice()).unwrap_or_default();
        let mut counted = HashSet::new();
        for dep in deps {
            let dep = dep.trim().to_uppercase();
            match position.get(dep.as_str()) {
                Some(&j) => {
                    if counted.insert(j) {
                        in_degree[i] += 1;
                        dependents[j].push(i);
                    }
                }
                None => match policy {
                    DependencyPolicy::Strict => {
                        return Err(OrderError::MissingDependency {
                            sab: sab.clone(),
                            dependency: dep,
                        })
                    }
                    DependencyPolicy::AssumeIngested => {
                        warn!(sab = %sab, dependency = %dep, "dependency not in batch; assuming it was ingested earlier");
                    }
                },
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..batch.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(batch.len());
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &d in &dependents[i] {
            in_degree[d] -= 1;
            if in_degree[d] == 0 {
                ready.insert(d);
            }
        }
    }

    if order.len() < batch.len() {
        let placed: HashSet<usize> = order.iter().copied().collect();
        let cycle = (0..batch.len())
            .filter(|i| !placed.contains(i))
            .map(|i| batch[i].clone())
            .collect();
        return Err(OrderError::DependencyCycle(cycle));
    }

    if order.iter().enumerate().any(|(k, &i)| k != i) {
        debug!("reordered request to satisfy dependencies");
    }
    Ok(order.into_iter().map(|i| batch[i].clone()).collect())
}
