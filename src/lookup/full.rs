//! Full-word lookup: discovery, then every granular section and every
//! sense enrichment in one bounded pool under the batch deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::error::{FailureKind, LookupError, TaskFailure, TaskResult};
use crate::lookup::discovery::DiscoveryPolicy;
use crate::lookup::enrichment::enrich_sense;
use crate::lookup::fanout::{Pending, TaskScope};
use crate::lookup::granular::{self, or_default, EntryContext};
use crate::lookup::{validate_word, DictionaryService};
use crate::models::{DetailedSense, FullLookupResponse, IndexedSense, SenseFailure};

/// Granular sections fetched alongside the senses.
const GRANULAR_TASKS: usize = 5;

impl DictionaryService {
    pub async fn lookup_word(&self, word: Option<&str>) -> Result<FullLookupResponse, LookupError> {
        let word = validate_word(word)?;
        let started = Instant::now();

        let discovery = self.discover(&word, DiscoveryPolicy::AllowAiFallback).await?;
        let senses = discovery.senses();

        let pool_size = self.enrichment.max_workers.min(GRANULAR_TASKS + senses.len()).max(1);
        let pool = Arc::new(Semaphore::new(pool_size));
        tracing::info!(
            "Full lookup for '{word}': {} entries, {} senses, pool of {pool_size}",
            discovery.entries.len(),
            senses.len()
        );

        let mut scope = TaskScope::with_deadline(self.batch_deadline());
        let ctx = Arc::new(EntryContext::whole_word(&discovery.entries));

        let inputs = |name: &'static str| (self.gateway.clone(), word.clone(), ctx.clone(), name);
        let etymology = {
            let (gw, w, ctx, name) = inputs("etymology");
            spawn_pooled(&mut scope, &pool, name, async move { granular::etymology(&gw, &w, &ctx).await })
        };
        let word_family = {
            let (gw, w, ctx, name) = inputs("word_family");
            spawn_pooled(&mut scope, &pool, name, async move { granular::word_family(&gw, &w, &ctx).await })
        };
        let usage_context = {
            let (gw, w, ctx, name) = inputs("usage_context");
            spawn_pooled(&mut scope, &pool, name, async move { granular::usage_context(&gw, &w, &ctx).await })
        };
        let cultural_notes = {
            let (gw, w, ctx, name) = inputs("cultural_notes");
            spawn_pooled(&mut scope, &pool, name, async move { granular::cultural_notes(&gw, &w, &ctx).await })
        };
        let frequency = {
            let (gw, w, ctx, name) = inputs("frequency");
            spawn_pooled(&mut scope, &pool, name, async move { granular::frequency(&gw, &w, &ctx).await })
        };

        let deadline = self.sense_deadline();
        let sense_tasks: Vec<(usize, usize, Pending<Result<DetailedSense, LookupError>>)> = senses
            .iter()
            .map(|s| {
                let task = format!("sense[{}:{}]", s.entry_index, s.sense_index);
                let (gateway, word) = (self.gateway.clone(), word.clone());
                let (pos, stub) = (s.part_of_speech.to_string(), s.stub.clone());
                let pending = spawn_pooled(&mut scope, &pool, task, async move {
                    Ok(enrich_sense(&gateway, &word, &pos, &stub, deadline).await)
                });
                (s.entry_index, s.sense_index, pending)
            })
            .collect();

        let etymology = or_default(scope.join(etymology).await);
        let word_family = or_default(scope.join(word_family).await);
        let usage_context = or_default(scope.join(usage_context).await);
        let cultural_notes = or_default(scope.join(cultural_notes).await);
        let frequency = or_default(scope.join(frequency).await);

        let mut detailed_senses = Vec::with_capacity(sense_tasks.len());
        let mut failed_senses = Vec::new();
        for (entry_index, sense_index, pending) in sense_tasks {
            let error = match scope.join(pending).await {
                Ok(Ok(sense)) => {
                    detailed_senses.push(IndexedSense {
                        entry_index,
                        sense_index,
                        sense,
                    });
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(failure) => failure.to_string(),
            };
            tracing::warn!("Sense [{entry_index}:{sense_index}] of '{word}' failed: {error}");
            failed_senses.push(SenseFailure {
                entry_index,
                sense_index,
                error,
            });
        }

        let execution_time = started.elapsed().as_secs_f64();
        tracing::info!(
            "Full lookup for '{word}' done in {execution_time:.2}s ({} ok, {} failed)",
            detailed_senses.len(),
            failed_senses.len()
        );

        Ok(FullLookupResponse {
            headword: discovery.headword.clone(),
            pronunciation: discovery.pronunciation(),
            ipa: discovery.ipa(),
            data_source: discovery.provenance,
            frequency,
            etymology,
            word_family,
            usage_context,
            cultural_notes,
            detailed_senses,
            failed_senses,
            total_entries: discovery.entries.len(),
            total_senses: discovery.total_senses(),
            generated_at: Utc::now(),
            execution_time,
            success: true,
        })
    }
}

/// Spawn `fut` into the scope; it starts work only once it holds a pool
/// permit.
fn spawn_pooled<T, F>(
    scope: &mut TaskScope,
    pool: &Arc<Semaphore>,
    task: impl Into<String>,
    fut: F,
) -> Pending<T>
where
    T: Send + 'static,
    F: Future<Output = TaskResult<T>> + Send + 'static,
{
    let task = task.into();
    let pool = pool.clone();
    let name = task.clone();
    scope.spawn(task, async move {
        let _permit = pool.acquire_owned().await.map_err(|e| {
            TaskFailure::new(name, FailureKind::Transport, format!("worker pool closed: {e}"))
        })?;
        fut.await
    })
}
