use std::collections::HashMap;
use std::sync::Arc;

use cowave_backend::{Backend, Filter, SelectQuery};
use cowave_types::{DataResult, WaveKind, WaveReaction, WaveSummary};
use serde_json::{Value, json};
use tracing::debug;

use crate::rows::WaveRow;
use crate::{backend_error, parse_row};

pub struct WaveRepo<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> WaveRepo<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Adds a wave of the given kind. Adding a kind the user already holds is
    /// treated as already-satisfied: the existing row is fetched and returned
    /// instead of surfacing the conflict.
    pub async fn add(
        &self,
        comment_id: &str,
        user_id: &str,
        kind: WaveKind,
    ) -> DataResult<WaveReaction> {
        let inserted = self
            .backend
            .insert(
                "wave_reactions",
                json!({
                    "comment_id": comment_id,
                    "user_id": user_id,
                    "kind": kind.as_str(),
                }),
            )
            .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if e.is_conflict() => {
                debug!(comment_id, kind = kind.as_str(), "wave already present");
                self.existing(comment_id, user_id, kind).await?
            }
            Err(e) => return Err(backend_error("adding the wave", e)),
        };

        Ok(parse_row::<WaveRow>("adding the wave", row)?.into_reaction())
    }

    async fn existing(
        &self,
        comment_id: &str,
        user_id: &str,
        kind: WaveKind,
    ) -> DataResult<cowave_backend::Row> {
        let mut rows = self
            .backend
            .select(
                SelectQuery::table("wave_reactions")
                    .eq("comment_id", comment_id)
                    .eq("user_id", user_id)
                    .eq("kind", kind.as_str())
                    .limit(1),
            )
            .await
            .map_err(|e| backend_error("adding the wave", e))?;

        rows.pop().ok_or_else(|| {
            // Conflict on insert but nothing to read back: the row vanished
            // between the two calls. Surface it rather than guessing.
            cowave_types::DataError::unknown("adding the wave", "conflicting row disappeared")
        })
    }

    pub async fn remove(&self, comment_id: &str, user_id: &str, kind: WaveKind) -> DataResult<()> {
        self.backend
            .delete(
                "wave_reactions",
                vec![
                    Filter::Eq("comment_id", comment_id.into()),
                    Filter::Eq("user_id", user_id.into()),
                    Filter::Eq("kind", kind.as_str().into()),
                ],
            )
            .await
            .map_err(|e| backend_error("removing the wave", e))
    }

    /// Batch-fetches reactions for a set of comments and aggregates them into
    /// per-comment summaries. `viewer` marks which kinds are the caller's own.
    pub async fn summarize(
        &self,
        comment_ids: &[String],
        viewer: Option<&str>,
    ) -> DataResult<HashMap<String, WaveSummary>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Value> = comment_ids.iter().map(|id| Value::from(id.as_str())).collect();
        let rows = self
            .backend
            .select(SelectQuery::table("wave_reactions").is_in("comment_id", ids))
            .await
            .map_err(|e| backend_error("loading waves", e))?;

        let mut summaries: HashMap<String, WaveSummary> = HashMap::new();
        for row in rows {
            let reaction = parse_row::<WaveRow>("loading waves", row)?.into_reaction();
            let summary = summaries.entry(reaction.comment_id.clone()).or_default();
            summary.bump(reaction.kind);
            if viewer.is_some_and(|v| v == reaction.user_id) {
                summary.mine.push(reaction.kind);
            }
        }
        Ok(summaries)
    }
}
