use std::sync::Arc;

use cowave_backend::{Backend, SelectQuery};
use cowave_types::{Achievement, DataResult};
use serde_json::json;
use tracing::debug;

use crate::rows::AchievementRow;
use crate::{backend_error, parse_row};

pub struct AchievementRepo<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> AchievementRepo<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn list_for_user(&self, user_id: &str) -> DataResult<Vec<Achievement>> {
        let rows = self
            .backend
            .select(
                SelectQuery::table("achievements")
                    .eq("user_id", user_id)
                    .newest_first(),
            )
            .await
            .map_err(|e| backend_error("loading achievements", e))?;

        rows.into_iter()
            .map(|row| {
                parse_row::<AchievementRow>("loading achievements", row)
                    .map(AchievementRow::into_achievement)
            })
            .collect()
    }

    /// Unlocks an achievement. Unlocking one the user already holds is a
    /// silent success returning the existing row.
    pub async fn unlock(&self, user_id: &str, key: &str) -> DataResult<Achievement> {
        let inserted = self
            .backend
            .insert(
                "achievements",
                json!({ "user_id": user_id, "key": key }),
            )
            .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if e.is_conflict() => {
                debug!(key, "achievement already unlocked");
                let mut rows = self
                    .backend
                    .select(
                        SelectQuery::table("achievements")
                            .eq("user_id", user_id)
                            .eq("key", key)
                            .limit(1),
                    )
                    .await
                    .map_err(|e| backend_error("unlocking the achievement", e))?;
                rows.pop().ok_or_else(|| {
                    cowave_types::DataError::unknown(
                        "unlocking the achievement",
                        "conflicting row disappeared",
                    )
                })?
            }
            Err(e) => return Err(backend_error("unlocking the achievement", e)),
        };

        Ok(parse_row::<AchievementRow>("unlocking the achievement", row)?.into_achievement())
    }
}
