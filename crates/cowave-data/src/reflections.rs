use std::sync::Arc;

use chrono::{NaiveDate, SecondsFormat, Utc};
use cowave_backend::{Backend, SelectQuery};
use cowave_types::api::NewReflection;
use cowave_types::{DataError, DataResult, Page, PageCursor, Reflection};
use serde_json::json;

use crate::rows::ReflectionRow;
use crate::{backend_error, load_page, parse_row};

pub const MAX_REFLECTION_LEN: usize = 4000;

pub struct ReflectionRepo<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> ReflectionRepo<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Writes the reflection for a date, replacing whatever was there.
    /// At most one reflection per user per date.
    pub async fn upsert_for_date(
        &self,
        user_id: &str,
        req: NewReflection,
    ) -> DataResult<Reflection> {
        let body = req.body.trim();
        if body.is_empty() {
            return Err(DataError::validation("Write a few words first."));
        }
        if body.chars().count() > MAX_REFLECTION_LEN {
            return Err(DataError::validation(format!(
                "Reflections can be up to {MAX_REFLECTION_LEN} characters."
            )));
        }

        let row = self
            .backend
            .upsert(
                "reflections",
                json!({
                    "user_id": user_id,
                    "for_date": req.for_date,
                    "body": body,
                    "is_public": req.is_public,
                    "updated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                }),
                &["user_id", "for_date"],
            )
            .await
            .map_err(|e| backend_error("saving the reflection", e))?;

        Ok(parse_row::<ReflectionRow>("saving the reflection", row)?.into_reflection())
    }

    pub async fn get_for_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> DataResult<Option<Reflection>> {
        let mut rows = self
            .backend
            .select(
                SelectQuery::table("reflections")
                    .eq("user_id", user_id)
                    .eq("for_date", date.to_string())
                    .limit(1),
            )
            .await
            .map_err(|e| backend_error("loading the reflection", e))?;

        match rows.pop() {
            Some(row) => Ok(Some(
                parse_row::<ReflectionRow>("loading the reflection", row)?.into_reflection(),
            )),
            None => Ok(None),
        }
    }

    /// A user's reflections, most recently written first.
    pub async fn list_page(
        &self,
        user_id: &str,
        limit: Option<u32>,
        cursor: Option<PageCursor>,
    ) -> DataResult<Page<Reflection>> {
        load_page(
            self.backend.as_ref(),
            "reflections",
            "user_id",
            user_id,
            limit,
            cursor,
            "loading reflections",
            |row: ReflectionRow| Ok(row.into_reflection()),
        )
        .await
    }
}
