//! Binds each entity kind to its URL segment, its accessor, the foreign keys a write must
//! satisfy, and the lookups that enrich its views.

use crate::accessor::Accessor;
use crate::error::AppError;
use crate::model::{Admin, AskQuestion, Campus, Exercise, OrderTeacher, Record, Student, Teacher};
use crate::rules::Prepare;
use crate::service::compose::{Composer, Lookup};
use crate::state::Stores;
use async_trait::async_trait;
use std::sync::Arc;

/// `key` must name an existing record of `T`; a missing (zero) or dangling key is a
/// constraint violation.
async fn require_ref<R: Record, T: Record>(
    field: &'static str,
    key: i64,
    target: &dyn Accessor<T>,
) -> Result<(), AppError> {
    if key <= 0 {
        return Err(AppError::ConstraintViolation(format!(
            "{}.{} is required",
            R::KIND,
            field
        )));
    }
    match target.fetch_by_key(key).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound { .. }) => Err(AppError::ConstraintViolation(format!(
            "{}.{} references missing {} {}",
            R::KIND,
            field,
            T::KIND,
            key
        ))),
        Err(e) => Err(e),
    }
}

#[async_trait]
pub trait AdminEntity: Record + Prepare {
    /// URL segment under the admin router, e.g. `students`.
    const PATH: &'static str;
    /// When set, an empty list answers with the "empty" envelope code and this message.
    const EMPTY_LIST_MSG: Option<&'static str> = None;

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>>;

    /// Checked before insert and update. Deletes are not checked, so references may dangle later.
    async fn check_references(&self, _stores: &Stores) -> Result<(), AppError> {
        Ok(())
    }

    fn composer(stores: &Stores) -> Composer<Self> {
        Composer::new(Self::accessor(stores))
    }
}

#[async_trait]
impl AdminEntity for Student {
    const PATH: &'static str = "students";

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>> {
        stores.students.clone()
    }

    async fn check_references(&self, stores: &Stores) -> Result<(), AppError> {
        if let Some(cid) = self.cid {
            require_ref::<Self, Campus>("cid", cid, stores.campuses.as_ref()).await?;
        }
        Ok(())
    }

    fn composer(stores: &Stores) -> Composer<Self> {
        Composer::new(Self::accessor(stores)).with_rule(Lookup::new(
            "cid",
            |s: &Student| s.cid,
            stores.campuses.clone(),
            &["Cname"],
        ))
    }
}

#[async_trait]
impl AdminEntity for Teacher {
    const PATH: &'static str = "teachers";

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>> {
        stores.teachers.clone()
    }

    async fn check_references(&self, stores: &Stores) -> Result<(), AppError> {
        if let Some(cid) = self.cid {
            require_ref::<Self, Campus>("cid", cid, stores.campuses.as_ref()).await?;
        }
        Ok(())
    }

    fn composer(stores: &Stores) -> Composer<Self> {
        Composer::new(Self::accessor(stores)).with_rule(Lookup::new(
            "cid",
            |t: &Teacher| t.cid,
            stores.campuses.clone(),
            &["Cname"],
        ))
    }
}

impl AdminEntity for Admin {
    const PATH: &'static str = "admins";

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>> {
        stores.admins.clone()
    }
}

impl AdminEntity for Campus {
    const PATH: &'static str = "campuses";

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>> {
        stores.campuses.clone()
    }
}

#[async_trait]
impl AdminEntity for Exercise {
    const PATH: &'static str = "exercises";

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>> {
        stores.exercises.clone()
    }

    async fn check_references(&self, stores: &Stores) -> Result<(), AppError> {
        require_ref::<Self, Teacher>("tid", self.tid, stores.teachers.as_ref()).await
    }
}

#[async_trait]
impl AdminEntity for OrderTeacher {
    const PATH: &'static str = "order-teachers";
    const EMPTY_LIST_MSG: Option<&'static str> = Some("No Order Teacher!");

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>> {
        stores.order_teachers.clone()
    }

    async fn check_references(&self, stores: &Stores) -> Result<(), AppError> {
        require_ref::<Self, Student>("sid", self.sid, stores.students.as_ref()).await?;
        require_ref::<Self, Teacher>("tid", self.tid, stores.teachers.as_ref()).await
    }

    fn composer(stores: &Stores) -> Composer<Self> {
        Composer::new(Self::accessor(stores))
            .with_rule(Lookup::new(
                "sid",
                |o: &OrderTeacher| Some(o.sid),
                stores.students.clone(),
                &["Snickname"],
            ))
            .with_rule(Lookup::new(
                "tid",
                |o: &OrderTeacher| Some(o.tid),
                stores.teachers.clone(),
                &["Tnickname"],
            ))
    }
}

#[async_trait]
impl AdminEntity for AskQuestion {
    const PATH: &'static str = "ask-questions";

    fn accessor(stores: &Stores) -> Arc<dyn Accessor<Self>> {
        stores.ask_questions.clone()
    }

    async fn check_references(&self, stores: &Stores) -> Result<(), AppError> {
        require_ref::<Self, Student>("sid", self.sid, stores.students.as_ref()).await?;
        require_ref::<Self, Teacher>("tid", self.tid, stores.teachers.as_ref()).await?;
        require_ref::<Self, Exercise>("eid", self.eid, stores.exercises.as_ref()).await
    }

    fn composer(stores: &Stores) -> Composer<Self> {
        Composer::new(Self::accessor(stores))
            .with_rule(Lookup::new(
                "sid",
                |q: &AskQuestion| Some(q.sid),
                stores.students.clone(),
                &["Snickname"],
            ))
            .with_rule(Lookup::new(
                "eid",
                |q: &AskQuestion| Some(q.eid),
                stores.exercises.clone(),
                &["Etitle"],
            ))
    }
}
