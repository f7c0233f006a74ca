//! Entity routes: a collection path and a member path per kind, all under one state.

use crate::handlers::entity::{bulk_update, create, delete as delete_handler, list, read, update};
use crate::model::{Admin, AskQuestion, Campus, Exercise, OrderTeacher, Student, Teacher};
use crate::service::AdminEntity;
use crate::state::AppState;
use axum::{
    routing::{get, MethodRouter},
    Router,
};

fn collection<E: AdminEntity>() -> MethodRouter<AppState> {
    get(list::<E>).post(create::<E>)
}

fn member<E: AdminEntity>() -> MethodRouter<AppState> {
    get(read::<E>).put(update::<E>).delete(delete_handler::<E>)
}

fn mount<E: AdminEntity>(router: Router<AppState>, collection: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(&format!("/{}", E::PATH), collection)
        .route(&format!("/{}/:id", E::PATH), member::<E>())
}

pub fn admin_routes(state: AppState) -> Router {
    let router = Router::new();
    let router = mount::<Student>(router, collection::<Student>());
    let router = mount::<Teacher>(router, collection::<Teacher>());
    let router = mount::<Admin>(router, collection::<Admin>());
    let router = mount::<Campus>(router, collection::<Campus>().put(bulk_update::<Campus>));
    let router = mount::<Exercise>(router, collection::<Exercise>());
    let router = mount::<OrderTeacher>(router, collection::<OrderTeacher>());
    let router = mount::<AskQuestion>(router, collection::<AskQuestion>());
    router.with_state(state)
}
