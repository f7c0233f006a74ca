//! OpenAPI document listing the record schemas served by the admin API.

use crate::model::{Admin, AskQuestion, Campus, Exercise, OrderTeacher, Student, Teacher};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(components(schemas(Student, Teacher, Admin, Campus, Exercise, OrderTeacher, AskQuestion)))]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_record_has_a_schema() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = doc["components"]["schemas"].as_object().unwrap();
        for name in ["Student", "Teacher", "Admin", "Campus", "Exercise", "OrderTeacher", "AskQuestion"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
