use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub username: String, pub password: String, pub first_name: String, pub last_name: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct UserDoc { pub id: i32, pub username: String, pub first_name: String, pub last_name: String }

#[derive(ToSchema)]
pub struct SessionDoc { pub token: String, pub user: UserDoc }

#[derive(ToSchema)]
pub struct UpdateMeDoc {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub current_password: Option<String>,
}

#[derive(ToSchema)]
pub struct NewTaskDoc {
    pub title: String,
    pub description: Option<String>,
    /// RFC 3339
    pub due_date: Option<String>,
    pub is_done: Option<bool>,
    pub label_ids: Option<Vec<i32>>,
}

/// Absent fields stay unchanged; `"due_date": null` clears the date.
#[derive(ToSchema)]
pub struct TaskPatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub is_done: Option<bool>,
}

#[derive(ToSchema)]
pub struct NewLabelDoc {
    pub name: String,
    /// `#rrggbb`, defaults to `#888888`
    pub color: Option<String>,
    pub is_column: Option<bool>,
}

#[derive(ToSchema)]
pub struct LabelPatchDoc {
    pub name: Option<String>,
    pub color: Option<String>,
    pub is_column: Option<bool>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::signup,
        crate::routes::auth::authenticate,
        crate::routes::users::me,
        crate::routes::users::update_me,
        crate::routes::users::delete_me,
        crate::routes::tasks::list,
        crate::routes::tasks::create,
        crate::routes::tasks::get,
        crate::routes::tasks::update,
        crate::routes::tasks::delete,
        crate::routes::tasks::labels,
        crate::routes::tasks::set_labels,
        crate::routes::labels::list,
        crate::routes::labels::create,
        crate::routes::labels::get,
        crate::routes::labels::update,
        crate::routes::labels::delete,
        crate::routes::labels::tasks,
        crate::routes::views::week,
        crate::routes::views::month,
        crate::routes::views::list,
        crate::routes::events::stream,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            UserDoc,
            SessionDoc,
            UpdateMeDoc,
            NewTaskDoc,
            TaskPatchDoc,
            NewLabelDoc,
            LabelPatchDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "tasks"),
        (name = "labels"),
        (name = "views"),
        (name = "events")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/users", "/authenticate", "/users/me", "/tasks/{id}/labels", "/views/month", "/events"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["components"]["securitySchemes"]["bearer"].is_object());
    }
}
