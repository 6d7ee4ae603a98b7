mod document;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{
    config::AppConfig,
    database::MongoDB,
    middleware::auth::{claims_from_request, require_admin, require_user},
    services::{
        admin_service, auth_service, contact_service, dashboard_service, job_service, university_service,
        user_service, Mailer,
    },
    utils::{error::AppError, jwt::Claims},
};

use document::{resolve_fields, Directive, Document, Field, Operation, OperationKind, Selection, TypeRef, Variables};

/// Standard GraphQL-over-HTTP request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: Option<String>,
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Option<Value>,
}

#[derive(Debug, Serialize)]
struct GraphQLError {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    path: Vec<String>,
}

/// Root fields, the operation type exposing them, and their result type.
const ROOT_FIELDS: &[(&str, OperationKind, &str)] = &[
    ("admins", OperationKind::Query, "Admin"),
    ("admin", OperationKind::Query, "Admin"),
    ("users", OperationKind::Query, "User"),
    ("user", OperationKind::Query, "User"),
    ("me", OperationKind::Query, "User"),
    ("universities", OperationKind::Query, "University"),
    ("university", OperationKind::Query, "University"),
    ("jobs", OperationKind::Query, "Job"),
    ("job", OperationKind::Query, "Job"),
    ("dashboardStats", OperationKind::Query, "DashboardStats"),
    ("createAdmin", OperationKind::Mutation, "Admin"),
    ("updateAdmin", OperationKind::Mutation, "Admin"),
    ("deleteAdmin", OperationKind::Mutation, "Boolean"),
    ("adminLogin", OperationKind::Mutation, "AdminAuthPayload"),
    ("createUser", OperationKind::Mutation, "User"),
    ("updateUser", OperationKind::Mutation, "User"),
    ("deleteUser", OperationKind::Mutation, "Boolean"),
    ("createUniversity", OperationKind::Mutation, "University"),
    ("updateUniversity", OperationKind::Mutation, "University"),
    ("deleteUniversity", OperationKind::Mutation, "Boolean"),
    ("createJob", OperationKind::Mutation, "Job"),
    ("updateJob", OperationKind::Mutation, "Job"),
    ("deleteJob", OperationKind::Mutation, "Boolean"),
    ("applyForJob", OperationKind::Mutation, "Job"),
    ("submitContactForm", OperationKind::Mutation, "Boolean"),
    ("submitPartnerInquiry", OperationKind::Mutation, "Boolean"),
];

fn root_type(kind: OperationKind, field: &str) -> Option<&'static str> {
    ROOT_FIELDS
        .iter()
        .find(|(name, k, _)| *name == field && *k == kind)
        .map(|(_, _, ty)| *ty)
}

/// Type name reported by `__typename` for nested objects.
fn child_type(parent: &str, field: &str) -> &'static str {
    match (parent, field) {
        ("University", "courses") => "Course",
        ("Job", "applications") => "Application",
        ("AdminAuthPayload", "admin") => "Admin",
        _ => "Object",
    }
}

/// Coerces the request's variables against the operation's definitions.
fn coerce_variables(operation: &Operation, provided: Option<&Value>) -> Result<Variables, AppError> {
    let provided = match provided {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(AppError::validation("Variables must be an object.")),
    };

    let mut vars = Variables::new();
    for definition in &operation.variables {
        let value = match provided.get(&definition.name) {
            Some(value) => Some(value.clone()),
            None => match &definition.default {
                Some(default) => default.resolve(&Variables::new())?,
                None => None,
            },
        };
        if matches!(definition.ty, TypeRef::NonNull(_)) && value.as_ref().map_or(true, Value::is_null) {
            return Err(AppError::validation(format!(
                "Variable '${}' of required type '{}' was not provided.",
                definition.name, definition.ty
            )));
        }
        vars.insert(definition.name.clone(), value);
    }
    Ok(vars)
}

fn directive_condition(directive: &Directive, vars: &Variables) -> Result<bool, AppError> {
    match resolve_fields(&directive.arguments, vars)?.get("if") {
        Some(Value::Bool(condition)) => Ok(*condition),
        _ => Err(AppError::validation(format!(
            "Directive '@{}' requires a Boolean 'if' argument.",
            directive.name
        ))),
    }
}

/// Applies `@skip` and `@include`.
fn included(directives: &[Directive], vars: &Variables) -> Result<bool, AppError> {
    for directive in directives {
        let keep = match directive.name.as_str() {
            "skip" => !directive_condition(directive, vars)?,
            "include" => directive_condition(directive, vars)?,
            other => return Err(AppError::validation(format!("Unknown directive '@{}'.", other))),
        };
        if !keep {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Nested objects without a mapped type accept any fragment.
fn applies(type_condition: Option<&str>, type_name: &str) -> bool {
    type_condition.map_or(true, |condition| condition == type_name || type_name == "Object")
}

/// A field after fragments are expanded; same-key fields are merged.
struct CollectedField<'d> {
    key: String,
    field: &'d Field,
    selections: Vec<&'d Selection>,
}

/// Shapes resolver output to the requested selection sets.
struct Projection<'d> {
    document: &'d Document,
    vars: &'d Variables,
}

impl<'d> Projection<'d> {
    fn collect(&self, selections: &[&'d Selection], type_name: &str) -> Result<Vec<CollectedField<'d>>, AppError> {
        let mut fields = Vec::new();
        self.collect_into(selections.iter().copied(), type_name, &mut fields, &mut Vec::new())?;
        Ok(fields)
    }

    fn collect_into<I>(
        &self,
        selections: I,
        type_name: &str,
        fields: &mut Vec<CollectedField<'d>>,
        visiting: &mut Vec<&'d str>,
    ) -> Result<(), AppError>
    where
        I: IntoIterator<Item = &'d Selection>,
    {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if !included(&field.directives, self.vars)? {
                        continue;
                    }
                    let key = field.response_key();
                    match fields.iter_mut().find(|c| c.key == key) {
                        Some(existing) if existing.field.name != field.name => {
                            return Err(AppError::validation(format!(
                                "Fields '{}' conflict because '{}' and '{}' are different fields.",
                                key, existing.field.name, field.name
                            )));
                        }
                        Some(existing) => existing.selections.extend(field.selection_set.iter()),
                        None => fields.push(CollectedField {
                            key: key.to_string(),
                            field,
                            selections: field.selection_set.iter().collect(),
                        }),
                    }
                }
                Selection::FragmentSpread { name, directives } => {
                    if !included(directives, self.vars)? {
                        continue;
                    }
                    if visiting.contains(&name.as_str()) {
                        return Err(AppError::validation(format!(
                            "Cannot spread fragment '{}' within itself.",
                            name
                        )));
                    }
                    let fragment = self
                        .document
                        .fragments
                        .get(name)
                        .ok_or_else(|| AppError::validation(format!("Unknown fragment '{}'.", name)))?;
                    if !applies(Some(fragment.type_condition.as_str()), type_name) {
                        continue;
                    }
                    visiting.push(name);
                    self.collect_into(fragment.selection_set.iter(), type_name, fields, visiting)?;
                    visiting.pop();
                }
                Selection::InlineFragment { type_condition, directives, selection_set } => {
                    if applies(type_condition.as_deref(), type_name) && included(directives, self.vars)? {
                        self.collect_into(selection_set.iter(), type_name, fields, visiting)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn project(&self, value: Value, selections: &[&'d Selection], type_name: &'static str) -> Result<Value, AppError> {
        if selections.is_empty() {
            return Ok(value);
        }
        let fields = self.collect(selections, type_name)?;
        self.project_fields(value, &fields, type_name)
    }

    fn project_fields(
        &self,
        value: Value,
        fields: &[CollectedField<'d>],
        type_name: &'static str,
    ) -> Result<Value, AppError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.project_fields(item, fields, type_name))
                .collect::<Result<Vec<_>, AppError>>()
                .map(Value::Array),
            Value::Object(object) => {
                let mut out = Map::new();
                for field in fields {
                    let name = field.field.name.as_str();
                    let value = if name == "__typename" {
                        Value::String(type_name.to_string())
                    } else {
                        object.get(name).cloned().unwrap_or(Value::Null)
                    };
                    out.insert(
                        field.key.clone(),
                        self.project(value, &field.selections, child_type(type_name, name))?,
                    );
                }
                Ok(Value::Object(out))
            }
            scalar => Ok(scalar),
        }
    }
}

struct Context<'a> {
    db: &'a MongoDB,
    config: &'a AppConfig,
    mailer: &'a dyn Mailer,
    claims: Result<Option<Claims>, AppError>,
}

impl Context<'_> {
    fn checked_claims(&self) -> Result<Option<&Claims>, AppError> {
        self.claims.as_ref().map(Option::as_ref).map_err(|e| e.clone())
    }

    fn admin(&self) -> Result<&Claims, AppError> {
        require_admin(self.checked_claims()?)
    }

    fn user(&self) -> Result<&Claims, AppError> {
        require_user(self.checked_claims()?)
    }

    /// Public resolvers ignore a bad token instead of failing.
    fn is_admin(&self) -> bool {
        matches!(&self.claims, Ok(Some(claims)) if claims.is_admin())
    }
}

fn arg<T: DeserializeOwned>(args: &Value, name: &str) -> Result<T, AppError> {
    let raw = args.get(name).cloned().unwrap_or(Value::Null);
    serde_json::from_value(raw).map_err(|e| match args.get(name) {
        None => AppError::validation(format!("Argument '{}' is required", name)),
        Some(_) => AppError::validation(format!("Invalid value for argument '{}': {}", name, e)),
    })
}

fn args<T: DeserializeOwned>(args: &Value) -> Result<T, AppError> {
    serde_json::from_value(args.clone()).map_err(|e| AppError::validation(format!("Invalid arguments: {}", e)))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

async fn resolve(ctx: &Context<'_>, field: &str, params: &Value) -> Result<Value, AppError> {
    let db = ctx.db;
    match field {
        // Admins
        "admins" => {
            ctx.admin()?;
            to_json(admin_service::list_admins(db, &args(params)?).await?)
        }
        "admin" => {
            ctx.admin()?;
            to_json(admin_service::get_admin(db, &arg::<String>(params, "id")?).await?)
        }
        "createAdmin" => {
            ctx.admin()?;
            to_json(admin_service::create_admin(db, arg(params, "input")?).await?)
        }
        "updateAdmin" => {
            ctx.admin()?;
            let id: String = arg(params, "id")?;
            to_json(admin_service::update_admin(db, &id, arg(params, "input")?).await?)
        }
        "deleteAdmin" => {
            ctx.admin()?;
            to_json(admin_service::delete_admin(db, &arg::<String>(params, "id")?).await?)
        }
        "adminLogin" => to_json(admin_service::admin_login(db, &ctx.config.jwt, &args(params)?).await?),

        // Users
        "users" => {
            ctx.admin()?;
            to_json(user_service::list_users(db, &args(params)?).await?)
        }
        "user" => {
            ctx.admin()?;
            to_json(user_service::get_user(db, &arg::<String>(params, "id")?).await?)
        }
        "createUser" => {
            ctx.admin()?;
            to_json(user_service::create_user(db, arg(params, "input")?).await?)
        }
        "updateUser" => {
            ctx.admin()?;
            let id: String = arg(params, "id")?;
            to_json(user_service::update_user(db, &id, arg(params, "input")?).await?)
        }
        "deleteUser" => {
            ctx.admin()?;
            to_json(user_service::delete_user(db, &arg::<String>(params, "id")?).await?)
        }
        "me" => {
            let claims = ctx.user()?;
            to_json(auth_service::current_user(db, claims).await?)
        }

        // Universities
        "universities" => to_json(university_service::list_universities(db, &args(params)?).await?),
        "university" => to_json(university_service::get_university(db, &arg::<String>(params, "id")?).await?),
        "createUniversity" => {
            ctx.admin()?;
            to_json(university_service::create_university(db, arg(params, "input")?).await?)
        }
        "updateUniversity" => {
            ctx.admin()?;
            let id: String = arg(params, "id")?;
            to_json(university_service::update_university(db, &id, arg(params, "input")?).await?)
        }
        "deleteUniversity" => {
            ctx.admin()?;
            to_json(university_service::delete_university(db, &arg::<String>(params, "id")?).await?)
        }

        // Jobs
        "jobs" => to_json(job_service::list_jobs(db, &args(params)?, ctx.is_admin()).await?),
        "job" => to_json(job_service::get_job(db, &arg::<String>(params, "id")?, ctx.is_admin()).await?),
        "createJob" => {
            ctx.admin()?;
            to_json(job_service::create_job(db, arg(params, "input")?).await?)
        }
        "updateJob" => {
            ctx.admin()?;
            let id: String = arg(params, "id")?;
            to_json(job_service::update_job(db, &id, arg(params, "input")?).await?)
        }
        "deleteJob" => {
            ctx.admin()?;
            to_json(job_service::delete_job(db, &arg::<String>(params, "id")?).await?)
        }
        "applyForJob" => {
            let job_id: String = arg(params, "jobId")?;
            to_json(job_service::apply_for_job(db, &job_id, arg(params, "input")?).await?)
        }

        // Forms
        "submitContactForm" => to_json(
            contact_service::submit_contact_form(ctx.config, ctx.mailer, &arg(params, "input")?).await?,
        ),
        "submitPartnerInquiry" => to_json(
            contact_service::submit_partner_inquiry(ctx.config, ctx.mailer, &arg(params, "input")?).await?,
        ),

        "dashboardStats" => {
            ctx.admin()?;
            to_json(dashboard_service::dashboard_stats(db).await?)
        }

        other => Err(AppError::validation(format!("Cannot query field '{}'", other))),
    }
}

fn request_error(error: AppError) -> Value {
    log::warn!("❌ GraphQL request rejected: {}", error);
    json!({ "errors": [GraphQLError { message: error.message().to_string(), path: Vec::new() }] })
}

/// Parses, validates and runs one request. Errors before execution come back
/// without `data`; a failing root field nulls `data` and reports its path.
async fn execute(ctx: &Context<'_>, request: &GraphQLRequest) -> Value {
    let query = match request.query.as_deref() {
        Some(query) if !query.trim().is_empty() => query,
        _ => return request_error(AppError::validation("Must provide query string.")),
    };
    let document = match Document::parse(query) {
        Ok(document) => document,
        Err(e) => return request_error(e),
    };
    let operation = match document.operation(request.operation_name.as_deref()) {
        Ok(operation) => operation,
        Err(e) => return request_error(e),
    };
    if operation.kind == OperationKind::Subscription {
        return request_error(AppError::validation("Subscriptions are not supported."));
    }
    let vars = match coerce_variables(operation, request.variables.as_ref()) {
        Ok(vars) => vars,
        Err(e) => return request_error(e),
    };

    let projection = Projection { document: &document, vars: &vars };
    let root: Vec<&Selection> = operation.selection_set.iter().collect();
    let type_name = operation.kind.type_name();
    let fields = match projection.collect(&root, type_name) {
        Ok(fields) => fields,
        Err(e) => return request_error(e),
    };
    if let Some(unknown) = fields
        .iter()
        .find(|f| f.field.name != "__typename" && root_type(operation.kind, &f.field.name).is_none())
    {
        return request_error(AppError::validation(format!(
            "Cannot query field '{}' on type '{}'.",
            unknown.field.name, type_name
        )));
    }

    let names: Vec<&str> = fields.iter().map(|f| f.field.name.as_str()).collect();
    log::info!("🧭 GraphQL {} {}", type_name, names.join(", "));

    let mut data = Map::new();
    let mut errors = Vec::new();
    for field in &fields {
        let name = field.field.name.as_str();
        let Some(result_type) = root_type(operation.kind, name) else {
            data.insert(field.key.clone(), Value::String(type_name.to_string()));
            continue;
        };

        let outcome = match resolve_fields(&field.field.arguments, &vars) {
            Ok(params) => resolve(ctx, name, &Value::Object(params)).await,
            Err(e) => Err(e),
        }
        .and_then(|value| projection.project(value, &field.selections, result_type));

        match outcome {
            Ok(value) => {
                data.insert(field.key.clone(), value);
            }
            Err(e) => {
                log::warn!("❌ GraphQL {} failed: {}", name, e);
                errors.push(GraphQLError { message: e.message().to_string(), path: vec![field.key.clone()] });
            }
        }
    }

    if errors.is_empty() {
        json!({ "data": data })
    } else {
        json!({ "data": null, "errors": errors })
    }
}

/// POST /graphql
pub async fn graphql(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<GraphQLRequest>,
) -> HttpResponse {
    let ctx = Context {
        db: &db,
        config: &config,
        mailer: mailer.get_ref(),
        claims: claims_from_request(&req, &config.jwt),
    };

    HttpResponse::Ok().json(execute(&ctx, &body).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::database::testing::lazy_handle;
    use crate::services::mail_service::testing::RecordingMailer;
    use crate::utils::jwt::{issue_token, TokenSubject};
    use actix_web::{test as actix_test, App};
    use std::sync::Arc;

    fn project(query: &str, value: Value) -> Value {
        let document = Document::parse(query).unwrap();
        let operation = document.operation(None).unwrap();
        let vars = coerce_variables(operation, None).unwrap();
        let projection = Projection { document: &document, vars: &vars };
        let root: Vec<&Selection> = operation.selection_set.iter().collect();
        let fields = projection.collect(&root, operation.kind.type_name()).unwrap();
        let field = &fields[0];
        projection
            .project(value, &field.selections, root_type(operation.kind, &field.field.name).unwrap())
            .unwrap()
    }

    #[test]
    fn test_selection_set_shapes_result() {
        let university = json!({
            "id": "u1",
            "name": "TU Munich",
            "country": "Germany",
            "courses": [{ "name": "MSc Informatics", "level": "Masters", "intakeMonth": "October" }]
        });
        let shaped = project(
            "{ universities { title: name courses { name __typename } ...Where } } fragment Where on University { country }",
            json!([university]),
        );
        assert_eq!(
            shaped,
            json!([{
                "title": "TU Munich",
                "courses": [{ "name": "MSc Informatics", "__typename": "Course" }],
                "country": "Germany"
            }])
        );
    }

    #[test]
    fn test_skip_and_include() {
        let job = json!({ "id": "j1", "title": "Counsellor", "status": "Open" });
        let shaped = project("{ job { id title @skip(if: true) status @include(if: false) __typename } }", job);
        assert_eq!(shaped, json!({ "id": "j1", "__typename": "Job" }));
    }

    #[test]
    fn test_required_variable_and_defaults() {
        let document = Document::parse("query Q($id: ID!, $order: String = \"asc\") { job(id: $id) { id } }").unwrap();
        let operation = document.operation(Some("Q")).unwrap();

        let err = coerce_variables(operation, Some(&json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Variable '$id' of required type 'ID!' was not provided.");

        let vars = coerce_variables(operation, Some(&json!({ "id": "abc" }))).unwrap();
        assert_eq!(vars["order"], Some(json!("asc")));
    }

    async fn call(body: Value, bearer: Option<String>) -> Value {
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::default());
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_handle().await))
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::from(mailer))
                .route("/graphql", web::post().to(graphql)),
        )
        .await;

        let mut req = actix_test::TestRequest::post().uri("/graphql").set_json(body);
        if let Some(token) = bearer {
            req = req.insert_header(("Authorization", format!("Bearer {}", token)));
        }
        actix_test::call_and_read_body_json(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn test_request_errors() {
        let body = call(json!({ "operationName": "jobs" }), None).await;
        assert_eq!(body["errors"][0]["message"], "Must provide query string.");
        assert!(body.get("data").is_none());

        let body = call(json!({ "query": "{ launchRocket { id } }" }), None).await;
        assert_eq!(body["errors"][0]["message"], "Cannot query field 'launchRocket' on type 'Query'.");

        let body = call(json!({ "query": "{ createJob(input: {}) { id } }" }), None).await;
        assert_eq!(body["errors"][0]["message"], "Cannot query field 'createJob' on type 'Query'.");

        let body = call(json!({ "query": "{ jobs { id }" }), None).await;
        assert!(body["errors"][0]["message"].as_str().unwrap().starts_with("Syntax Error"));
    }

    #[actix_web::test]
    async fn test_inline_argument_reaches_resolver() {
        let body = call(json!({ "query": r#"{ university(id: "nope") { name } }"# }), None).await;
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["errors"][0]["message"], "Invalid University ID");
        assert_eq!(body["errors"][0]["path"], json!(["university"]));
    }

    #[actix_web::test]
    async fn test_every_root_field_is_resolved() {
        let body = call(
            json!({
                "query": r#"mutation Send($contact: ContactFormInput!) {
                    contact: submitContactForm(input: $contact)
                    partner: submitPartnerInquiry(input: {
                        name: "Ravi", email: "ravi@agency.in", phone: "9000000000",
                        organization: "Study Abroad Co", message: "Partnering for UK intake"
                    })
                    __typename
                }"#,
                "variables": { "contact": {
                    "firstName": "Meera",
                    "lastName": "Iyer",
                    "email": "meera@x.com",
                    "phone": "9123456789",
                    "subject": "Visa help",
                    "message": "Student visa for Germany"
                } }
            }),
            None,
        )
        .await;
        assert_eq!(
            body,
            json!({ "data": { "contact": true, "partner": true, "__typename": "Mutation" } })
        );

        let body = call(json!({ "query": r#"{ users { id } university(id: "nope") { id } }"# }), None).await;
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["errors"][0]["path"], json!(["users"]));
        assert_eq!(body["errors"][1]["path"], json!(["university"]));
    }

    #[actix_web::test]
    async fn test_guards_surface_as_errors() {
        let body = call(json!({ "query": "{ users { id } }" }), None).await;
        assert_eq!(body["errors"][0]["message"], "Authentication required");

        let student = issue_token(
            &test_config().jwt,
            &TokenSubject { id: "65f0c0ffee65f0c0ffee65f0", email: "s@x.com", role: "Student" },
        )
        .unwrap();
        let body = call(
            json!({
                "query": "mutation Remove($id: ID!) { deleteJob(id: $id) }",
                "variables": { "id": "65f0c0ffee65f0c0ffee65f0" }
            }),
            Some(student),
        )
        .await;
        assert_eq!(body["errors"][0]["message"], "Admin access required");

        let body = call(
            json!({ "query": r#"mutation { createJob(input: { title: "Counsellor" }) { id } }"# }),
            Some("garbage".into()),
        )
        .await;
        assert_eq!(body["errors"][0]["message"], "Invalid or expired token");
    }
}
