use http::StatusCode;
use resource_framework::mock::MockRepository;
use resource_framework::{
    resource_state, ActionDescriptor, ActionRegistry, DispatchConfig, Dispatcher, Entity,
    EntityCatalog, EntityError, EntityId, ErrorRegistry, Identity, Reference, Resource,
    ResourceContext, ResourceError, ResourceResult, SetFields,
};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};

// --- Test Entity ---

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
struct Project {
    id: EntityId,
    key: String,
    owner: String,
}

impl Entity for Project {
    const TYPE_NAME: &'static str = "Project";

    fn id(&self) -> EntityId {
        self.id
    }

    fn ide(&self) -> &str {
        &self.key
    }
}

#[derive(Debug)]
struct Member(&'static str);

impl Identity for Member {
    fn subject(&self) -> &str {
        self.0
    }

    fn has_role(&self, role: &str) -> bool {
        role == "member"
    }
}

// --- Test Resource ---

resource_state! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct ProjectState {
        id: EntityId,
        key: String,
        title: String,
    }
}

#[derive(Debug)]
struct ProjectParams {
    project: Value,
    title: Option<String>,
}

struct ProjectResource {
    context: ResourceContext,
    state: ProjectState,
    project: Project,
}

impl Resource for ProjectResource {
    const NAME: &'static str = "Project";
    type Params = ProjectParams;

    fn possible_errors() -> &'static ErrorRegistry {
        static ERRORS: OnceLock<ErrorRegistry> = OnceLock::new();
        ERRORS.get_or_init(|| {
            ErrorRegistry::new(
                Self::NAME,
                json!({
                    "invalid_project": { "message": "Unknown project", "fields": ["project"] },
                    "title_required": { "message": "Title is required", "fields": ["title"] },
                    "title_too_long": { "message": "Title is too long", "fields": ["title"], "max": 20 },
                }),
            )
        })
    }

    fn actions() -> &'static ActionRegistry {
        static ACTIONS: OnceLock<ActionRegistry> = OnceLock::new();
        ACTIONS.get_or_init(|| {
            ActionRegistry::new(Self::NAME)
                .action("get", ActionDescriptor::new().wrapper("project"))
                .action("rename", ActionDescriptor::new().wrapper(""))
                .action("archive", ActionDescriptor::new().status(StatusCode::ACCEPTED))
                .action("explode", ActionDescriptor::new().method("selfDestruct"))
        })
    }

    fn new(params: ProjectParams, mut context: ResourceContext) -> ResourceResult<Self> {
        let caller = context.require_identity()?.subject().to_string();

        let Some(reference) = Reference::<Project>::from_json(&params.project) else {
            return context.error("invalid_project", Value::Null);
        };
        let project = context.convert_to_object(reference, "invalid_project")?;
        if project.owner != caller {
            return context.access_denied(Some("not your project"));
        }

        if let Some(title) = params.title.as_deref() {
            if title.is_empty() {
                context.add_error("title_required", Value::Null)?;
            }
            if title.len() > 20 {
                context.add_error("title_too_long", json!({ "length": title.len() }))?;
            }
        }
        context.check_errors()?;

        let mut state = ProjectState::default();
        state.set(
            ProjectStatePatch::default()
                .id(project.id)
                .key(project.key.clone())
                .title(params.title.unwrap_or_default()),
        );

        Ok(Self {
            context,
            state,
            project,
        })
    }

    fn invoke(&mut self, method: &str) -> ResourceResult<()> {
        match method {
            "get" => self.get(),
            "rename" => self.rename(),
            "archive" => Ok(()),
            other => Self::unknown_method(other),
        }
    }

    fn context(&self) -> &ResourceContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ResourceContext {
        &mut self.context
    }
}

impl ProjectResource {
    fn get(&mut self) -> ResourceResult<()> {
        self.context.output(&self.project)?;
        Ok(())
    }

    fn rename(&mut self) -> ResourceResult<()> {
        self.context.output(json!({ "key": self.state.key, "title": "draft" }))?;
        self.context
            .output(json!({ "key": self.state.key, "title": self.state.title }))?;
        Ok(())
    }
}

fn project(id: EntityId) -> Project {
    Project {
        id,
        key: format!("PRJ-{id}"),
        owner: "alice".into(),
    }
}

fn dispatcher(mock: &MockRepository<Project>) -> Dispatcher {
    let catalog = EntityCatalog::new().with::<Project>(Arc::new(mock.handle()));
    Dispatcher::new(Arc::new(catalog), DispatchConfig::default())
}

fn alice() -> Option<Arc<dyn Identity>> {
    Some(Arc::new(Member("alice")))
}

// --- Tests ---

#[test]
fn test_get_wraps_output_under_wrapper_key() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_id(1).return_ok(Some(project(1)));

    let outcome = dispatcher(&mock).dispatch::<ProjectResource>(
        "get",
        ProjectParams {
            project: json!(1),
            title: None,
        },
        alice(),
    );

    assert_eq!(outcome.status, StatusCode::OK);
    assert_eq!(outcome.body["project"]["key"], "PRJ-1");
    mock.verify();
}

#[test]
fn test_empty_wrapper_and_last_output_wins() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_ide("PRJ-2").return_ok(Some(project(2)));

    let outcome = dispatcher(&mock).dispatch::<ProjectResource>(
        "rename",
        ProjectParams {
            project: json!("PRJ-2"),
            title: Some("Roadmap".into()),
        },
        alice(),
    );

    assert_eq!(outcome.body, json!({ "key": "PRJ-2", "title": "Roadmap" }));
}

#[test]
fn test_custom_status_and_no_output() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_id(3).return_ok(Some(project(3)));

    let outcome = dispatcher(&mock).dispatch::<ProjectResource>(
        "archive",
        ProjectParams {
            project: json!(3),
            title: None,
        },
        alice(),
    );

    assert_eq!(outcome.status, StatusCode::ACCEPTED);
    assert_eq!(outcome.body, json!({ "archive": null }));
}

#[test]
fn test_unknown_action_is_routing_failure() {
    let mock = MockRepository::<Project>::new();

    let result = dispatcher(&mock).try_dispatch::<ProjectResource>(
        "delete",
        ProjectParams {
            project: json!(1),
            title: None,
        },
        alice(),
    );

    assert!(matches!(result, Err(ResourceError::Routing(_))));
    mock.verify();
}

#[test]
fn test_mapped_method_missing_is_internal() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_id(1).return_ok(Some(project(1)));

    let outcome = dispatcher(&mock).dispatch::<ProjectResource>(
        "explode",
        ProjectParams {
            project: json!(1),
            title: None,
        },
        alice(),
    );

    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(outcome.body["message"], "Internal server error");
}

#[test]
fn test_missing_identity_is_access_denied() {
    let mock = MockRepository::<Project>::new();

    let outcome = dispatcher(&mock).dispatch::<ProjectResource>(
        "get",
        ProjectParams {
            project: json!(1),
            title: None,
        },
        None,
    );

    assert_eq!(outcome.status, StatusCode::FORBIDDEN);
    assert_eq!(outcome.body["error"], "access_denied");
}

#[test]
fn test_foreign_project_is_access_denied() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_id(4).return_ok(Some(project(4)));

    let result = dispatcher(&mock).try_dispatch::<ProjectResource>(
        "get",
        ProjectParams {
            project: json!(4),
            title: None,
        },
        Some(Arc::new(Member("mallory"))),
    );

    assert_eq!(
        result,
        Err(ResourceError::AccessDenied(Some("not your project".into())))
    );
}

#[test]
fn test_entity_failure_reported_as_requested_error() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_id(9).return_err(EntityError::Storage {
        entity_type: "Project",
        message: "replica lag".into(),
    });

    let outcome = dispatcher(&mock).dispatch::<ProjectResource>(
        "get",
        ProjectParams {
            project: json!(9),
            title: None,
        },
        alice(),
    );

    assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
    assert_eq!(outcome.body["errors"][0]["code"], "invalid_project");
    assert!(!outcome.body.to_string().contains("replica lag"));
}

#[test]
fn test_all_staged_errors_reported_together() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_id(5).return_ok(Some(project(5)));

    let result = dispatcher(&mock).try_dispatch::<ProjectResource>(
        "rename",
        ProjectParams {
            project: json!(5),
            title: Some(String::new()),
        },
        alice(),
    );
    let Err(ResourceError::Validation(failure)) = result else {
        panic!("expected validation failure");
    };
    assert_eq!(failure.len(), 1);
    assert!(failure.contains("title_required"));

    mock.expect_find_by_id(5).return_ok(Some(project(5)));
    let result = dispatcher(&mock).try_dispatch::<ProjectResource>(
        "rename",
        ProjectParams {
            project: json!(5),
            title: Some("x".repeat(25)),
        },
        alice(),
    );
    let Err(ResourceError::Validation(failure)) = result else {
        panic!("expected validation failure");
    };
    let error = &failure.errors()[0];
    assert_eq!(error.code(), "title_too_long");
    assert_eq!(error.get("max"), Some(&json!(20)));
    assert_eq!(error.get("length"), Some(&json!(25)));
}

#[test]
fn test_unwrapped_responses_when_disabled() {
    let mock = MockRepository::<Project>::new();
    mock.expect_find_by_id(1).return_ok(Some(project(1)));
    let catalog = EntityCatalog::new().with::<Project>(Arc::new(mock.handle()));
    let config = DispatchConfig {
        wrap_responses: false,
        ..DispatchConfig::default()
    };

    let outcome = Dispatcher::new(Arc::new(catalog), config).dispatch::<ProjectResource>(
        "get",
        ProjectParams {
            project: json!(1),
            title: None,
        },
        alice(),
    );

    assert_eq!(outcome.body["key"], "PRJ-1");
}

#[tokio::test]
async fn test_concurrent_dispatches_share_registries() {
    struct Projects;

    impl resource_framework::EntityRepository<Project> for Projects {
        fn find_by_id(&self, id: EntityId) -> Result<Option<Project>, EntityError> {
            Ok(Some(project(id)))
        }

        fn find_by_ide(&self, _ide: &str) -> Result<Option<Project>, EntityError> {
            Ok(None)
        }
    }

    let catalog = EntityCatalog::new().with::<Project>(Arc::new(Projects));
    let dispatcher = Dispatcher::new(Arc::new(catalog), DispatchConfig::default());

    let handles: Vec<_> = (1..=32u64)
        .map(|id| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let title = if id % 2 == 0 { String::new() } else { format!("t{id}") };
                dispatcher.dispatch::<ProjectResource>(
                    "rename",
                    ProjectParams {
                        project: json!(id),
                        title: Some(title),
                    },
                    alice(),
                )
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let id = index as u64 + 1;
        let outcome = handle.await.unwrap();
        if id % 2 == 0 {
            assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
            assert_eq!(outcome.body["errors"].as_array().map(Vec::len), Some(1));
        } else {
            assert_eq!(outcome.body["title"], format!("t{id}"));
        }
    }
}
