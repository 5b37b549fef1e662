//! End-to-end checks of the public API: declaring routers, resolving
//! configuration and running the plugin lifecycle.

use std::fs;
use std::sync::{Arc, Mutex};
use trellis_rs::module::sort_by_priority;
use trellis_rs::plugin;
use trellis_rs::prelude::*;
use trellis_rs::resolve_ref;

#[test]
fn resolves_nested_references() {
    let raw = json!({ "ref3": { "ref4": "here" } });
    assert_eq!(resolve_ref("ref3.ref4", &raw), Some(&json!("here")));
    assert_eq!(resolve_ref("ref5.ref6", &json!({})), None);

    let raw = json!({ "items": [{ "id": 7 }], "gone": null });
    assert_eq!(resolve_ref("items.0.id", &raw), Some(&json!(7)));
    assert_eq!(resolve_ref("gone", &raw), Some(&Value::Null));
    assert_eq!(resolve_ref("gone.deeper", &raw), None);
}

#[test]
fn builders_tag_their_target() {
    let cases = [
        (validate::headers(ValidationDefinition::new()), AggregationTarget::Headers),
        (validate::queries(ValidationDefinition::new()), AggregationTarget::Queries),
        (validate::body(BodyValidationDefinition::new()), AggregationTarget::Body),
        (validate::params(ValidationDefinition::new()), AggregationTarget::Params),
        (
            validate::custom(Validator::sync(|_, _| Ok(true))),
            AggregationTarget::Custom,
        ),
    ];
    for (rule, target) in cases {
        assert_eq!(rule.target, target);
    }

    let rule = transform::body(Origin);
    assert_eq!(rule.target, AggregationTarget::Body);
    assert!(rule.transformer.is_origin());
}

#[test]
fn verb_names_resolve_in_any_case() {
    for (name, method) in [
        ("get", Some(RouteMethod::Get)),
        ("POST", Some(RouteMethod::Post)),
        ("Put", Some(RouteMethod::Put)),
        ("DELETE", Some(RouteMethod::Delete)),
        ("patch", Some(RouteMethod::Patch)),
        ("global", None),
        ("GLOBAL", None),
    ] {
        let definition = route::by_name(name, "/items", "handler").unwrap();
        assert_eq!(definition.method, method, "{name}");
        assert_eq!(definition.middleware, vec!["handler".to_string()]);
    }

    assert!(matches!(
        route::by_name("options", "/items", "handler"),
        Err(trellis_rs::Error::UnknownMethod(name)) if name == "options"
    ));
}

#[test]
fn router_declaration_keeps_pipelines_and_policies() {
    let create_user = route::post("/users", ["auth", "createUser"])
        .aggregate(aggregate![
            validate::body(
                BodyValidationDefinition::new()
                    .field("email", Validator::sync(|value, _| Ok(value.is_string())))
                    .field(
                        "address",
                        BodyValidationDefinition::new()
                            .field("city", Validator::sync(|_, _| Ok(true))),
                    ),
            ),
            transform::body(
                BodyTransformationDefinition::new()
                    .field("email", Transformer::pipe(|value, _| value.clone())),
            ),
            transform::headers(Origin),
        ])
        .cors_policy(CorsPolicy::new().allow_origin("https://admin.example.com"));

    let router = ModuleMetadata::router(
        RouterDecoratorArgs::new(
            "users",
            vec![route::global("/users", "requestId"), create_user],
        )
        .priority(10)
        .cors_policy(CorsPolicy::permissive()),
    );

    let routes = router.routes();
    assert!(routes[0].is_global());
    assert!(routes[0].cors_policy.is_none());
    assert_eq!(
        router.effective_cors_policy(&routes[0]),
        Some(CorsPolicy::permissive())
    );

    let rules = routes[1].rules();
    assert_eq!(rules.len(), 3);
    assert!(rules[0].is_validation());
    assert!(rules[1].is_transformation());
    assert_eq!(rules[2].target(), AggregationTarget::Headers);
    assert!(routes[1].cors_policy.is_some());
}

#[test]
fn modules_sort_by_priority() {
    let mut modules = vec![
        ModuleMetadata::service(ModuleDecoratorArgs::new("cache")),
        ModuleMetadata::service(ModuleDecoratorArgs::new("database").priority(100)),
        ModuleMetadata::router(RouterDecoratorArgs::new("users", vec![]).priority(-1)),
        ModuleMetadata::service(ModuleDecoratorArgs::new("mailer")),
    ];
    sort_by_priority(&mut modules);

    let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["database", "cache", "mailer", "users"]);
}

#[test]
fn profiles_load_from_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("server.config.json"),
        r#"{ "port": 3000, "consoleLogLevels": "all", "mailer": { "from": "dev@example.com" } }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("server.config.production.json"),
        r#"{ "port": 80, "consoleLogLevels": ["warn", "error"], "enableCors": true }"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.json"), "{}").unwrap();

    let profiles = ConfigProfiles::load_dir(dir.path()).unwrap();
    assert_eq!(profiles.names(), vec!["default", "production"]);

    let dev = profiles.resolve(&Environment::Development);
    assert_eq!(dev.port, Some(3000));
    assert_eq!(trellis_rs::filter_directive(&dev), "debug");

    let prod = profiles.resolve(&Environment::Production);
    assert_eq!(prod.port, Some(80));
    assert_eq!(prod.enable_cors, Some(true));
    assert_eq!(trellis_rs::filter_directive(&prod), "warn");
    assert_eq!(
        prod.get_extra("mailer"),
        Some(&json!({ "from": "dev@example.com" }))
    );
}

struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl PluginListener for Recorder {
    async fn on_event(&self, event: PluginEvent, data: &PluginEventData) -> plugin::Result<()> {
        let detail = match event {
            PluginEvent::Launch(Phase::After) => format!("{} components", data.components.len()),
            _ => String::new(),
        };
        self.seen.lock().unwrap().push(format!("{event} {detail}").trim_end().to_string());
        Ok(())
    }
}

struct Mailer {
    sender: Mutex<Option<String>>,
}

#[async_trait]
impl OnConfig for Mailer {
    async fn on_config(&self, config: &ServerConfig) -> plugin::Result<()> {
        let from = config
            .get_extra("mailer")
            .and_then(|m| m.get("from"))
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::hook("mailer.from is not configured"))?;
        *self.sender.lock().unwrap() = Some(from.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn startup_emits_every_lifecycle_event() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut bus = PluginBus::new();
    for event in PluginEvent::lifecycle() {
        bus.on(event, Recorder { seen: seen.clone() });
    }

    let profiles = ConfigProfiles::new().profile(
        ConfigProfiles::DEFAULT,
        ServerConfig::from_json_str(r#"{ "mailer": { "from": "noreply@example.com" } }"#)
            .unwrap(),
    );
    let config = profiles.resolve(&Environment::Development);

    let mailer = Mailer {
        sender: Mutex::new(None),
    };
    mailer.on_config(&config).await.unwrap();
    assert_eq!(
        mailer.sender.lock().unwrap().as_deref(),
        Some("noreply@example.com")
    );

    let components = vec![
        ModuleMetadata::service(ModuleDecoratorArgs::new("mailer")),
        ModuleMetadata::router(RouterDecoratorArgs::new(
            "users",
            vec![route::get("/users", "listUsers")],
        )),
    ];
    let data = PluginEventData::new("/srv/app")
        .with_profiles(profiles)
        .with_config(config)
        .with_components(components);

    for event in PluginEvent::lifecycle() {
        bus.emit(event, &data).await.unwrap();
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), PluginEvent::lifecycle().len());
    assert_eq!(seen[0], "plugin:config:before");
    assert_eq!(seen[2], "plugin:middleware:internal:before");
    assert_eq!(seen.last().map(String::as_str), Some("plugin:launch:after 2 components"));
}

#[tokio::test]
async fn failing_hook_surfaces_through_the_bus() {
    let mut bus = PluginBus::new();
    bus.on_fn(PluginEvent::Config(Phase::After), |_, data| async move {
        let config = data.config.unwrap_or_default();
        let mailer = Mailer {
            sender: Mutex::new(None),
        };
        mailer.on_config(&config).await
    });

    let err = bus
        .emit(
            PluginEvent::Config(Phase::After),
            &PluginEventData::new("/srv/app").with_config(ServerConfig::default()),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "listener for `plugin:config:after` failed: hook failed: mailer.from is not configured"
    );
}
