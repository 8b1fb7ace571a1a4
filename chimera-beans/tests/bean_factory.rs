use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use chimera_beans::prelude::*;
use chimera_beans::{ChildBeanDefinition, SimpleFactoryBean};

type EventLog = Arc<Mutex<Vec<String>>>;

struct Service {
    name: String,
}

struct Repository;

trait Greeting: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeting for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

struct French;

impl Greeting for French {
    fn greet(&self) -> String {
        "bonjour".to_string()
    }
}

fn service_class() -> Arc<BeanClass> {
    BeanClass::builder::<Service>("Service")
        .constructor(|ctx| {
            let name = ctx
                .property("name")
                .and_then(Value::as_str)
                .unwrap_or("default")
                .to_string();
            Ok(Service { name })
        })
        .build()
}

/// 构造和销毁都记录到日志里的类
fn logged_class(log: &EventLog, class_name: &str) -> Arc<BeanClass> {
    let created = log.clone();
    let destroyed = log.clone();
    BeanClass::builder::<Service>(class_name)
        .constructor(move |ctx| {
            created.lock().push(format!("create {}", ctx.bean_name()));
            Ok(Service {
                name: ctx.bean_name().to_string(),
            })
        })
        .method("close", move |service: &Service| {
            destroyed.lock().push(format!("destroy {}", service.name));
            Ok(())
        })
        .build()
}

fn greeting_factory_class() -> Arc<BeanClass> {
    BeanClass::factory_builder::<SimpleFactoryBean>("FrenchGreetingFactory")
        .factory_constructor(|_| {
            Ok(SimpleFactoryBean::new(|| Ok(Arc::new(French) as Arc<dyn Greeting>)))
        })
        .build()
}

fn register(factory: &DefaultListableBeanFactory, name: &str, definition: impl Into<BeanDefinition>) {
    factory
        .register_bean_definition(name, definition.into())
        .unwrap();
}

#[test]
fn merged_child_overrides_parent_properties() {
    let factory = DefaultListableBeanFactory::new();
    register(
        &factory,
        "template",
        RootBeanDefinition::with_class(service_class())
            .with_abstract(true)
            .with_property("name", "template")
            .with_property("timeout", 30),
    );
    register(
        &factory,
        "orders",
        ChildBeanDefinition::new("template")
            .with_scope(Scope::Prototype)
            .with_property("name", "orders"),
    );

    let merged = factory.get_merged_bean_definition("orders", false).unwrap();
    assert_eq!(merged.property_values().get("name"), Some(&Value::from("orders")));
    assert_eq!(merged.property_values().get("timeout"), Some(&Value::from(30)));
    assert_eq!(merged.bean_class_name(), Some("Service"));
    assert!(!merged.is_abstract());
    assert!(!merged.is_singleton());

    let template = factory.get_merged_bean_definition("template", false).unwrap();
    assert_eq!(template.property_values().get("name"), Some(&Value::from("template")));

    assert_eq!(factory.get_bean_as::<Service>("orders").unwrap().name, "orders");
}

#[test]
fn abstract_definitions_are_never_instantiated() {
    let factory = DefaultListableBeanFactory::new();
    register(
        &factory,
        "template",
        RootBeanDefinition::with_class(service_class()).with_abstract(true),
    );

    factory.pre_instantiate_singletons().unwrap();
    assert!(!factory.contains_singleton("template"));

    match factory.get_bean("template").unwrap_err() {
        BeanError::BeanIsAbstract { name } => assert_eq!(name, "template"),
        other => panic!("Expected BeanIsAbstract, got {:?}", other),
    }
    assert!(factory
        .get_bean_definition_names_for_type(TypeId::of::<Service>())
        .unwrap()
        .is_empty());
}

#[test]
fn lazy_prototype_is_rejected_at_registration() {
    let factory = DefaultListableBeanFactory::new();
    let error = factory
        .register_bean_definition(
            "lazyPrototype",
            RootBeanDefinition::with_class(service_class())
                .with_scope(Scope::Prototype)
                .with_lazy_init(true)
                .with_resource_description("beans.toml")
                .into(),
        )
        .unwrap_err();

    assert!(matches!(error, BeanError::BeanDefinitionValidation { .. }));
    assert!(error.to_string().contains("beans.toml"));
    assert!(!factory.contains_bean_definition("lazyPrototype"));
}

#[test]
fn lazy_singletons_wait_for_first_request() {
    let factory = DefaultListableBeanFactory::new();
    register(&factory, "eager", RootBeanDefinition::with_class(service_class()));
    register(
        &factory,
        "lazy",
        RootBeanDefinition::with_class(service_class()).with_lazy_init(true),
    );

    factory.pre_instantiate_singletons().unwrap();
    assert!(factory.contains_singleton("eager"));
    assert!(!factory.contains_singleton("lazy"));

    factory.get_bean("lazy").unwrap();
    assert!(factory.contains_singleton("lazy"));
}

#[test]
fn aliases_resolve_to_the_same_singleton() {
    let factory = DefaultListableBeanFactory::new();
    register(&factory, "dataSource", RootBeanDefinition::with_class(service_class()));
    factory.register_alias("dataSource", "ds").unwrap();
    factory.register_alias("dataSource", "primary").unwrap();

    let by_name = factory.get_bean("dataSource").unwrap();
    let by_alias = factory.get_bean("ds").unwrap();
    assert!(Arc::ptr_eq(&by_name, &by_alias));
    assert!(factory.contains_bean("primary"));
    assert_eq!(factory.get_aliases("dataSource").unwrap(), vec!["ds", "primary"]);

    // 同一别名指向同一目标时重复注册无影响
    factory.register_alias("dataSource", "ds").unwrap();

    register(&factory, "other", RootBeanDefinition::with_class(service_class()));
    let error = factory.register_alias("other", "ds").unwrap_err();
    assert!(matches!(error, BeanError::BeanDefinitionStore { .. }));
}

#[test]
fn lookup_falls_back_to_parent_factory() {
    let parent = Arc::new(DefaultListableBeanFactory::new().with_display_name("parent"));
    register(
        &parent,
        "shared",
        RootBeanDefinition::with_class(service_class()).with_property("name", "from parent"),
    );
    parent.register_alias("shared", "common").unwrap();

    let child = DefaultListableBeanFactory::with_parent(parent.clone());
    assert!(child.contains_bean("shared"));
    assert!(!child.contains_bean_definition("shared"));
    assert_eq!(child.get_bean_as::<Service>("common").unwrap().name, "from parent");
    assert!(Arc::ptr_eq(
        &child.get_bean("shared").unwrap(),
        &parent.get_bean("shared").unwrap()
    ));

    let error = child.get_bean("missing").unwrap_err();
    assert!(error.is_not_found());
    assert_eq!(error.bean_name(), Some("missing"));
}

#[test]
fn child_with_same_name_inherits_from_parent_factory() {
    let parent = Arc::new(DefaultListableBeanFactory::new());
    register(
        &parent,
        "service",
        RootBeanDefinition::with_class(service_class()).with_property("name", "parent"),
    );

    let child = DefaultListableBeanFactory::with_parent(parent.clone());
    register(&child, "service", ChildBeanDefinition::new("service"));

    let merged = child.get_merged_bean_definition("service", false).unwrap();
    assert_eq!(merged.property_values().get("name"), Some(&Value::from("parent")));

    // 本地定义优先，子工厂得到自己的实例
    let local = child.get_bean("service").unwrap();
    let inherited = parent.get_bean("service").unwrap();
    assert!(!Arc::ptr_eq(&local, &inherited));
}

#[test]
fn factory_bean_product_and_dereference() {
    let factory = DefaultListableBeanFactory::new();
    register(
        &factory,
        "greeting",
        RootBeanDefinition::with_class(greeting_factory_class()),
    );
    factory.register_alias("greeting", "salutation").unwrap();

    let product = factory.get_bean_as::<Arc<dyn Greeting>>("greeting").unwrap();
    assert_eq!(product.greet(), "bonjour");

    let again = factory.get_bean_as::<Arc<dyn Greeting>>("greeting").unwrap();
    assert!(Arc::ptr_eq(&product, &again));

    let raw = factory.get_bean_as::<SimpleFactoryBean>("&salutation").unwrap();
    assert!(raw.is_singleton());
    assert!(factory.is_singleton("greeting").unwrap());
}

#[test]
fn dereferencing_a_plain_bean_fails() {
    let factory = DefaultListableBeanFactory::new();
    register(&factory, "plain", RootBeanDefinition::with_class(service_class()));

    match factory.get_bean("&plain").unwrap_err() {
        BeanError::BeanIsNotAFactory { name, type_name } => {
            assert_eq!(name, "plain");
            assert!(type_name.contains("Service"));
        }
        other => panic!("Expected BeanIsNotAFactory, got {:?}", other),
    }
}

/// 生产产品时再次请求自己的产品
struct SelfReferencingGreetingFactory {
    factory: Weak<DefaultListableBeanFactory>,
    producing: AtomicBool,
}

impl FactoryBean for SelfReferencingGreetingFactory {
    fn get_object(&self) -> anyhow::Result<Option<Object>> {
        if self.producing.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        let product = match self.factory.upgrade() {
            Some(factory) => factory.get_bean("greeting").map_err(anyhow::Error::from),
            None => Err(anyhow!("bean factory is gone")),
        };
        self.producing.store(false, Ordering::SeqCst);
        product.map(Some)
    }
}

#[test]
fn nested_product_request_reports_circular_reference() {
    let factory = Arc::new(DefaultListableBeanFactory::new());
    let weak = Arc::downgrade(&factory);
    let class = BeanClass::factory_builder::<SelfReferencingGreetingFactory>("SelfReferencingGreetingFactory")
        .factory_constructor(move |_| {
            Ok(SelfReferencingGreetingFactory {
                factory: weak.clone(),
                producing: AtomicBool::new(false),
            })
        })
        .build();
    register(&factory, "greeting", RootBeanDefinition::with_class(class));

    match factory.get_bean("greeting").unwrap_err() {
        BeanError::FactoryBeanCircularReference { name } => assert_eq!(name, "greeting"),
        other => panic!("Expected FactoryBeanCircularReference, got {:?}", other),
    }
    assert!(factory.get_bean("&greeting").is_ok());

    // 类型查找跳过产品无法就绪的 FactoryBean
    let greetings = factory.get_beans_of_type::<Arc<dyn Greeting>>(false, true).unwrap();
    assert!(greetings.is_empty());
}

#[test]
fn factory_bean_is_initialized_without_init_method() {
    let factory = DefaultListableBeanFactory::new();
    register(&factory, "greeting", RootBeanDefinition::with_class(greeting_factory_class()));

    factory.pre_instantiate_singletons().unwrap();

    let product = factory.get_bean_as::<Arc<dyn Greeting>>("greeting").unwrap();
    assert_eq!(product.greet(), "bonjour");
}

#[test]
fn factory_bean_destroy_callback_runs_on_teardown() {
    let log: EventLog = Arc::default();
    let destroyed = log.clone();
    let class = BeanClass::factory_builder::<SimpleFactoryBean>("PooledServiceFactory")
        .factory_constructor(move |_| {
            let destroyed = destroyed.clone();
            Ok(SimpleFactoryBean::new(|| Ok(Service { name: "pooled".to_string() }))
                .with_destroy(move |service: &Service| {
                    destroyed.lock().push(format!("release {}", service.name));
                    Ok(())
                }))
        })
        .method("close", {
            let log = log.clone();
            move |_: &SimpleFactoryBean| {
                log.lock().push("close factory".to_string());
                Ok(())
            }
        })
        .build();
    let factory = DefaultListableBeanFactory::new();
    register(
        &factory,
        "pooled",
        RootBeanDefinition::with_class(class).with_destroy_method("close"),
    );

    assert_eq!(factory.get_bean_as::<Service>("pooled").unwrap().name, "pooled");
    factory.destroy_singletons();

    assert_eq!(*log.lock(), vec!["release pooled", "close factory"]);
}

#[test]
fn type_lookup_skips_factory_bean_still_in_creation() {
    struct Collector {
        names: Vec<String>,
    }

    let factory = DefaultListableBeanFactory::new();
    let english = BeanClass::builder::<Arc<dyn Greeting>>("EnglishGreeting")
        .constructor(|_| Ok(Arc::new(English) as Arc<dyn Greeting>))
        .build();
    let collector = BeanClass::builder::<Collector>("Collector")
        .constructor(|ctx| {
            let greetings = ctx
                .factory()
                .get_beans_of_type::<Arc<dyn Greeting>>(false, true)?;
            let mut names: Vec<String> = greetings.into_keys().collect();
            names.sort();
            Ok(Collector { names })
        })
        .build();
    let greeting = BeanClass::factory_builder::<SimpleFactoryBean>("CollectingGreetingFactory")
        .factory_constructor(|ctx| {
            ctx.get_bean("collector")?;
            Ok(SimpleFactoryBean::new(|| Ok(Arc::new(French) as Arc<dyn Greeting>)))
        })
        .build();

    register(&factory, "english", RootBeanDefinition::with_class(english));
    register(&factory, "collector", RootBeanDefinition::with_class(collector));
    register(&factory, "greeting", RootBeanDefinition::with_class(greeting));

    let product = factory.get_bean_as::<Arc<dyn Greeting>>("greeting").unwrap();
    assert_eq!(product.greet(), "bonjour");
    assert_eq!(
        factory.get_bean_as::<Collector>("collector").unwrap().names,
        vec!["english"]
    );

    // 创建完成后再次查找能看到产品
    let mut names: Vec<String> = factory
        .get_beans_of_type::<Arc<dyn Greeting>>(false, true)
        .unwrap()
        .into_keys()
        .collect();
    names.sort();
    assert_eq!(names, vec!["english", "greeting"]);
}

#[test]
fn is_singleton_reports_product_scope_for_factory_beans() {
    let factory = DefaultListableBeanFactory::new();
    let class = BeanClass::factory_builder::<SimpleFactoryBean>("PrototypeGreetingFactory")
        .factory_constructor(|_| {
            Ok(SimpleFactoryBean::new(|| Ok(Arc::new(English) as Arc<dyn Greeting>))
                .with_singleton(false))
        })
        .build();
    register(&factory, "greeting", RootBeanDefinition::with_class(class));

    assert!(!factory.is_singleton("greeting").unwrap());
    assert!(factory.is_singleton("&greeting").unwrap());

    let first = factory.get_bean("greeting").unwrap();
    let second = factory.get_bean("greeting").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn hierarchy_queries_delegate_with_the_requested_name() {
    let parent = Arc::new(DefaultListableBeanFactory::new());
    register(&parent, "greeting", RootBeanDefinition::with_class(greeting_factory_class()));
    parent.register_alias("greeting", "salutation").unwrap();
    parent.register_alias("greeting", "welcome").unwrap();

    let child = DefaultListableBeanFactory::with_parent(parent.clone());

    assert!(child.is_singleton("greeting").unwrap());
    assert!(child.is_singleton("&greeting").unwrap());
    assert!(child.is_singleton("salutation").unwrap());
    assert_eq!(
        child.get_bean_as::<SimpleFactoryBean>("&salutation").unwrap().object_type(),
        Some(TypeId::of::<Arc<dyn Greeting>>())
    );

    assert_eq!(
        child.get_aliases("greeting").unwrap(),
        vec!["salutation", "welcome"]
    );
    assert!(child.is_singleton("missing").unwrap_err().is_not_found());
}

#[test]
fn hierarchy_queries_without_parent_report_not_found() {
    let factory = DefaultListableBeanFactory::new();

    let error = factory.get_aliases("missing").unwrap_err();
    assert!(error.is_not_found());
    assert_eq!(error.bean_name(), Some("missing"));
    assert!(factory.is_singleton("missing").unwrap_err().is_not_found());
    assert!(!factory.contains_bean("missing"));
}

#[test]
fn empty_property_name_fails_registration() {
    let factory = DefaultListableBeanFactory::new();

    let error = factory
        .register_bean_definition(
            "service",
            RootBeanDefinition::with_class(service_class())
                .with_property("", "nameless")
                .into(),
        )
        .unwrap_err();
    match error {
        BeanError::BeanDefinitionValidation { name, message, .. } => {
            assert_eq!(name, "service");
            assert!(message.contains("Property name must not be empty"));
        }
        other => panic!("Expected BeanDefinitionValidation, got {:?}", other),
    }

    register(&factory, "template", RootBeanDefinition::with_class(service_class()));
    let error = factory
        .register_bean_definition(
            "child",
            ChildBeanDefinition::new("template").with_property("", 1).into(),
        )
        .unwrap_err();
    assert!(matches!(error, BeanError::BeanDefinitionValidation { .. }));
    assert!(!factory.contains_bean_definition("child"));
}

#[test]
fn prototype_factory_bean_definition_is_rejected() {
    let factory = DefaultListableBeanFactory::new();
    let error = factory
        .register_bean_definition(
            "greeting",
            RootBeanDefinition::with_class(greeting_factory_class())
                .with_scope(Scope::Prototype)
                .into(),
        )
        .unwrap_err();
    assert!(matches!(error, BeanError::BeanDefinitionValidation { .. }));
}

#[test]
fn overriding_can_be_disabled_through_config() {
    let config = FactoryConfig::from_toml_str(
        r#"
        display_name = "strictFactory"
        allow_bean_definition_overriding = false
        register_submitted_classes = false
        "#,
    )
    .unwrap();
    let factory = DefaultListableBeanFactory::with_config(&config);
    assert_eq!(factory.display_name(), "strictFactory");

    register(&factory, "service", RootBeanDefinition::with_class(service_class()));
    let error = factory
        .register_bean_definition(
            "service",
            RootBeanDefinition::with_class(service_class())
                .with_property("name", "replacement")
                .into(),
        )
        .unwrap_err();

    assert!(matches!(error, BeanError::BeanDefinitionStore { .. }));
    assert_eq!(factory.get_bean_as::<Service>("service").unwrap().name, "default");
}

#[test]
fn overriding_replaces_definition_in_place() {
    let factory = DefaultListableBeanFactory::new();
    register(&factory, "first", RootBeanDefinition::with_class(service_class()));
    register(&factory, "second", RootBeanDefinition::with_class(service_class()));
    register(
        &factory,
        "first",
        RootBeanDefinition::with_class(service_class()).with_property("name", "replaced"),
    );

    assert_eq!(factory.get_bean_definition_names(), vec!["first", "second"]);
    assert_eq!(factory.get_bean_as::<Service>("first").unwrap().name, "replaced");
}

#[test]
fn depends_on_controls_creation_and_teardown_order() {
    let log: EventLog = Arc::default();
    let factory = DefaultListableBeanFactory::new();
    let class = logged_class(&log, "Logged");

    register(
        &factory,
        "cache",
        RootBeanDefinition::with_class(class.clone())
            .with_depends_on(["database"])
            .with_destroy_method("close"),
    );
    register(
        &factory,
        "database",
        RootBeanDefinition::with_class(class).with_destroy_method("close"),
    );

    factory.pre_instantiate_singletons().unwrap();
    assert_eq!(factory.get_depending_bean_names("database").unwrap(), vec!["cache"]);

    factory.destroy_singletons();
    factory.destroy_singletons();

    assert_eq!(
        *log.lock(),
        vec![
            "create database",
            "create cache",
            "destroy cache",
            "destroy database",
        ]
    );
    assert!(factory.get_singleton_names().is_empty());
}

#[test]
fn destroying_a_singleton_destroys_its_dependents_first() {
    let log: EventLog = Arc::default();
    let factory = DefaultListableBeanFactory::new();
    let class = logged_class(&log, "Logged");

    register(
        &factory,
        "database",
        RootBeanDefinition::with_class(class.clone()).with_destroy_method("close"),
    );
    register(
        &factory,
        "cache",
        RootBeanDefinition::with_class(class)
            .with_depends_on(["database"])
            .with_destroy_method("close"),
    );
    factory.pre_instantiate_singletons().unwrap();
    log.lock().clear();

    factory.destroy_singleton("database");
    assert_eq!(*log.lock(), vec!["destroy cache", "destroy database"]);
    assert!(!factory.contains_singleton("cache"));
}

#[test]
fn failing_destroy_method_does_not_stop_teardown() {
    let log: EventLog = Arc::default();
    let factory = DefaultListableBeanFactory::new();
    let class = logged_class(&log, "Logged");

    register(
        &factory,
        "first",
        RootBeanDefinition::with_class(class.clone()).with_destroy_method("close"),
    );
    register(
        &factory,
        "second",
        RootBeanDefinition::with_class(class).with_destroy_method("missingMethod"),
    );
    factory.pre_instantiate_singletons().unwrap();

    factory.destroy_singletons();
    assert!(log.lock().contains(&"destroy first".to_string()));
    assert!(factory.get_singleton_names().is_empty());
}

#[test]
fn depends_on_cycles_are_reported() {
    let factory = DefaultListableBeanFactory::new();
    register(
        &factory,
        "a",
        RootBeanDefinition::with_class(service_class()).with_depends_on(["b"]),
    );
    register(
        &factory,
        "b",
        RootBeanDefinition::with_class(service_class()).with_depends_on(["a"]),
    );

    assert!(matches!(
        factory.validate_dependencies().unwrap_err(),
        BeanError::DependencyValidation(_)
    ));
    assert!(matches!(
        factory.get_bean("a").unwrap_err(),
        BeanError::BeanCurrentlyInCreation { .. }
    ));
    assert!(!factory.contains_singleton("a"));
    assert!(!factory.contains_singleton("b"));
}

#[test]
fn constructor_reference_cycle_fails_fast() {
    let factory = DefaultListableBeanFactory::new();
    let class = BeanClass::builder::<Repository>("Repository")
        .constructor(|ctx| {
            let _other = ctx.property_ref::<Repository>("peer")?;
            Ok(Repository)
        })
        .build();

    register(
        &factory,
        "left",
        RootBeanDefinition::with_class(class.clone()).with_property("peer", Value::bean_ref("right")),
    );
    register(
        &factory,
        "right",
        RootBeanDefinition::with_class(class).with_property("peer", Value::bean_ref("left")),
    );

    match factory.get_bean("left").unwrap_err() {
        BeanError::BeanCurrentlyInCreation { name, chain } => {
            assert_eq!(name, "left");
            assert_eq!(chain, vec!["left", "right", "left"]);
        }
        other => panic!("Expected BeanCurrentlyInCreation, got {:?}", other),
    }
}

#[test]
fn creation_failure_is_wrapped_with_bean_name() {
    let factory = DefaultListableBeanFactory::new();
    let class = BeanClass::builder::<Repository>("Broken")
        .constructor(|_| anyhow::bail!("connection refused"))
        .build();
    register(
        &factory,
        "broken",
        RootBeanDefinition::with_class(class).with_resource_description("beans.toml"),
    );

    let error = factory.get_bean("broken").unwrap_err();
    assert!(matches!(error, BeanError::BeanCreation { .. }));
    let message = error.to_string();
    assert!(message.contains("'broken'"));
    assert!(message.contains("beans.toml"));
    assert!(message.contains("connection refused"));
    assert!(!factory.contains_singleton("broken"));
}

#[test]
fn beans_of_type_honours_flags() {
    let factory = DefaultListableBeanFactory::new();
    let english = BeanClass::builder::<Arc<dyn Greeting>>("EnglishGreeting")
        .constructor(|_| Ok(Arc::new(English) as Arc<dyn Greeting>))
        .build();

    register(&factory, "english", RootBeanDefinition::with_class(english.clone()));
    register(
        &factory,
        "perRequest",
        RootBeanDefinition::with_class(english).with_scope(Scope::Prototype),
    );
    register(
        &factory,
        "french",
        RootBeanDefinition::with_class(greeting_factory_class()),
    );
    let manual: Arc<dyn Greeting> = Arc::new(English);
    factory.register_singleton_object("manual", manual).unwrap();

    let singletons = factory.get_beans_of_type::<Arc<dyn Greeting>>(false, false).unwrap();
    let mut names: Vec<_> = singletons.keys().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["english", "manual"]);

    let all = factory.get_beans_of_type::<Arc<dyn Greeting>>(true, true).unwrap();
    let mut names: Vec<_> = all.keys().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["english", "french", "manual", "perRequest"]);
    assert_eq!(all["french"].greet(), "bonjour");

    let factories = factory.get_beans_of_type::<SimpleFactoryBean>(false, false).unwrap();
    assert_eq!(factories.len(), 1);
    assert!(factories.contains_key("french"));
}

#[test]
fn instance_factory_method_builds_from_another_bean() {
    struct Pool {
        size: i64,
    }
    struct Client {
        pool_size: i64,
    }

    let factory = DefaultListableBeanFactory::new();
    let pool_class = BeanClass::builder::<Pool>("Pool")
        .constructor(|ctx| {
            let size = ctx.property("size").and_then(Value::as_i64).unwrap_or(1);
            Ok(Pool { size })
        })
        .factory_method("createClient", |pool: &Pool, _| Ok(Client { pool_size: pool.size }))
        .build();

    register(
        &factory,
        "pool",
        RootBeanDefinition::with_class(pool_class).with_property("size", 8),
    );
    register(
        &factory,
        "client",
        RootBeanDefinition::new()
            .with_factory_bean("pool")
            .with_factory_method("createClient"),
    );

    assert_eq!(factory.get_bean_as::<Client>("client").unwrap().pool_size, 8);
}
