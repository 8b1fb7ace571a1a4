use std::sync::Arc;

use parking_lot::Mutex;

use chimera_beans::prelude::*;
use chimera_beans::{StaticMessageSource, MESSAGE_SOURCE_BEAN_NAME};

type EventLog = Arc<Mutex<Vec<String>>>;

struct Service {
    name: String,
}

fn service_class(log: &EventLog) -> Arc<BeanClass> {
    let log = log.clone();
    BeanClass::builder::<Service>("Service")
        .constructor(move |ctx| {
            log.lock().push(format!("create {}", ctx.bean_name()));
            let name = ctx
                .property("name")
                .and_then(Value::as_str)
                .unwrap_or("unnamed")
                .to_string();
            Ok(Service { name })
        })
        .build()
}

/// 在刷新时补充一个定义并修改已有定义
struct RegisteringPostProcessor {
    log: EventLog,
}

impl BeanFactoryPostProcessor for RegisteringPostProcessor {
    fn post_process_bean_factory(
        &self,
        bean_factory: &dyn ConfigurableListableBeanFactory,
    ) -> anyhow::Result<()> {
        self.log.lock().push("post-process factory".to_string());
        let existing = bean_factory.get_merged_bean_definition("orders", false)?;
        let replaced = (*existing).clone().with_property("name", "orders (processed)");
        bean_factory.register_bean_definition("orders", replaced.into())?;
        bean_factory.register_bean_definition(
            "audit",
            RootBeanDefinition::with_class(service_class(&self.log))
                .with_property("name", "audit")
                .into(),
        )?;
        Ok(())
    }

    fn name(&self) -> &str {
        "RegisteringPostProcessor"
    }
}

/// 记录经过的 Bean 名称
struct RecordingPostProcessor {
    log: EventLog,
    label: &'static str,
    order: i32,
}

impl BeanPostProcessor for RecordingPostProcessor {
    fn post_process_after_initialization(&self, bean: Object, bean_name: &str) -> anyhow::Result<Object> {
        self.log.lock().push(format!("{} {}", self.label, bean_name));
        Ok(bean)
    }

    fn order(&self) -> i32 {
        self.order
    }
}

struct RecordingListener {
    log: EventLog,
}

impl ApplicationListener for RecordingListener {
    fn on_context_event(&self, event: &ContextEvent) {
        let kind = match event {
            ContextEvent::Refreshed { .. } => "refreshed",
            ContextEvent::Closed { .. } => "closed",
        };
        self.log.lock().push(format!("{} {}", kind, event.display_name()));
    }
}

fn recording_processor_class(log: &EventLog, label: &'static str, order: i32) -> Arc<BeanClass> {
    let log = log.clone();
    BeanClass::builder::<Arc<dyn BeanPostProcessor>>(label)
        .constructor(move |_| {
            Ok(Arc::new(RecordingPostProcessor {
                log: log.clone(),
                label,
                order,
            }) as Arc<dyn BeanPostProcessor>)
        })
        .build()
}

#[test]
fn refresh_runs_factory_post_processors_before_instantiation() {
    let log: EventLog = Arc::default();
    let context = ApplicationContext::new();
    context.add_bean_definition_reader(Arc::new(
        StaticBeanDefinitionReader::new().with_definition(
            "orders",
            RootBeanDefinition::with_class(service_class(&log)).with_property("name", "orders"),
        ),
    ));
    context.add_bean_factory_post_processor(Arc::new(RegisteringPostProcessor { log: log.clone() }));

    context.refresh().unwrap();

    let entries = log.lock().clone();
    assert_eq!(entries[0], "post-process factory");
    assert!(entries.contains(&"create orders".to_string()));
    assert!(entries.contains(&"create audit".to_string()));
    assert_eq!(
        context.get_bean_as::<Service>("orders").unwrap().name,
        "orders (processed)"
    );
    assert_eq!(context.get_bean_definition_names(), vec!["orders", "audit"]);
}

#[test]
fn factory_post_processor_beans_are_discovered() {
    let log: EventLog = Arc::default();
    let context = ApplicationContext::new();
    let factory = context.get_bean_factory();

    factory
        .register_bean_definition(
            "orders",
            RootBeanDefinition::with_class(service_class(&log)).into(),
        )
        .unwrap();
    let processor: Arc<dyn BeanFactoryPostProcessor> =
        Arc::new(RegisteringPostProcessor { log: log.clone() });
    factory
        .register_singleton_object("registeringPostProcessor", processor)
        .unwrap();

    context.refresh().unwrap();
    assert!(context.contains_bean("audit"));
    assert_eq!(log.lock()[0], "post-process factory");
}

#[test]
fn bean_post_processor_beans_apply_in_order() {
    let log: EventLog = Arc::default();
    let context = ApplicationContext::new();
    let factory = context.get_bean_factory();

    factory
        .register_bean_definition(
            "late",
            RootBeanDefinition::with_class(recording_processor_class(&log, "late", 20)).into(),
        )
        .unwrap();
    factory
        .register_bean_definition(
            "early",
            RootBeanDefinition::with_class(recording_processor_class(&log, "early", 10)).into(),
        )
        .unwrap();
    factory
        .register_bean_definition(
            "service",
            RootBeanDefinition::with_class(service_class(&log)).into(),
        )
        .unwrap();

    context.refresh().unwrap();

    let processed: Vec<String> = log
        .lock()
        .iter()
        .filter(|entry| entry.ends_with(" service") && !entry.starts_with("create"))
        .cloned()
        .collect();
    assert_eq!(processed, vec!["early service", "late service"]);
    assert_eq!(factory.get_bean_post_processors().len(), 2);
}

#[test]
fn listener_beans_receive_lifecycle_events() {
    let log: EventLog = Arc::default();
    let context = ApplicationContext::new().with_display_name("orders");
    let listener: Arc<dyn ApplicationListener> = Arc::new(RecordingListener { log: log.clone() });
    context
        .get_bean_factory()
        .register_singleton_object("listener", listener)
        .unwrap();

    context.refresh().unwrap();
    context.close();

    assert_eq!(*log.lock(), vec!["refreshed orders", "closed orders"]);
}

#[test]
fn child_context_events_reach_parent_listeners() {
    let log: EventLog = Arc::default();
    let parent = Arc::new(ApplicationContext::new().with_display_name("parent"));
    parent.add_application_listener(Arc::new(RecordingListener { log: log.clone() }));
    parent.refresh().unwrap();

    let child = ApplicationContext::with_parent(parent.clone()).with_display_name("child");
    child.refresh().unwrap();
    child.close();

    assert_eq!(
        *log.lock(),
        vec!["refreshed parent", "refreshed child", "closed child"]
    );
}

#[test]
fn child_context_resolves_parent_beans() {
    let log: EventLog = Arc::default();
    let parent = Arc::new(ApplicationContext::new());
    parent
        .get_bean_factory()
        .register_bean_definition(
            "shared",
            RootBeanDefinition::with_class(service_class(&log))
                .with_property("name", "shared")
                .into(),
        )
        .unwrap();
    parent.refresh().unwrap();

    let child = ApplicationContext::with_parent(parent.clone());
    child.refresh().unwrap();

    assert_eq!(child.get_bean_as::<Service>("shared").unwrap().name, "shared");
    assert!(Arc::ptr_eq(
        &child.get_bean("shared").unwrap(),
        &parent.get_bean("shared").unwrap()
    ));
}

#[test]
fn message_source_bean_is_used() {
    let context = ApplicationContext::new();
    let source = StaticMessageSource::new();
    source.add_message("greeting", "hello");
    let source: Arc<dyn MessageSource> = Arc::new(source);
    context
        .get_bean_factory()
        .register_singleton_object(MESSAGE_SOURCE_BEAN_NAME, source)
        .unwrap();

    context.refresh().unwrap();

    assert_eq!(context.get_message("greeting", None).as_deref(), Some("hello"));
    assert_eq!(
        context.get_message("farewell", Some("bye")).as_deref(),
        Some("bye")
    );
}

#[test]
fn close_destroys_singletons() {
    let log: EventLog = Arc::default();
    let context = ApplicationContext::new();
    context
        .get_bean_factory()
        .register_bean_definition(
            "service",
            RootBeanDefinition::with_class(service_class(&log)).into(),
        )
        .unwrap();

    context.refresh().unwrap();
    assert!(context.get_bean_factory().contains_singleton("service"));

    context.close();
    assert!(!context.is_active());
    assert!(!context.get_bean_factory().contains_singleton("service"));
}
