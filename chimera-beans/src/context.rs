//! 应用上下文
//!
//! `ApplicationContext` 持有一个 [`DefaultListableBeanFactory`]，在 `refresh()` 中依次：
//!
//! 1. 运行 [`BeanDefinitionReader`] 加载定义
//! 2. 调用 BeanFactoryPostProcessor（先手动添加的，再按类型发现的 Bean）
//! 3. 注册 BeanPostProcessor Bean
//! 4. 初始化消息源（`messageSource`，不存在时使用空的 [`StaticMessageSource`]）
//! 5. 收集 [`ApplicationListener`] Bean
//! 6. 预实例化单例
//! 7. 发布 [`ContextEvent::Refreshed`]

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::RwLock;

use crate::bean::Object;
use crate::bean_factory::{
    BeanDefinitionRegistry, BeanFactory, BeanFactoryExt, ConfigurableBeanFactory,
    ConfigurableListableBeanFactory, DefaultListableBeanFactory, ListableBeanFactory,
};
use crate::config::FactoryConfig;
use crate::constants::MESSAGE_SOURCE_BEAN_NAME;
use crate::definition::BeanDefinition;
use crate::error::{BeanError, BeanResult};
use crate::lifecycle::{BeanFactoryPostProcessor, BeanPostProcessor};

/// 定义加载器
///
/// 配置文件解析等外部格式通过它把定义写入注册表
pub trait BeanDefinitionReader: Send + Sync {
    /// 加载定义，返回加载的数量
    fn load_bean_definitions(&self, registry: &dyn BeanDefinitionRegistry) -> BeanResult<usize>;
}

/// 以代码方式提供定义的加载器
#[derive(Debug, Clone, Default)]
pub struct StaticBeanDefinitionReader {
    definitions: Vec<(String, BeanDefinition)>,
    aliases: Vec<(String, String)>,
}

impl StaticBeanDefinitionReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, name: impl Into<String>, definition: impl Into<BeanDefinition>) -> Self {
        self.definitions.push((name.into(), definition.into()));
        self
    }

    pub fn with_alias(mut self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.push((name.into(), alias.into()));
        self
    }
}

impl BeanDefinitionReader for StaticBeanDefinitionReader {
    fn load_bean_definitions(&self, registry: &dyn BeanDefinitionRegistry) -> BeanResult<usize> {
        for (name, definition) in &self.definitions {
            registry.register_bean_definition(name, definition.clone())?;
        }
        for (name, alias) in &self.aliases {
            registry.register_alias(name, alias)?;
        }
        Ok(self.definitions.len())
    }
}

/// 消息源
pub trait MessageSource: Send + Sync {
    /// 解析消息，找不到时返回 `default`
    fn get_message(&self, code: &str, default: Option<&str>) -> Option<String>;
}

/// 基于内存表的消息源
#[derive(Debug, Default)]
pub struct StaticMessageSource {
    messages: RwLock<HashMap<String, String>>,
}

impl StaticMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&self, code: impl Into<String>, message: impl Into<String>) {
        self.messages.write().insert(code.into(), message.into());
    }
}

impl MessageSource for StaticMessageSource {
    fn get_message(&self, code: &str, default: Option<&str>) -> Option<String> {
        self.messages
            .read()
            .get(code)
            .cloned()
            .or_else(|| default.map(str::to_string))
    }
}

/// 上下文生命周期事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEvent {
    /// 刷新完成，所有非延迟单例已创建
    Refreshed { display_name: String },
    /// 上下文关闭，单例即将销毁
    Closed { display_name: String },
}

impl ContextEvent {
    /// 发布事件的上下文名称
    pub fn display_name(&self) -> &str {
        match self {
            ContextEvent::Refreshed { display_name } | ContextEvent::Closed { display_name } => {
                display_name
            }
        }
    }
}

/// 上下文事件监听器
pub trait ApplicationListener: Send + Sync {
    fn on_context_event(&self, event: &ContextEvent);

    /// 监听器名称（用于日志）
    fn name(&self) -> &str {
        "ApplicationListener"
    }
}

/// 应用上下文
pub struct ApplicationContext {
    display_name: String,

    /// 父上下文，它的工厂是本上下文工厂的父工厂
    parent: Option<Arc<ApplicationContext>>,

    bean_factory: Arc<DefaultListableBeanFactory>,

    readers: RwLock<Vec<Arc<dyn BeanDefinitionReader>>>,

    /// 手动添加的 BeanFactoryPostProcessor（按优先级排序）
    bean_factory_post_processors: RwLock<Vec<Arc<dyn BeanFactoryPostProcessor>>>,

    message_source: RwLock<Option<Arc<dyn MessageSource>>>,

    listeners: RwLock<Vec<Arc<dyn ApplicationListener>>>,

    /// 刷新完成的时间
    startup_time: RwLock<Option<SystemTime>>,

    refreshed: AtomicBool,
    active: AtomicBool,
}

impl ApplicationContext {
    /// 创建新的应用上下文
    pub fn new() -> Self {
        Self::with_bean_factory(Arc::new(DefaultListableBeanFactory::new()))
    }

    /// 根据配置创建上下文
    pub fn with_config(config: &FactoryConfig) -> Self {
        let factory = DefaultListableBeanFactory::with_config(config);
        let mut context = Self::with_bean_factory(Arc::new(factory));
        if let Some(name) = &config.display_name {
            context.display_name = name.clone();
        }
        context
    }

    /// 使用已有的工厂创建上下文
    pub fn with_bean_factory(bean_factory: Arc<DefaultListableBeanFactory>) -> Self {
        Self {
            display_name: "ApplicationContext".to_string(),
            parent: None,
            bean_factory,
            readers: RwLock::new(Vec::new()),
            bean_factory_post_processors: RwLock::new(Vec::new()),
            message_source: RwLock::new(None),
            listeners: RwLock::new(Vec::new()),
            startup_time: RwLock::new(None),
            refreshed: AtomicBool::new(false),
            active: AtomicBool::new(false),
        }
    }

    /// 创建子上下文
    pub fn with_parent(parent: Arc<ApplicationContext>) -> Self {
        let context = Self::new();
        context.set_parent(parent)
    }

    fn set_parent(mut self, parent: Arc<ApplicationContext>) -> Self {
        let parent_factory: Arc<dyn ConfigurableBeanFactory> = parent.bean_factory.clone();
        self.bean_factory.set_parent_bean_factory(parent_factory);
        self.parent = Some(parent);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn parent(&self) -> Option<&Arc<ApplicationContext>> {
        self.parent.as_ref()
    }

    /// 获取内部的 BeanFactory
    pub fn get_bean_factory(&self) -> &Arc<DefaultListableBeanFactory> {
        &self.bean_factory
    }

    pub fn add_bean_definition_reader(&self, reader: Arc<dyn BeanDefinitionReader>) {
        self.readers.write().push(reader);
    }

    /// 注册 BeanFactoryPostProcessor
    ///
    /// 在 Bean 定义加载后、Bean 实例化之前执行，按优先级顺序执行
    pub fn add_bean_factory_post_processor(&self, processor: Arc<dyn BeanFactoryPostProcessor>) {
        tracing::debug!(
            "Registered BeanFactoryPostProcessor '{}' with order {}",
            processor.name(),
            processor.order()
        );
        let mut processors = self.bean_factory_post_processors.write();
        processors.push(processor);
        processors.sort_by_key(|p| p.order());
    }

    /// 注册 BeanPostProcessor，委托给 BeanFactory
    pub fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>) {
        self.bean_factory.add_bean_post_processor(processor);
    }

    pub fn add_application_listener(&self, listener: Arc<dyn ApplicationListener>) {
        tracing::debug!("Registered application listener '{}'", listener.name());
        self.listeners.write().push(listener);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn startup_time(&self) -> Option<SystemTime> {
        *self.startup_time.read()
    }

    /// 刷新上下文，只能调用一次
    pub fn refresh(&self) -> BeanResult<()> {
        if self.refreshed.swap(true, Ordering::SeqCst) {
            return Err(BeanError::store(
                self.display_name.clone(),
                None,
                "Context does not support multiple refresh attempts: just call 'refresh' once",
            ));
        }

        let started = Instant::now();
        tracing::info!("Refreshing {}", self.display_name);

        self.load_bean_definitions()?;
        self.invoke_bean_factory_post_processors()?;
        self.register_bean_post_processors()?;
        self.init_message_source()?;
        self.register_listeners()?;
        self.bean_factory.pre_instantiate_singletons()?;

        *self.startup_time.write() = Some(SystemTime::now());
        self.active.store(true, Ordering::SeqCst);
        self.publish_event(&ContextEvent::Refreshed {
            display_name: self.display_name.clone(),
        });

        tracing::info!(
            "{} refreshed in {:?} with {} bean definition(s)",
            self.display_name,
            started.elapsed(),
            self.bean_factory.get_bean_definition_count()
        );
        Ok(())
    }

    fn load_bean_definitions(&self) -> BeanResult<()> {
        let readers = self.readers.read().clone();
        for reader in readers {
            let count = reader.load_bean_definitions(&*self.bean_factory)?;
            tracing::debug!("Loaded {} bean definition(s) for {}", count, self.display_name);
        }
        Ok(())
    }

    fn invoke_bean_factory_post_processors(&self) -> BeanResult<()> {
        let programmatic = self.bean_factory_post_processors.read().clone();
        self.run_bean_factory_post_processors(programmatic)?;

        // 手动添加的处理器可能注册了新的处理器定义，所以之后再按类型发现
        let discovered = sorted_by_order(
            self.bean_factory
                .get_beans_of_type::<Arc<dyn BeanFactoryPostProcessor>>(true, false)?,
            |p| p.order(),
        );
        self.run_bean_factory_post_processors(discovered)
    }

    fn run_bean_factory_post_processors(
        &self,
        processors: Vec<Arc<dyn BeanFactoryPostProcessor>>,
    ) -> BeanResult<()> {
        if processors.is_empty() {
            tracing::debug!("No BeanFactoryPostProcessors to invoke");
            return Ok(());
        }

        tracing::info!("Invoking {} BeanFactoryPostProcessor(s)", processors.len());
        for processor in processors {
            tracing::debug!("Invoking BeanFactoryPostProcessor '{}'", processor.name());
            processor
                .post_process_bean_factory(&*self.bean_factory)
                .map_err(|e| BeanError::from_creation(processor.name(), None, e))?;
        }
        Ok(())
    }

    fn register_bean_post_processors(&self) -> BeanResult<()> {
        let processors = sorted_by_order(
            self.bean_factory
                .get_beans_of_type::<Arc<dyn BeanPostProcessor>>(true, false)?,
            |p| p.order(),
        );
        tracing::debug!("Registering {} BeanPostProcessor bean(s)", processors.len());
        for processor in processors {
            self.bean_factory.add_bean_post_processor(processor);
        }
        Ok(())
    }

    fn init_message_source(&self) -> BeanResult<()> {
        let local = self.bean_factory.contains_bean_definition(MESSAGE_SOURCE_BEAN_NAME)
            || self.bean_factory.contains_singleton(MESSAGE_SOURCE_BEAN_NAME);

        let source: Arc<dyn MessageSource> = if local {
            let bean = self
                .bean_factory
                .get_bean_as::<Arc<dyn MessageSource>>(MESSAGE_SOURCE_BEAN_NAME)?;
            tracing::debug!("Using MessageSource bean '{}'", MESSAGE_SOURCE_BEAN_NAME);
            (*bean).clone()
        } else {
            tracing::debug!(
                "Unable to locate MessageSource with name '{}': using default StaticMessageSource",
                MESSAGE_SOURCE_BEAN_NAME
            );
            Arc::new(StaticMessageSource::new())
        };
        *self.message_source.write() = Some(source);
        Ok(())
    }

    fn register_listeners(&self) -> BeanResult<()> {
        let beans = self
            .bean_factory
            .get_beans_of_type::<Arc<dyn ApplicationListener>>(true, false)?;
        let mut named: Vec<(String, Arc<dyn ApplicationListener>)> = beans
            .into_iter()
            .map(|(name, listener)| (name, (*listener).clone()))
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut listeners = self.listeners.write();
        for (name, listener) in named {
            tracing::debug!("Registering application listener bean '{}'", name);
            listeners.push(listener);
        }
        Ok(())
    }

    /// 把事件发送给本上下文的监听器，然后交给父上下文
    pub fn publish_event(&self, event: &ContextEvent) {
        let listeners = self.listeners.read().clone();
        tracing::debug!(
            "Publishing event {:?} to {} listener(s)",
            event,
            listeners.len()
        );
        for listener in listeners {
            listener.on_context_event(event);
        }

        if let Some(parent) = &self.parent {
            parent.publish_event(event);
        }
    }

    /// 解析消息：本上下文的消息源，其次父上下文，最后使用 `default`
    pub fn get_message(&self, code: &str, default: Option<&str>) -> Option<String> {
        let source = self.message_source.read().clone();
        if let Some(message) = source.and_then(|s| s.get_message(code, None)) {
            return Some(message);
        }
        if let Some(message) = self.parent.as_ref().and_then(|p| p.get_message(code, None)) {
            return Some(message);
        }
        default.map(str::to_string)
    }

    /// 关闭上下文：发布关闭事件并销毁所有单例，可重复调用
    pub fn close(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            tracing::debug!("{} is not active, nothing to close", self.display_name);
            return;
        }

        tracing::info!("Closing {}", self.display_name);
        self.publish_event(&ContextEvent::Closed {
            display_name: self.display_name.clone(),
        });
        self.bean_factory.destroy_singletons();
    }

    /// 获取指定类型的所有 Bean，委托给 BeanFactory
    pub fn get_beans_of_type<T: std::any::Any + Send + Sync>(
        &self,
        include_prototypes: bool,
        include_factory_beans: bool,
    ) -> BeanResult<HashMap<String, Arc<T>>> {
        self.bean_factory
            .get_beans_of_type(include_prototypes, include_factory_beans)
    }
}

/// 按 order 排序，order 相同时按 Bean 名称排序
fn sorted_by_order<T: ?Sized>(
    beans: HashMap<String, Arc<Arc<T>>>,
    order: impl Fn(&T) -> i32,
) -> Vec<Arc<T>> {
    let mut named: Vec<(String, Arc<T>)> = beans
        .into_iter()
        .map(|(name, bean)| (name, (*bean).clone()))
        .collect();
    named.sort_by(|a, b| order(&*a.1).cmp(&order(&*b.1)).then_with(|| a.0.cmp(&b.0)));
    named.into_iter().map(|(_, bean)| bean).collect()
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanFactory for ApplicationContext {
    fn get_bean(&self, name: &str) -> BeanResult<Object> {
        self.bean_factory.get_bean(name)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory.contains_bean(name)
    }

    fn is_singleton(&self, name: &str) -> BeanResult<bool> {
        self.bean_factory.is_singleton(name)
    }

    fn get_aliases(&self, name: &str) -> BeanResult<Vec<String>> {
        self.bean_factory.get_aliases(name)
    }

    fn get_type_name(&self, name: &str) -> Option<String> {
        self.bean_factory.get_type_name(name)
    }
}

impl ListableBeanFactory for ApplicationContext {
    fn get_bean_definition_count(&self) -> usize {
        self.bean_factory.get_bean_definition_count()
    }

    fn get_bean_definition_names(&self) -> Vec<String> {
        self.bean_factory.get_bean_definition_names()
    }

    fn get_bean_definition_names_for_type(&self, type_id: std::any::TypeId) -> BeanResult<Vec<String>> {
        self.bean_factory.get_bean_definition_names_for_type(type_id)
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.bean_factory.contains_bean_definition(name)
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("display_name", &self.display_name)
            .field("active", &self.is_active())
            .field("has_parent", &self.parent.is_some())
            .field("bean_factory", &self.bean_factory)
            .finish()
    }
}
