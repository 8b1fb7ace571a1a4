//! Bean Factory - 核心容器接口
//!
//! 参考 Spring 的 BeanFactory 架构设计：
//!
//! - [`BeanFactory`] 按名称获取 Bean
//! - [`HierarchicalBeanFactory`] 父工厂
//! - [`ListableBeanFactory`] 列举定义
//! - [`BeanDefinitionRegistry`] 注册定义与别名
//! - [`ConfigurableBeanFactory`] 后置处理器、手动单例、合并定义、销毁
//! - [`DefaultListableBeanFactory`] 以上所有接口的默认实现

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::bean::{BeanInstance, FactoryBean, Object};
use crate::bean_class::{BeanClass, ClassRegistry};
use crate::config::FactoryConfig;
use crate::constants::{factory_dereference, is_factory_dereference, strip_factory_dereference};
use crate::definition::{BeanDefinition, RootBeanDefinition};
use crate::error::{BeanError, BeanResult};
use crate::instantiation::{BeanCreationContext, InstantiationStrategy, SimpleInstantiationStrategy};
use crate::lifecycle::BeanPostProcessor;
use crate::utils::dependency::{validate_dependency_graph, CreationGuard, CreationTracker};

/// BeanFactory - 最基础的容器接口
///
/// 注意：此 trait 不包含泛型方法，因此可以作为 trait object 使用
pub trait BeanFactory: Send + Sync {
    /// 通过名称获取 Bean
    ///
    /// 名称可以是别名；以 `&` 开头时返回 FactoryBean 本身而不是它的产品。
    fn get_bean(&self, name: &str) -> BeanResult<Object>;

    /// 检查是否包含指定名称的 Bean（包括父工厂）
    fn contains_bean(&self, name: &str) -> bool;

    /// 指定名称的 Bean 是否为单例
    fn is_singleton(&self, name: &str) -> BeanResult<bool>;

    /// 获取 Bean 的所有别名
    fn get_aliases(&self, name: &str) -> BeanResult<Vec<String>>;

    /// Bean 的类型名称（尽力而为，用于错误信息）
    fn get_type_name(&self, _name: &str) -> Option<String> {
        None
    }
}

/// BeanFactoryExt - BeanFactory 的扩展 trait
///
/// 提供泛型方法，不能作为 trait object 使用
pub trait BeanFactoryExt: BeanFactory {
    /// 通过名称获取指定类型的 Bean
    fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> BeanResult<Arc<T>> {
        let bean = self.get_bean(name)?;
        bean.downcast::<T>().map_err(|_| BeanError::BeanNotOfRequiredType {
            name: name.to_string(),
            required: std::any::type_name::<T>().to_string(),
            actual: self
                .get_type_name(name)
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

impl<F: BeanFactory + ?Sized> BeanFactoryExt for F {}

/// HierarchicalBeanFactory - 支持父工厂的 Bean 工厂
pub trait HierarchicalBeanFactory: BeanFactory {
    /// 父工厂，没有时为 None
    fn parent_bean_factory(&self) -> Option<Arc<dyn ConfigurableBeanFactory>>;
}

/// ListableBeanFactory - 可列举的 Bean 工厂
///
/// 只考虑本工厂的定义，不包括父工厂和手动注册的单例
pub trait ListableBeanFactory: BeanFactory {
    /// 获取 Bean 定义的数量
    fn get_bean_definition_count(&self) -> usize;

    /// 按注册顺序获取所有定义名称
    fn get_bean_definition_names(&self) -> Vec<String>;

    /// 获取类型匹配的定义名称（使用合并后的定义解析类）
    fn get_bean_definition_names_for_type(&self, type_id: TypeId) -> BeanResult<Vec<String>>;

    /// 检查是否包含指定的 Bean 定义
    fn contains_bean_definition(&self, name: &str) -> bool;
}

/// BeanDefinitionRegistry - 定义注册表
///
/// 定义加载器（例如配置文件解析器）通过这个接口写入定义
pub trait BeanDefinitionRegistry: Send + Sync {
    /// 注册 Bean 定义，注册前会校验
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeanResult<()>;

    /// 移除 Bean 定义
    fn remove_bean_definition(&self, name: &str) -> BeanResult<()>;

    /// 获取单个 Bean 定义（未合并）
    fn get_bean_definition(&self, name: &str) -> BeanResult<BeanDefinition>;

    /// 为 Bean 注册别名
    fn register_alias(&self, name: &str, alias: &str) -> BeanResult<()>;
}

/// ConfigurableBeanFactory - 可配置的 Bean 工厂
pub trait ConfigurableBeanFactory: HierarchicalBeanFactory {
    /// 设置父工厂
    fn set_parent_bean_factory(&self, parent: Arc<dyn ConfigurableBeanFactory>);

    /// 添加 BeanPostProcessor
    fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>);

    /// 获取所有 BeanPostProcessor
    fn get_bean_post_processors(&self) -> Vec<Arc<dyn BeanPostProcessor>>;

    /// 手动注册一个单例，名称已存在时失败
    fn register_singleton(&self, name: &str, instance: BeanInstance) -> BeanResult<()>;

    /// 获取合并后的定义
    ///
    /// `including_ancestors` 为 true 时，本工厂没有该名称的定义会查找父工厂
    fn get_merged_bean_definition(
        &self,
        name: &str,
        including_ancestors: bool,
    ) -> BeanResult<Arc<RootBeanDefinition>>;

    /// 销毁所有单例 Bean（调用 destroy 方法）
    fn destroy_singletons(&self);
}

/// ConfigurableListableBeanFactory - 可配置且可列举的 Bean 工厂
///
/// 这是 BeanFactoryPostProcessor 接收的参数类型
pub trait ConfigurableListableBeanFactory:
    ListableBeanFactory + ConfigurableBeanFactory + BeanDefinitionRegistry
{
    /// 预实例化所有非延迟的单例 Bean
    fn pre_instantiate_singletons(&self) -> BeanResult<()>;
}

/// 类型查找时可以跳过的错误：候选正在创建，或 FactoryBean 的产品尚未就绪
fn is_unresolvable_candidate(error: &BeanError) -> bool {
    matches!(
        error,
        BeanError::FactoryBeanCircularReference { .. } | BeanError::BeanCurrentlyInCreation { .. }
    )
}

/// 定义存储：名称到定义的映射以及注册顺序
#[derive(Default)]
struct DefinitionStore {
    definitions: HashMap<String, BeanDefinition>,
    names: Vec<String>,
}

/// 单例缓存：实例以及加入顺序（销毁时逆序）
#[derive(Default)]
struct SingletonCache {
    instances: HashMap<String, BeanInstance>,
    order: Vec<String>,
}

/// DefaultListableBeanFactory - ConfigurableListableBeanFactory 的默认实现
pub struct DefaultListableBeanFactory {
    /// 工厂名称（用于日志和错误信息）
    display_name: String,

    /// 父工厂
    parent: RwLock<Option<Arc<dyn ConfigurableBeanFactory>>>,

    /// 是否允许同名定义覆盖
    allow_bean_definition_overriding: RwLock<bool>,

    /// Bean 定义存储
    definitions: RwLock<DefinitionStore>,

    /// 别名 -> 规范名称
    aliases: RwLock<HashMap<String, String>>,

    /// 单例 Bean 缓存
    singletons: RwLock<SingletonCache>,

    /// 单例创建与销毁的互斥锁，可重入以便创建过程中获取其它单例
    singleton_lock: ReentrantMutex<()>,

    /// 重入创建检测
    creation_tracker: CreationTracker,

    /// 类名解析表
    class_registry: Arc<ClassRegistry>,

    /// 实例化策略
    instantiation_strategy: RwLock<Arc<dyn InstantiationStrategy>>,

    /// Bean 后置处理器列表（按优先级排序）
    bean_post_processors: RwLock<Vec<Arc<dyn BeanPostProcessor>>>,
}

impl DefaultListableBeanFactory {
    /// 创建新的 Bean 工厂
    pub fn new() -> Self {
        Self::with_class_registry(Arc::new(ClassRegistry::new()))
    }

    /// 使用指定的类注册表创建工厂
    pub fn with_class_registry(class_registry: Arc<ClassRegistry>) -> Self {
        Self {
            display_name: "DefaultListableBeanFactory".to_string(),
            parent: RwLock::new(None),
            allow_bean_definition_overriding: RwLock::new(true),
            definitions: RwLock::new(DefinitionStore::default()),
            aliases: RwLock::new(HashMap::new()),
            singletons: RwLock::new(SingletonCache::default()),
            singleton_lock: ReentrantMutex::new(()),
            creation_tracker: CreationTracker::new(),
            class_registry,
            instantiation_strategy: RwLock::new(Arc::new(SimpleInstantiationStrategy::new())),
            bean_post_processors: RwLock::new(Vec::new()),
        }
    }

    /// 根据配置创建工厂
    pub fn with_config(config: &FactoryConfig) -> Self {
        let class_registry = if config.register_submitted_classes {
            ClassRegistry::from_submitted()
        } else {
            ClassRegistry::new()
        };
        let mut factory = Self::with_class_registry(Arc::new(class_registry));
        if let Some(name) = &config.display_name {
            factory.display_name = name.clone();
        }
        factory.set_allow_bean_definition_overriding(config.allow_bean_definition_overriding);
        factory
    }

    /// 创建以 `parent` 为父工厂的工厂
    pub fn with_parent(parent: Arc<dyn ConfigurableBeanFactory>) -> Self {
        let factory = Self::new();
        factory.set_parent_bean_factory(parent);
        factory
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_allow_bean_definition_overriding(&self, allow: bool) {
        *self.allow_bean_definition_overriding.write() = allow;
    }

    pub fn is_allow_bean_definition_overriding(&self) -> bool {
        *self.allow_bean_definition_overriding.read()
    }

    pub fn class_registry(&self) -> &ClassRegistry {
        &self.class_registry
    }

    /// 向本工厂的类注册表添加一个类
    pub fn register_class(&self, class: Arc<BeanClass>) {
        self.class_registry.register(class);
    }

    pub fn set_instantiation_strategy(&self, strategy: Arc<dyn InstantiationStrategy>) {
        tracing::debug!("Using instantiation strategy '{}'", strategy.name());
        *self.instantiation_strategy.write() = strategy;
    }

    /// 手动注册一个普通对象作为单例
    pub fn register_singleton_object<T: Any + Send + Sync>(
        &self,
        name: &str,
        value: T,
    ) -> BeanResult<()> {
        self.register_singleton(name, BeanInstance::object(value))
    }

    /// 去掉解引用前缀并解析别名，得到规范名称
    fn transformed_bean_name(&self, name: &str) -> BeanResult<String> {
        let stripped = strip_factory_dereference(name);
        if stripped.is_empty() {
            return Err(BeanError::no_such_bean(name, "Cannot get bean with null name"));
        }
        Ok(self.canonical_name(stripped))
    }

    fn canonical_name(&self, name: &str) -> String {
        self.aliases
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    fn cached_singleton(&self, bean_name: &str) -> Option<BeanInstance> {
        self.singletons.read().instances.get(bean_name).cloned()
    }

    /// 单例名称快照（按加入顺序）
    pub fn get_singleton_names(&self) -> Vec<String> {
        self.singletons.read().order.clone()
    }

    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.read().instances.contains_key(name)
    }

    fn track_creation(&self, bean_name: &str) -> BeanResult<CreationGuard<'_>> {
        self.creation_tracker
            .start_creating(bean_name)
            .map_err(|chain| BeanError::BeanCurrentlyInCreation {
                name: bean_name.to_string(),
                chain,
            })
    }

    fn do_get_bean(&self, name: &str) -> BeanResult<Object> {
        let bean_name = self.transformed_bean_name(name)?;
        tracing::trace!("Requesting bean '{}'", bean_name);

        if let Some(instance) = self.cached_singleton(&bean_name) {
            tracing::debug!("Returning cached instance of singleton bean '{}'", bean_name);
            return self.get_object_for_shared_instance(name, &bean_name, instance);
        }

        let merged = match self.get_merged_bean_definition(&bean_name, false) {
            Ok(merged) => merged,
            Err(e) if e.is_not_found() && !self.contains_bean_definition(&bean_name) => {
                return match self.parent_bean_factory() {
                    Some(parent) => {
                        tracing::trace!("Delegating lookup of bean '{}' to parent factory", name);
                        parent.get_bean(name)
                    }
                    None => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        if merged.is_abstract() {
            return Err(BeanError::BeanIsAbstract { name: bean_name });
        }

        let instance = if merged.is_singleton() {
            self.get_or_create_singleton(&bean_name, &merged)?
        } else {
            tracing::debug!("Creating instance of prototype bean '{}'", bean_name);
            let _guard = self.track_creation(&bean_name)?;
            self.create_bean(&bean_name, &merged)?
        };

        self.get_object_for_shared_instance(name, &bean_name, instance)
    }

    /// 双重检查：持有单例锁后再次检查缓存，创建成功后才放入缓存
    fn get_or_create_singleton(
        &self,
        bean_name: &str,
        merged: &RootBeanDefinition,
    ) -> BeanResult<BeanInstance> {
        let _lock = self.singleton_lock.lock();

        if let Some(instance) = self.cached_singleton(bean_name) {
            tracing::debug!("Singleton bean '{}' was created concurrently", bean_name);
            return Ok(instance);
        }

        let _guard = self.track_creation(bean_name)?;
        tracing::info!("Creating shared instance of singleton bean '{}'", bean_name);
        let instance = self.create_bean(bean_name, merged)?;

        let mut cache = self.singletons.write();
        cache.instances.insert(bean_name.to_string(), instance.clone());
        cache.order.push(bean_name.to_string());
        Ok(instance)
    }

    /// 处理 FactoryBean：解引用时返回工厂本身，否则返回产品
    fn get_object_for_shared_instance(
        &self,
        name: &str,
        bean_name: &str,
        instance: BeanInstance,
    ) -> BeanResult<Object> {
        if is_factory_dereference(name) {
            return match instance {
                BeanInstance::Factory { raw, .. } => Ok(raw),
                BeanInstance::Object(_) => Err(BeanError::BeanIsNotAFactory {
                    name: bean_name.to_string(),
                    type_name: self
                        .get_type_name(bean_name)
                        .unwrap_or_else(|| "unknown".to_string()),
                }),
            };
        }

        match instance {
            BeanInstance::Object(object) => Ok(object),
            BeanInstance::Factory { factory, .. } => {
                tracing::trace!("Bean with name '{}' is a factory bean", bean_name);
                let product = factory.get_object().map_err(|e| {
                    BeanError::from_creation(
                        bean_name,
                        None,
                        e.context("FactoryBean threw exception on object creation"),
                    )
                })?;
                product.ok_or_else(|| BeanError::FactoryBeanCircularReference {
                    name: bean_name.to_string(),
                })
            }
        }
    }

    /// 创建 Bean：depends-on、实例化、后置处理器与 init 方法
    fn create_bean(&self, bean_name: &str, merged: &RootBeanDefinition) -> BeanResult<BeanInstance> {
        let resource = merged.resource_description();

        for dependency in merged.depends_on() {
            tracing::debug!(
                "Initializing bean '{}' that bean '{}' depends on",
                dependency,
                bean_name
            );
            self.get_bean(dependency)?;
        }

        let class = merged.resolve_bean_class(bean_name, &self.class_registry)?;
        if let Some(class) = &class {
            if class.is_factory_bean() && !merged.is_singleton() {
                return Err(BeanError::BeanDefinitionValidation {
                    name: bean_name.to_string(),
                    resource_description: resource.map(str::to_string),
                    message: "FactoryBean must be defined as singleton - FactoryBeans themselves are not allowed to be prototypes".to_string(),
                });
            }
        }

        let strategy = self.instantiation_strategy.read().clone();
        let ctx = BeanCreationContext::new(bean_name, merged, self);
        let instance = strategy
            .instantiate(&ctx, class.as_deref())
            .map_err(|e| BeanError::from_creation(bean_name, resource, e))?;

        match instance {
            BeanInstance::Object(object) => {
                let object = self.apply_bean_post_processors_before_initialization(object, bean_name, resource)?;
                self.invoke_init_method(bean_name, merged, class.as_deref(), &*object)?;
                let object = self.apply_bean_post_processors_after_initialization(object, bean_name, resource)?;
                Ok(BeanInstance::Object(object))
            }
            BeanInstance::Factory { factory, raw } => {
                tracing::trace!("Invoking after_properties_set on factory bean '{}'", bean_name);
                factory
                    .after_properties_set()
                    .map_err(|e| BeanError::from_creation(bean_name, resource, e))?;
                self.invoke_init_method(bean_name, merged, class.as_deref(), &*raw)?;
                Ok(BeanInstance::Factory { factory, raw })
            }
        }
    }

    fn invoke_init_method(
        &self,
        bean_name: &str,
        merged: &RootBeanDefinition,
        class: Option<&BeanClass>,
        target: &(dyn Any + Send + Sync),
    ) -> BeanResult<()> {
        let Some(method) = merged.init_method_name() else {
            return Ok(());
        };
        tracing::debug!(
            "Invoking init method '{}' on bean with name '{}'",
            method,
            bean_name
        );
        let result = match class {
            Some(class) => class.invoke_method(method, target),
            None => Err(anyhow::anyhow!(
                "Cannot invoke init method '{}' without a bean class",
                method
            )),
        };
        result.map_err(|e| BeanError::from_creation(bean_name, merged.resource_description(), e))
    }

    /// 应用 BeanPostProcessor.postProcessBeforeInitialization
    fn apply_bean_post_processors_before_initialization(
        &self,
        bean: Object,
        bean_name: &str,
        resource: Option<&str>,
    ) -> BeanResult<Object> {
        let processors = self.get_bean_post_processors();
        let mut current_bean = bean;

        for processor in processors.iter() {
            tracing::trace!(
                "Applying '{}' before initialization of bean '{}'",
                processor.name(),
                bean_name
            );
            current_bean = processor
                .post_process_before_initialization(current_bean, bean_name)
                .map_err(|e| BeanError::from_creation(bean_name, resource, e))?;
        }

        Ok(current_bean)
    }

    /// 应用 BeanPostProcessor.postProcessAfterInitialization
    fn apply_bean_post_processors_after_initialization(
        &self,
        bean: Object,
        bean_name: &str,
        resource: Option<&str>,
    ) -> BeanResult<Object> {
        let processors = self.get_bean_post_processors();
        let mut current_bean = bean;

        for processor in processors.iter() {
            tracing::trace!(
                "Applying '{}' after initialization of bean '{}'",
                processor.name(),
                bean_name
            );
            current_bean = processor
                .post_process_after_initialization(current_bean, bean_name)
                .map_err(|e| BeanError::from_creation(bean_name, resource, e))?;
        }

        Ok(current_bean)
    }

    /// 获取 FactoryBean 本身（会触发工厂的创建）
    fn get_factory_bean(&self, bean_name: &str) -> BeanResult<Arc<dyn FactoryBean>> {
        self.get_bean(&factory_dereference(bean_name))?;
        self.cached_singleton(bean_name)
            .and_then(|instance| instance.as_factory().cloned())
            .ok_or_else(|| BeanError::BeanIsNotAFactory {
                name: bean_name.to_string(),
                type_name: self
                    .get_type_name(bean_name)
                    .unwrap_or_else(|| "unknown".to_string()),
            })
    }

    fn merge_bean_definition(
        &self,
        bean_name: &str,
        including_ancestors: bool,
        visiting: &mut Vec<String>,
    ) -> BeanResult<Arc<RootBeanDefinition>> {
        if including_ancestors && !self.contains_bean_definition(bean_name) {
            if let Some(parent) = self.parent_bean_factory() {
                return parent.get_merged_bean_definition(bean_name, true);
            }
        }

        match self.get_bean_definition(bean_name)? {
            BeanDefinition::Root(root) => Ok(root),
            BeanDefinition::Child(child) => {
                if visiting.iter().any(|n| n == bean_name) {
                    visiting.push(bean_name.to_string());
                    return Err(BeanError::store(
                        bean_name,
                        child.resource_description().map(str::to_string),
                        format!("Circular parent relationship: {}", visiting.join(" -> ")),
                    ));
                }
                visiting.push(bean_name.to_string());

                let parent_name = self.transformed_bean_name(child.parent_name())?;
                let parent_definition = if parent_name != bean_name {
                    self.merge_bean_definition(&parent_name, true, visiting)?
                } else {
                    match self.parent_bean_factory() {
                        Some(parent) => parent.get_merged_bean_definition(&parent_name, true)?,
                        None => {
                            return Err(BeanError::no_such_bean(
                                parent_name,
                                "Parent name is equal to bean name but there is no parent factory",
                            ))
                        }
                    }
                };

                Ok(Arc::new(parent_definition.merge_child(&child)))
            }
        }
    }

    /// 获取指定类型的所有 Bean
    ///
    /// 依次考虑：类型匹配的定义、手动注册的单例、以及（可选）FactoryBean 的产品。
    /// 当前线程正在创建的 Bean，以及产品尚未就绪（循环引用）的 FactoryBean 会被跳过。
    pub fn get_beans_of_type<T: Any + Send + Sync>(
        &self,
        include_prototypes: bool,
        include_factory_beans: bool,
    ) -> BeanResult<HashMap<String, Arc<T>>> {
        let type_id = TypeId::of::<T>();
        let mut result = HashMap::new();

        for name in self.get_bean_definition_names_for_type(type_id)? {
            if self.skip_if_in_creation(&name) {
                continue;
            }
            let merged = self.get_merged_bean_definition(&name, false)?;
            if !include_prototypes && !merged.is_singleton() {
                continue;
            }
            let is_factory_class = merged
                .resolve_bean_class(&name, &self.class_registry)?
                .is_some_and(|c| c.is_factory_bean());
            let lookup = if is_factory_class {
                factory_dereference(&name)
            } else {
                name.clone()
            };
            let bean = match self.get_bean(&lookup) {
                Ok(bean) => bean,
                Err(e) if is_unresolvable_candidate(&e) => {
                    tracing::debug!("Ignoring bean '{}' during type lookup: {}", name, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            match bean.downcast::<T>() {
                Ok(bean) => {
                    result.insert(name, bean);
                }
                Err(_) => tracing::debug!(
                    "Bean '{}' was replaced by a post-processor and no longer matches the requested type",
                    name
                ),
            }
        }

        let manual_singletons: Vec<(String, BeanInstance)> = {
            let cache = self.singletons.read();
            cache
                .order
                .iter()
                .filter_map(|name| cache.instances.get(name).map(|i| (name.clone(), i.clone())))
                .collect()
        };
        let mut factory_names = Vec::new();
        for (name, instance) in manual_singletons {
            if self.contains_bean_definition(&name) {
                continue;
            }
            if instance.is_factory() {
                factory_names.push(name.clone());
            }
            if let Ok(bean) = instance.raw().clone().downcast::<T>() {
                result.insert(name, bean);
            }
        }

        if include_factory_beans {
            for name in self.get_bean_definition_names() {
                let merged = self.get_merged_bean_definition(&name, false)?;
                if merged.is_abstract() {
                    continue;
                }
                let class = merged.resolve_bean_class(&name, &self.class_registry)?;
                if class.is_some_and(|c| c.is_factory_bean()) {
                    factory_names.push(name);
                }
            }

            for name in factory_names {
                if self.skip_if_in_creation(&name) {
                    continue;
                }
                match self.get_factory_product::<T>(&name, type_id, include_prototypes) {
                    Ok(Some(product)) => {
                        result.insert(name, product);
                    }
                    Ok(None) => {}
                    Err(e) if is_unresolvable_candidate(&e) => {
                        tracing::debug!(
                            "Ignoring factory bean '{}' during type lookup: not fully initialized due to circular bean reference",
                            name
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(result)
    }

    fn skip_if_in_creation(&self, name: &str) -> bool {
        let creating = self.creation_tracker.is_creating(name);
        if creating {
            tracing::debug!(
                "Ignoring bean '{}' during type lookup: currently in creation",
                name
            );
        }
        creating
    }

    fn get_factory_product<T: Any + Send + Sync>(
        &self,
        name: &str,
        type_id: TypeId,
        include_prototypes: bool,
    ) -> BeanResult<Option<Arc<T>>> {
        let factory = self.get_factory_bean(name)?;
        let candidate = match factory.object_type() {
            None => factory.is_singleton(),
            Some(object_type) => {
                object_type == type_id && (factory.is_singleton() || include_prototypes)
            }
        };
        if !candidate {
            return Ok(None);
        }
        Ok(self.get_bean(name)?.downcast::<T>().ok())
    }

    /// 返回依赖（depends-on）于指定 Bean 的所有 Bean 名称
    pub fn get_depending_bean_names(&self, name: &str) -> BeanResult<Vec<String>> {
        let bean_name = self.transformed_bean_name(name)?;
        let mut dependents = Vec::new();
        for candidate in self.get_bean_definition_names() {
            let merged = self.get_merged_bean_definition(&candidate, false)?;
            if merged
                .depends_on()
                .iter()
                .any(|dependency| self.canonical_name(dependency) == bean_name)
            {
                dependents.push(candidate);
            }
        }
        Ok(dependents)
    }

    /// 校验 depends-on 依赖图：不存在的依赖与循环依赖
    pub fn validate_dependencies(&self) -> BeanResult<()> {
        let mut graph: HashMap<String, Vec<String>> = HashMap::new();
        for name in self.get_bean_definition_names() {
            let merged = self.get_merged_bean_definition(&name, false)?;
            let dependencies: Vec<String> = merged
                .depends_on()
                .iter()
                .map(|dependency| self.canonical_name(dependency))
                .collect();
            graph.insert(name, dependencies);
        }

        // 由父工厂或手动单例提供的依赖视为叶子节点
        let external: Vec<String> = graph
            .values()
            .flatten()
            .filter(|dependency| !graph.contains_key(*dependency) && self.contains_bean(dependency))
            .cloned()
            .collect();
        for dependency in external {
            graph.entry(dependency).or_default();
        }

        validate_dependency_graph(&graph).map_err(|e| BeanError::DependencyValidation(e.to_string()))
    }

    /// 销毁单个单例：先从缓存移除，再销毁依赖它的 Bean，最后调用 destroy 方法
    pub fn destroy_singleton(&self, name: &str) {
        let _lock = self.singleton_lock.lock();

        let removed = {
            let mut cache = self.singletons.write();
            let removed = cache.instances.remove(name);
            if removed.is_some() {
                cache.order.retain(|n| n != name);
            }
            removed
        };
        let Some(instance) = removed else {
            return;
        };

        let dependents = self.get_depending_bean_names(name).unwrap_or_else(|e| {
            tracing::warn!("Could not determine beans depending on '{}': {}", name, e);
            Vec::new()
        });
        for dependent in dependents {
            tracing::debug!(
                "Destroying bean '{}' that depends on bean '{}'",
                dependent,
                name
            );
            self.destroy_singleton(&dependent);
        }

        self.destroy_bean(name, &instance);
    }

    fn destroy_bean(&self, bean_name: &str, instance: &BeanInstance) {
        tracing::debug!("Destroying bean '{}'", bean_name);
        if let Some(factory) = instance.as_factory() {
            if let Err(e) = factory.destroy() {
                tracing::warn!(
                    "Destroy callback on factory bean with name '{}' threw an exception: {:#}",
                    bean_name,
                    e
                );
            }
        }

        let Ok(merged) = self.get_merged_bean_definition(bean_name, false) else {
            return;
        };
        let class = match merged.resolve_bean_class(bean_name, &self.class_registry) {
            Ok(class) => class,
            Err(e) => {
                tracing::warn!("Cannot resolve class of bean '{}' for destruction: {}", bean_name, e);
                return;
            }
        };
        let strategy = self.instantiation_strategy.read().clone();
        if let Err(e) = strategy.destroy(bean_name, &merged, class.as_deref(), instance) {
            tracing::warn!(
                "Destroy method on bean with name '{}' threw an exception: {:#}",
                bean_name,
                e
            );
        }
    }
}

impl Default for DefaultListableBeanFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanFactory for DefaultListableBeanFactory {
    fn get_bean(&self, name: &str) -> BeanResult<Object> {
        self.do_get_bean(name)
    }

    fn contains_bean(&self, name: &str) -> bool {
        let Ok(bean_name) = self.transformed_bean_name(name) else {
            return false;
        };
        if self.contains_singleton(&bean_name) || self.contains_bean_definition(&bean_name) {
            return true;
        }
        self.parent_bean_factory()
            .is_some_and(|parent| parent.contains_bean(name))
    }

    fn is_singleton(&self, name: &str) -> BeanResult<bool> {
        let bean_name = self.transformed_bean_name(name)?;

        if let Some(instance) = self.cached_singleton(&bean_name) {
            return Ok(match instance.as_factory() {
                Some(factory) if !is_factory_dereference(name) => factory.is_singleton(),
                _ => true,
            });
        }

        let merged = match self.get_merged_bean_definition(&bean_name, false) {
            Ok(merged) => merged,
            Err(e) if e.is_not_found() && !self.contains_bean_definition(&bean_name) => {
                return match self.parent_bean_factory() {
                    Some(parent) => parent.is_singleton(name),
                    None => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        let class = merged.resolve_bean_class(&bean_name, &self.class_registry)?;
        if class.is_some_and(|c| c.is_factory_bean()) && !is_factory_dereference(name) {
            return Ok(self.get_factory_bean(&bean_name)?.is_singleton());
        }
        Ok(merged.is_singleton())
    }

    fn get_aliases(&self, name: &str) -> BeanResult<Vec<String>> {
        let bean_name = self.transformed_bean_name(name)?;

        if self.contains_bean_definition(&bean_name) || self.contains_singleton(&bean_name) {
            let mut aliases: Vec<String> = self
                .aliases
                .read()
                .iter()
                .filter(|(_, target)| **target == bean_name)
                .map(|(alias, _)| alias.clone())
                .collect();
            aliases.sort();
            return Ok(aliases);
        }

        match self.parent_bean_factory() {
            Some(parent) => parent.get_aliases(name),
            None => Err(BeanError::no_such_bean(bean_name, self.to_string())),
        }
    }

    fn get_type_name(&self, name: &str) -> Option<String> {
        let bean_name = self.transformed_bean_name(name).ok()?;
        let merged = self.get_merged_bean_definition(&bean_name, true).ok()?;
        if let Some(class) = merged.bean_class() {
            return Some(class.type_name().to_string());
        }
        merged.bean_class_name().map(str::to_string)
    }
}

impl HierarchicalBeanFactory for DefaultListableBeanFactory {
    fn parent_bean_factory(&self) -> Option<Arc<dyn ConfigurableBeanFactory>> {
        self.parent.read().clone()
    }
}

impl ListableBeanFactory for DefaultListableBeanFactory {
    fn get_bean_definition_count(&self) -> usize {
        self.definitions.read().definitions.len()
    }

    fn get_bean_definition_names(&self) -> Vec<String> {
        self.definitions.read().names.clone()
    }

    fn get_bean_definition_names_for_type(&self, type_id: TypeId) -> BeanResult<Vec<String>> {
        let mut names = Vec::new();
        for name in self.get_bean_definition_names() {
            let merged = self.get_merged_bean_definition(&name, false)?;
            if merged.is_abstract() || !merged.has_bean_class() {
                continue;
            }
            let class = merged.resolve_bean_class(&name, &self.class_registry)?;
            if class.is_some_and(|c| c.is_assignable_to(type_id)) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.definitions.read().definitions.contains_key(name)
    }
}

impl BeanDefinitionRegistry for DefaultListableBeanFactory {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeanResult<()> {
        if name.is_empty() {
            return Err(BeanError::BeanDefinitionValidation {
                name: String::new(),
                resource_description: definition.resource_description().map(str::to_string),
                message: "Bean name must not be empty".to_string(),
            });
        }
        definition.validate(name)?;

        let allow_overriding = self.is_allow_bean_definition_overriding();
        let mut store = self.definitions.write();
        match store.definitions.get(name) {
            Some(old) if !allow_overriding => {
                return Err(BeanError::store(
                    name,
                    definition.resource_description().map(str::to_string),
                    format!(
                        "Cannot register bean definition [{}] for bean '{}': there's already [{}] bound",
                        definition, name, old
                    ),
                ));
            }
            Some(old) => {
                tracing::info!(
                    "Overriding bean definition for bean '{}': replacing [{}] with [{}]",
                    name,
                    old,
                    definition
                );
            }
            None => store.names.push(name.to_string()),
        }
        store.definitions.insert(name.to_string(), definition);

        tracing::debug!("Bean definition registered: '{}'", name);
        Ok(())
    }

    fn remove_bean_definition(&self, name: &str) -> BeanResult<()> {
        let removed = {
            let mut store = self.definitions.write();
            let removed = store.definitions.remove(name);
            if removed.is_some() {
                store.names.retain(|n| n != name);
            }
            removed
        };
        if removed.is_none() {
            return Err(BeanError::no_such_bean(name, self.to_string()));
        }

        tracing::debug!("Bean definition removed: '{}'", name);
        Ok(())
    }

    fn get_bean_definition(&self, name: &str) -> BeanResult<BeanDefinition> {
        let definition = self.definitions.read().definitions.get(name).cloned();
        definition.ok_or_else(|| BeanError::no_such_bean(name, self.to_string()))
    }

    fn register_alias(&self, name: &str, alias: &str) -> BeanResult<()> {
        if name.is_empty() || alias.is_empty() {
            return Err(BeanError::store(
                alias,
                None,
                "Bean name and alias must not be empty",
            ));
        }
        if name == alias {
            tracing::debug!("Ignoring alias '{}' equal to its bean name", alias);
            return Ok(());
        }

        let mut aliases = self.aliases.write();
        match aliases.get(alias) {
            Some(existing) if existing == name => return Ok(()),
            Some(existing) => {
                return Err(BeanError::store(
                    alias,
                    None,
                    format!(
                        "Cannot register alias '{}' for bean name '{}': it's already registered for bean name '{}'",
                        alias, name, existing
                    ),
                ));
            }
            None => {}
        }
        tracing::debug!("Registering alias '{}' for bean with name '{}'", alias, name);
        aliases.insert(alias.to_string(), name.to_string());
        Ok(())
    }
}

impl ConfigurableBeanFactory for DefaultListableBeanFactory {
    fn set_parent_bean_factory(&self, parent: Arc<dyn ConfigurableBeanFactory>) {
        *self.parent.write() = Some(parent);
    }

    fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>) {
        tracing::debug!("Adding bean post-processor '{}'", processor.name());
        let mut processors = self.bean_post_processors.write();
        processors.push(processor);

        // 按优先级排序（order 值越小优先级越高）
        processors.sort_by_key(|p| p.order());
    }

    fn get_bean_post_processors(&self) -> Vec<Arc<dyn BeanPostProcessor>> {
        self.bean_post_processors.read().clone()
    }

    fn register_singleton(&self, name: &str, instance: BeanInstance) -> BeanResult<()> {
        if name.is_empty() {
            return Err(BeanError::store(name, None, "Bean name must not be empty"));
        }
        let _lock = self.singleton_lock.lock();
        let mut cache = self.singletons.write();
        if cache.instances.contains_key(name) {
            return Err(BeanError::store(
                name,
                None,
                format!(
                    "Could not register object [{:?}] under bean name '{}': there's already an object bound",
                    instance, name
                ),
            ));
        }
        tracing::debug!("Registering singleton bean '{}'", name);
        cache.instances.insert(name.to_string(), instance);
        cache.order.push(name.to_string());
        Ok(())
    }

    fn get_merged_bean_definition(
        &self,
        name: &str,
        including_ancestors: bool,
    ) -> BeanResult<Arc<RootBeanDefinition>> {
        let bean_name = self.transformed_bean_name(name)?;
        let mut visiting = Vec::new();
        self.merge_bean_definition(&bean_name, including_ancestors, &mut visiting)
    }

    fn destroy_singletons(&self) {
        let _lock = self.singleton_lock.lock();
        let names: Vec<String> = self.get_singleton_names().into_iter().rev().collect();
        tracing::info!("Destroying singletons in factory {}", self.display_name);

        for name in names {
            self.destroy_singleton(&name);
        }
    }
}

impl ConfigurableListableBeanFactory for DefaultListableBeanFactory {
    fn pre_instantiate_singletons(&self) -> BeanResult<()> {
        tracing::info!("Pre-instantiating singletons in factory {}", self.display_name);

        for name in self.get_bean_definition_names() {
            let merged = self.get_merged_bean_definition(&name, false)?;
            if merged.is_abstract() || !merged.is_singleton() || merged.is_lazy_init() {
                continue;
            }

            let class = merged.resolve_bean_class(&name, &self.class_registry)?;
            if class.is_some_and(|c| c.is_factory_bean()) {
                let factory = self.get_factory_bean(&name)?;
                if factory.is_singleton() {
                    self.get_bean(&name)?;
                }
            } else {
                self.get_bean(&name)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for DefaultListableBeanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} defining beans [{}]; ",
            self.display_name,
            self.get_bean_definition_names().join(",")
        )?;
        if self.parent.read().is_some() {
            f.write_str("parent: set")
        } else {
            f.write_str("root of factory hierarchy")
        }
    }
}

impl fmt::Debug for DefaultListableBeanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultListableBeanFactory")
            .field("display_name", &self.display_name)
            .field("bean_definition_names", &self.get_bean_definition_names())
            .field("singletons", &self.get_singleton_names())
            .field("has_parent", &self.parent.read().is_some())
            .finish()
    }
}
