//! Bean 定义
//!
//! 描述如何构建一个 Bean：类引用、作用域、属性值、构造参数、装配模式、
//! init/destroy 方法以及依赖关系。定义分为两种：
//!
//! - [`RootBeanDefinition`] 完整的定义，可以直接用于创建 Bean
//! - [`ChildBeanDefinition`] 只记录相对父定义的差异，使用前需要合并

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::bean_class::{BeanClass, ClassRegistry};
use crate::error::{BeanError, BeanResult};
use crate::scope::Scope;
use crate::value::{ConstructorArgumentValues, MutablePropertyValues, Value, ValueHolder};

/// 自动装配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutowireMode {
    #[default]
    No,
    ByName,
    ByType,
    Constructor,
    /// 根据类是否有默认构造函数在 Constructor 与 ByType 之间选择
    Autodetect,
}

/// 依赖检查模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyCheck {
    #[default]
    None,
    Objects,
    Simple,
    All,
}

/// 完整的 Bean 定义
#[derive(Debug, Clone, Default)]
pub struct RootBeanDefinition {
    bean_class_name: Option<String>,
    bean_class: OnceLock<Arc<BeanClass>>,
    scope: Scope,
    lazy_init: bool,
    is_abstract: bool,
    property_values: MutablePropertyValues,
    constructor_argument_values: ConstructorArgumentValues,
    autowire_mode: AutowireMode,
    dependency_check: DependencyCheck,
    depends_on: Vec<String>,
    init_method_name: Option<String>,
    destroy_method_name: Option<String>,
    factory_method_name: Option<String>,
    factory_bean_name: Option<String>,
    resource_description: Option<String>,
}

impl RootBeanDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用已解析的类创建定义
    pub fn with_class(class: Arc<BeanClass>) -> Self {
        let definition = Self {
            bean_class_name: Some(class.name().to_string()),
            ..Self::default()
        };
        let _ = definition.bean_class.set(class);
        definition
    }

    /// 只记录类名，由工厂的类注册表延迟解析
    pub fn with_class_name(class_name: impl Into<String>) -> Self {
        Self {
            bean_class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_singleton(self, singleton: bool) -> Self {
        self.with_scope(Scope::from_singleton(singleton))
    }

    pub fn with_lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = lazy_init;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.property_values.add(name, value);
        self
    }

    pub fn with_property_values(mut self, property_values: MutablePropertyValues) -> Self {
        self.property_values = property_values;
        self
    }

    pub fn with_constructor_arg(mut self, index: usize, value: impl Into<Value>) -> Self {
        self.constructor_argument_values
            .add_indexed_argument_value(index, ValueHolder::new(value));
        self
    }

    pub fn with_constructor_argument_values(mut self, values: ConstructorArgumentValues) -> Self {
        self.constructor_argument_values = values;
        self
    }

    pub fn with_autowire_mode(mut self, mode: AutowireMode) -> Self {
        self.autowire_mode = mode;
        self
    }

    pub fn with_dependency_check(mut self, check: DependencyCheck) -> Self {
        self.dependency_check = check;
        self
    }

    pub fn with_depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_init_method(mut self, name: impl Into<String>) -> Self {
        self.init_method_name = Some(name.into());
        self
    }

    pub fn with_destroy_method(mut self, name: impl Into<String>) -> Self {
        self.destroy_method_name = Some(name.into());
        self
    }

    pub fn with_factory_method(mut self, name: impl Into<String>) -> Self {
        self.factory_method_name = Some(name.into());
        self
    }

    /// 实例工厂方法所在的 Bean
    pub fn with_factory_bean(mut self, name: impl Into<String>) -> Self {
        self.factory_bean_name = Some(name.into());
        self
    }

    pub fn with_resource_description(mut self, description: impl Into<String>) -> Self {
        self.resource_description = Some(description.into());
        self
    }

    pub fn bean_class_name(&self) -> Option<&str> {
        self.bean_class_name.as_deref()
    }

    /// 已解析的类（未解析时为 None）
    pub fn bean_class(&self) -> Option<&Arc<BeanClass>> {
        self.bean_class.get()
    }

    pub fn has_bean_class(&self) -> bool {
        self.bean_class_name.is_some()
    }

    /// 解析 Bean 类，结果会被缓存
    ///
    /// 没有类名时返回 `Ok(None)`；类名在注册表中不存在时返回
    /// [`BeanError::CannotLoadBeanClass`]。
    pub fn resolve_bean_class(
        &self,
        bean_name: &str,
        registry: &ClassRegistry,
    ) -> BeanResult<Option<Arc<BeanClass>>> {
        if let Some(class) = self.bean_class.get() {
            return Ok(Some(class.clone()));
        }
        let Some(class_name) = self.bean_class_name.as_deref() else {
            return Ok(None);
        };
        let class = registry
            .resolve(class_name)
            .ok_or_else(|| BeanError::CannotLoadBeanClass {
                name: bean_name.to_string(),
                class_name: class_name.to_string(),
            })?;
        Ok(Some(self.bean_class.get_or_init(|| class).clone()))
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_singleton(&self) -> bool {
        self.scope.is_singleton()
    }

    pub fn is_lazy_init(&self) -> bool {
        self.lazy_init
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn property_values(&self) -> &MutablePropertyValues {
        &self.property_values
    }

    pub fn constructor_argument_values(&self) -> &ConstructorArgumentValues {
        &self.constructor_argument_values
    }

    pub fn autowire_mode(&self) -> AutowireMode {
        self.autowire_mode
    }

    /// 解析后的装配模式，Autodetect 会被替换为具体模式
    pub fn resolved_autowire_mode(&self) -> AutowireMode {
        match self.autowire_mode {
            AutowireMode::Autodetect => match self.bean_class() {
                Some(class) if !class.has_default_constructor() => AutowireMode::Constructor,
                _ => AutowireMode::ByType,
            },
            mode => mode,
        }
    }

    pub fn dependency_check(&self) -> DependencyCheck {
        self.dependency_check
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn init_method_name(&self) -> Option<&str> {
        self.init_method_name.as_deref()
    }

    pub fn destroy_method_name(&self) -> Option<&str> {
        self.destroy_method_name.as_deref()
    }

    pub fn factory_method_name(&self) -> Option<&str> {
        self.factory_method_name.as_deref()
    }

    pub fn factory_bean_name(&self) -> Option<&str> {
        self.factory_bean_name.as_deref()
    }

    pub fn resource_description(&self) -> Option<&str> {
        self.resource_description.as_deref()
    }

    /// 结构性校验
    pub fn validate(&self, bean_name: &str) -> BeanResult<()> {
        if self.property_values.has_rejected_names() {
            return Err(self.validation_error(bean_name, "Property name must not be empty"));
        }
        if self.lazy_init && !self.is_singleton() {
            return Err(self.validation_error(
                bean_name,
                "Lazy initialization is only applicable to singleton beans",
            ));
        }
        if self.bean_class_name.is_none() && self.factory_bean_name.is_none() {
            return Err(self.validation_error(
                bean_name,
                "Bean class must be set in RootBeanDefinition",
            ));
        }
        if let Some(class) = self.bean_class() {
            if class.is_factory_bean() && !self.is_singleton() {
                return Err(self.validation_error(
                    bean_name,
                    "FactoryBean must be defined as singleton - FactoryBeans themselves are not allowed to be prototypes",
                ));
            }
            if self.factory_method_name.is_none() && !class.has_public_constructor() {
                return Err(self.validation_error(
                    bean_name,
                    format!("Bean class [{}] has no public constructors", class.name()),
                ));
            }
        }
        Ok(())
    }

    fn validation_error(&self, bean_name: &str, message: impl Into<String>) -> BeanError {
        BeanError::BeanDefinitionValidation {
            name: bean_name.to_string(),
            resource_description: self.resource_description.clone(),
            message: message.into(),
        }
    }

    /// 以当前定义为父定义，叠加子定义的差异，得到新的完整定义
    ///
    /// 父定义本身不会被修改。
    pub fn merge_child(&self, child: &ChildBeanDefinition) -> RootBeanDefinition {
        let mut merged = self.clone();
        merged.property_values.add_property_values(&child.property_values);
        merged.scope = child.scope;
        merged.lazy_init = child.lazy_init;
        merged.is_abstract = child.is_abstract;
        merged.resource_description = child.resource_description.clone();
        merged
    }
}

/// 继承父定义的 Bean 定义
#[derive(Debug, Clone)]
pub struct ChildBeanDefinition {
    parent_name: String,
    property_values: MutablePropertyValues,
    scope: Scope,
    lazy_init: bool,
    is_abstract: bool,
    resource_description: Option<String>,
}

impl ChildBeanDefinition {
    pub fn new(parent_name: impl Into<String>) -> Self {
        Self {
            parent_name: parent_name.into(),
            property_values: MutablePropertyValues::new(),
            scope: Scope::Singleton,
            lazy_init: false,
            is_abstract: false,
            resource_description: None,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_singleton(self, singleton: bool) -> Self {
        self.with_scope(Scope::from_singleton(singleton))
    }

    pub fn with_lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = lazy_init;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.property_values.add(name, value);
        self
    }

    pub fn with_property_values(mut self, property_values: MutablePropertyValues) -> Self {
        self.property_values = property_values;
        self
    }

    pub fn with_resource_description(mut self, description: impl Into<String>) -> Self {
        self.resource_description = Some(description.into());
        self
    }

    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_singleton(&self) -> bool {
        self.scope.is_singleton()
    }

    pub fn is_lazy_init(&self) -> bool {
        self.lazy_init
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn property_values(&self) -> &MutablePropertyValues {
        &self.property_values
    }

    pub fn resource_description(&self) -> Option<&str> {
        self.resource_description.as_deref()
    }

    pub fn validate(&self, bean_name: &str) -> BeanResult<()> {
        let message = if self.property_values.has_rejected_names() {
            "Property name must not be empty"
        } else if self.lazy_init && !self.is_singleton() {
            "Lazy initialization is only applicable to singleton beans"
        } else if self.parent_name.is_empty() {
            "parentName must be set in ChildBeanDefinition"
        } else {
            return Ok(());
        };
        Err(BeanError::BeanDefinitionValidation {
            name: bean_name.to_string(),
            resource_description: self.resource_description.clone(),
            message: message.to_string(),
        })
    }
}

/// Bean 定义，Root 或 Child
#[derive(Debug, Clone)]
pub enum BeanDefinition {
    Root(Arc<RootBeanDefinition>),
    Child(Arc<ChildBeanDefinition>),
}

impl BeanDefinition {
    pub fn is_abstract(&self) -> bool {
        match self {
            BeanDefinition::Root(root) => root.is_abstract(),
            BeanDefinition::Child(child) => child.is_abstract(),
        }
    }

    pub fn is_singleton(&self) -> bool {
        match self {
            BeanDefinition::Root(root) => root.is_singleton(),
            BeanDefinition::Child(child) => child.is_singleton(),
        }
    }

    pub fn is_lazy_init(&self) -> bool {
        match self {
            BeanDefinition::Root(root) => root.is_lazy_init(),
            BeanDefinition::Child(child) => child.is_lazy_init(),
        }
    }

    pub fn property_values(&self) -> &MutablePropertyValues {
        match self {
            BeanDefinition::Root(root) => root.property_values(),
            BeanDefinition::Child(child) => child.property_values(),
        }
    }

    /// 子定义不携带构造参数
    pub fn constructor_argument_values(&self) -> Option<&ConstructorArgumentValues> {
        match self {
            BeanDefinition::Root(root) => Some(root.constructor_argument_values()),
            BeanDefinition::Child(_) => None,
        }
    }

    pub fn resource_description(&self) -> Option<&str> {
        match self {
            BeanDefinition::Root(root) => root.resource_description(),
            BeanDefinition::Child(child) => child.resource_description(),
        }
    }

    pub fn validate(&self, bean_name: &str) -> BeanResult<()> {
        match self {
            BeanDefinition::Root(root) => root.validate(bean_name),
            BeanDefinition::Child(child) => child.validate(bean_name),
        }
    }
}

impl From<RootBeanDefinition> for BeanDefinition {
    fn from(definition: RootBeanDefinition) -> Self {
        BeanDefinition::Root(Arc::new(definition))
    }
}

impl From<ChildBeanDefinition> for BeanDefinition {
    fn from(definition: ChildBeanDefinition) -> Self {
        BeanDefinition::Child(Arc::new(definition))
    }
}

impl From<Arc<RootBeanDefinition>> for BeanDefinition {
    fn from(definition: Arc<RootBeanDefinition>) -> Self {
        BeanDefinition::Root(definition)
    }
}

impl fmt::Display for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeanDefinition::Root(root) => write!(
                f,
                "Root bean: class [{}]; singleton={}; abstract={}; lazyInit={}",
                root.bean_class_name().unwrap_or("null"),
                root.is_singleton(),
                root.is_abstract(),
                root.is_lazy_init()
            )?,
            BeanDefinition::Child(child) => write!(
                f,
                "Child bean with parent '{}'; singleton={}; abstract={}; lazyInit={}",
                child.parent_name(),
                child.is_singleton(),
                child.is_abstract(),
                child.is_lazy_init()
            )?,
        }
        if let Some(description) = self.resource_description() {
            write!(f, "; defined in {}", description)?;
        }
        Ok(())
    }
}
