//! Bean 类引用
//!
//! 用显式注册的类表代替运行时反射：每个 `BeanClass` 记录类型信息、
//! 构造函数、工厂方法以及 init/destroy 方法表。定义中只写类名时，
//! 工厂通过自己的 `ClassRegistry` 延迟解析。

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bean::{BeanInstance, FactoryBean};
use crate::instantiation::BeanCreationContext;

/// 构造函数
pub type Constructor =
    Arc<dyn Fn(&BeanCreationContext<'_>) -> anyhow::Result<BeanInstance> + Send + Sync>;

/// 工厂方法，静态方法的目标为 None，实例方法的目标为工厂 Bean 对象
pub type FactoryMethod = Arc<
    dyn Fn(Option<&(dyn Any + Send + Sync)>, &BeanCreationContext<'_>) -> anyhow::Result<BeanInstance>
        + Send
        + Sync,
>;

/// 生命周期方法（init-method / destroy-method）
pub type LifecycleMethod = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> anyhow::Result<()> + Send + Sync>;

fn constructor_fn<F>(f: F) -> Constructor
where
    F: Fn(&BeanCreationContext<'_>) -> anyhow::Result<BeanInstance> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn factory_method_fn<F>(f: F) -> FactoryMethod
where
    F: Fn(Option<&(dyn Any + Send + Sync)>, &BeanCreationContext<'_>) -> anyhow::Result<BeanInstance>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

fn lifecycle_fn<F>(f: F) -> LifecycleMethod
where
    F: Fn(&(dyn Any + Send + Sync)) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Bean 类
pub struct BeanClass {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    factory_bean: bool,
    default_constructor: bool,
    constructor: Option<Constructor>,
    factory_methods: HashMap<String, FactoryMethod>,
    methods: HashMap<String, LifecycleMethod>,
}

impl BeanClass {
    /// 普通类
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> BeanClassBuilder<T> {
        BeanClassBuilder::new(name.into(), false)
    }

    /// 具有 FactoryBean 能力的类
    pub fn factory_builder<T: FactoryBean>(name: impl Into<String>) -> BeanClassBuilder<T> {
        BeanClassBuilder::new(name.into(), true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_factory_bean(&self) -> bool {
        self.factory_bean
    }

    pub fn has_public_constructor(&self) -> bool {
        self.constructor.is_some() || !self.factory_methods.is_empty()
    }

    pub fn has_default_constructor(&self) -> bool {
        self.default_constructor
    }

    /// 按类型查找时使用：实例类型与 `type_id` 一致
    ///
    /// 需要按 trait 查找的 Bean 应以 `Arc<dyn Trait>` 作为实例类型注册。
    pub fn is_assignable_to(&self, type_id: TypeId) -> bool {
        self.type_id == type_id
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub fn factory_method(&self, name: &str) -> Option<&FactoryMethod> {
        self.factory_methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// 在实例上调用一个已注册的方法
    pub fn invoke_method(&self, method: &str, target: &(dyn Any + Send + Sync)) -> anyhow::Result<()> {
        let m = self.methods.get(method).ok_or_else(|| {
            anyhow::anyhow!("Method '{}' not found on class [{}]", method, self.name)
        })?;
        m(target)
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanClass")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("factory_bean", &self.factory_bean)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// BeanClass 构建器
pub struct BeanClassBuilder<T> {
    class: BeanClass,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> BeanClassBuilder<T> {
    fn new(name: String, factory_bean: bool) -> Self {
        Self {
            class: BeanClass {
                name,
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                factory_bean,
                default_constructor: true,
                constructor: None,
                factory_methods: HashMap::new(),
                methods: HashMap::new(),
            },
            _marker: PhantomData,
        }
    }

    /// 构造函数需要参数（影响 autodetect 装配模式的解析）
    pub fn without_default_constructor(mut self) -> Self {
        self.class.default_constructor = false;
        self
    }

    /// 静态工厂方法，产出任意类型的对象
    pub fn static_factory_method<U, F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        U: Any + Send + Sync,
        F: Fn(&BeanCreationContext<'_>) -> anyhow::Result<U> + Send + Sync + 'static,
    {
        self.class.factory_methods.insert(
            name.into(),
            factory_method_fn(move |_, ctx| method(ctx).map(BeanInstance::object)),
        );
        self
    }

    /// 实例工厂方法，在工厂 Bean 实例上调用
    pub fn factory_method<U, F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        U: Any + Send + Sync,
        F: Fn(&T, &BeanCreationContext<'_>) -> anyhow::Result<U> + Send + Sync + 'static,
    {
        let class_name = self.class.name.clone();
        self.class.factory_methods.insert(
            name.into(),
            factory_method_fn(move |target, ctx| {
                let target = target
                    .and_then(|t| t.downcast_ref::<T>())
                    .ok_or_else(|| {
                        anyhow::anyhow!("Factory method target is not an instance of [{}]", class_name)
                    })?;
                method(target, ctx).map(BeanInstance::object)
            }),
        );
        self
    }

    /// 注册可作为 init-method / destroy-method 的方法
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let class_name = self.class.name.clone();
        self.class.methods.insert(
            name.into(),
            lifecycle_fn(move |target| {
                let target = target.downcast_ref::<T>().ok_or_else(|| {
                    anyhow::anyhow!("Target object is not an instance of [{}]", class_name)
                })?;
                method(target)
            }),
        );
        self
    }

    /// 普通构造函数
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&BeanCreationContext<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.class.constructor = Some(constructor_fn(move |ctx| {
            constructor(ctx).map(BeanInstance::object)
        }));
        self
    }

    pub fn build(self) -> Arc<BeanClass> {
        Arc::new(self.class)
    }
}

impl<T: FactoryBean> BeanClassBuilder<T> {
    /// FactoryBean 类的构造函数
    pub fn factory_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&BeanCreationContext<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.class.factory_bean = true;
        self.class.constructor = Some(constructor_fn(move |ctx| {
            constructor(ctx).map(BeanInstance::factory)
        }));
        self
    }
}

/// 编译期提交的 Bean 类，由 [`ClassRegistry::from_submitted`] 收集
pub struct BeanClassSubmission {
    pub class: fn() -> Arc<BeanClass>,
}

inventory::collect!(BeanClassSubmission);

/// 类名到 BeanClass 的映射表，每个工厂持有自己的一份
#[derive(Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, Arc<BeanClass>>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用所有通过 `inventory::submit!` 提交的类创建映射表
    pub fn from_submitted() -> Self {
        let registry = Self::new();
        for submission in inventory::iter::<BeanClassSubmission> {
            registry.register((submission.class)());
        }
        tracing::debug!(
            "Class registry initialized with {} submitted class(es)",
            registry.len()
        );
        registry
    }

    /// 同名类后注册者生效
    pub fn register(&self, class: Arc<BeanClass>) {
        let name = class.name().to_string();
        if self.classes.write().insert(name.clone(), class).is_some() {
            tracing::debug!("Replaced bean class registration for '{}'", name);
        }
    }

    pub fn resolve(&self, class_name: &str) -> Option<Arc<BeanClass>> {
        self.classes.read().get(class_name).cloned()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.read().contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.classes.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("ClassRegistry").field("classes", &names).finish()
    }
}
