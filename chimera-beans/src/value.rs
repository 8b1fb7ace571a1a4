//! 属性值与构造参数值
//!
//! Bean 定义中的纯数据部分。所有类型都实现 `Clone`，
//! 合并定义时通过克隆得到独立副本，修改合并结果不会影响原始定义。

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{BeanError, BeanResult};

/// 定义中可以出现的值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// 对另一个 Bean 的引用，由实例化策略通过工厂解析
    BeanRef(String),
    List(Vec<Value>),
}

impl Value {
    pub fn bean_ref(name: impl Into<String>) -> Self {
        Value::BeanRef(name.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_bean_ref(&self) -> Option<&str> {
        match self {
            Value::BeanRef(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// 值的类型名，用于按类型匹配构造参数
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::BeanRef(_) => "ref",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::BeanRef(name) => write!(f, "<ref bean='{}'>", name),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// 单个属性的名称与值，构造后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    name: String,
    value: Value,
}

impl PropertyValue {
    /// 创建属性值
    ///
    /// # Panics
    ///
    /// 名称为空时 panic，需要处理外部输入时使用 [`PropertyValue::try_new`]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        match Self::try_new(name, value) {
            Ok(pv) => pv,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(name: impl Into<String>, value: impl Into<Value>) -> BeanResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(BeanError::BeanDefinitionValidation {
                name: String::new(),
                resource_description: None,
                message: "Property name must not be empty".to_string(),
            });
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyValue: name='{}'; value=[{}]", self.name, self.value)
    }
}

/// 有序的属性值集合
///
/// 同名属性后加入者生效：`add_property_value` 会原位替换已存在的同名条目，
/// 因此集合中同一名称最多出现一次，且保持首次出现的位置。
///
/// 通过 [`MutablePropertyValues::add`] 传入的空名称不会 panic，而是被记录下来，
/// 由定义校验在注册时报告。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutablePropertyValues {
    values: Vec<PropertyValue>,
    rejected: usize,
}

impl MutablePropertyValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_property_value(&mut self, pv: PropertyValue) -> &mut Self {
        match self.values.iter_mut().find(|existing| existing.name == pv.name) {
            Some(existing) => *existing = pv,
            None => self.values.push(pv),
        }
        self
    }

    /// 便捷方法，名称为空时记录为无效条目
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        match PropertyValue::try_new(name, value) {
            Ok(pv) => self.add_property_value(pv),
            Err(_) => {
                self.rejected += 1;
                self
            }
        }
    }

    /// 批量合并，保持 `other` 的顺序并覆盖同名条目
    pub fn add_property_values(&mut self, other: &MutablePropertyValues) -> &mut Self {
        for pv in &other.values {
            self.add_property_value(pv.clone());
        }
        self.rejected += other.rejected;
        self
    }

    /// 是否有名称为空的条目被拒绝
    pub fn has_rejected_names(&self) -> bool {
        self.rejected > 0
    }

    pub fn get_property_value(&self, name: &str) -> Option<&PropertyValue> {
        self.values.iter().find(|pv| pv.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_property_value(name).map(PropertyValue::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_property_value(name).is_some()
    }

    pub fn remove_property_value(&mut self, name: &str) -> Option<PropertyValue> {
        let idx = self.values.iter().position(|pv| pv.name == name)?;
        Some(self.values.remove(idx))
    }

    pub fn property_values(&self) -> &[PropertyValue] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> IntoIterator for &'a MutablePropertyValues {
    type Item = &'a PropertyValue;
    type IntoIter = std::slice::Iter<'a, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<PropertyValue> for MutablePropertyValues {
    fn from_iter<I: IntoIterator<Item = PropertyValue>>(iter: I) -> Self {
        let mut pvs = MutablePropertyValues::new();
        for pv in iter {
            pvs.add_property_value(pv);
        }
        pvs
    }
}

/// 构造参数值及其声明的类型
#[derive(Debug, Clone, PartialEq)]
pub struct ValueHolder {
    pub value: Value,
    pub type_name: Option<String>,
}

impl ValueHolder {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            type_name: None,
        }
    }

    pub fn typed(value: impl Into<Value>, type_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            type_name: Some(type_name.into()),
        }
    }

    /// 声明了类型的参数只匹配同名类型，未声明的匹配任意类型
    fn matches(&self, required_type: Option<&str>) -> bool {
        match (self.type_name.as_deref(), required_type) {
            (Some(declared), Some(required)) => declared == required,
            _ => true,
        }
    }
}

/// 构造参数集合：按位置索引，以及按类型匹配的通用参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructorArgumentValues {
    indexed: BTreeMap<usize, ValueHolder>,
    generic: Vec<ValueHolder>,
}

impl ConstructorArgumentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同一索引后加入者生效
    pub fn add_indexed_argument_value(&mut self, index: usize, holder: ValueHolder) -> &mut Self {
        self.indexed.insert(index, holder);
        self
    }

    /// 相同的通用参数只保留一份
    pub fn add_generic_argument_value(&mut self, holder: ValueHolder) -> &mut Self {
        if !self.generic.contains(&holder) {
            self.generic.push(holder);
        }
        self
    }

    /// 用另一组参数覆盖当前参数
    pub fn add_argument_values(&mut self, other: &ConstructorArgumentValues) -> &mut Self {
        for (index, holder) in &other.indexed {
            self.add_indexed_argument_value(*index, holder.clone());
        }
        for holder in &other.generic {
            self.add_generic_argument_value(holder.clone());
        }
        self
    }

    pub fn get_indexed_argument_value(
        &self,
        index: usize,
        required_type: Option<&str>,
    ) -> Option<&ValueHolder> {
        self.indexed
            .get(&index)
            .filter(|holder| holder.matches(required_type))
    }

    pub fn get_generic_argument_value(&self, required_type: Option<&str>) -> Option<&ValueHolder> {
        self.generic
            .iter()
            .find(|holder| holder.matches(required_type))
    }

    /// 先按索引查找，找不到时回退到通用参数
    pub fn get_argument_value(
        &self,
        index: usize,
        required_type: Option<&str>,
    ) -> Option<&ValueHolder> {
        self.get_indexed_argument_value(index, required_type)
            .or_else(|| self.get_generic_argument_value(required_type))
    }

    pub fn indexed_argument_values(&self) -> &BTreeMap<usize, ValueHolder> {
        &self.indexed
    }

    pub fn generic_argument_values(&self) -> &[ValueHolder] {
        &self.generic
    }

    pub fn argument_count(&self) -> usize {
        self.indexed.len() + self.generic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.generic.is_empty()
    }
}
