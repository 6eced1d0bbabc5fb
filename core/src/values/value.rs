use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use static_assertions::const_assert;

use crate::path::CompiledPath;
use crate::values::object::{Finalizer, NativeObject};

/// A dynamic, reference-counted value.
///
/// Scalars are stored inline and copied on assignment. Strings, arrays and
/// hashes are handles onto a shared backing store: cloning a `Value` (which is
/// what [`Value::assign`] does) shares the store and bumps its refcount. Use
/// [`Value::clone_value`] for an actual copy.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(Str),
    Array(Array),
    Hash(Hash),
    Object(Rc<NativeObject>),
}

// Two words: the tag and either a scalar or a single `Rc` pointer.
const_assert!(std::mem::size_of::<Value>() <= 16);

/// The variant tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Void,
    Bool,
    Int,
    Real,
    Str,
    Array,
    Hash,
    Object,
}

impl Kind {
    /// Position in the cross-kind total order. Int and Real share a rank so
    /// that numbers compare by magnitude.
    fn rank(self) -> u8 {
        match self {
            Kind::Void => 0,
            Kind::Bool => 1,
            Kind::Int | Kind::Real => 2,
            Kind::Str => 3,
            Kind::Array => 4,
            Kind::Hash => 5,
            Kind::Object => 6,
        }
    }

    /// Upper-case name used by the `<KIND:address>` placeholder.
    pub fn tag(self) -> &'static str {
        match self {
            Kind::Void => "VOID",
            Kind::Bool => "BOOL",
            Kind::Int => "INTEGER",
            Kind::Real => "REAL",
            Kind::Str => "STRING",
            Kind::Array => "ARRAY",
            Kind::Hash => "HASH",
            Kind::Object => "OBJECT",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Void => "void",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Real => "real",
            Kind::Str => "string",
            Kind::Array => "array",
            Kind::Hash => "hash",
            Kind::Object => "object",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Shared stores
// ============================================================================

/// Side payload attached to a string's backing store.
#[derive(Clone)]
pub enum Annex {
    /// Compiled form of the path held in the string.
    Path(Rc<CompiledPath>),
    /// Opaque caller payload.
    Object(Rc<NativeObject>),
}

impl fmt::Debug for Annex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annex::Path(path) => write!(f, "Annex::Path({:p})", Rc::as_ptr(path)),
            Annex::Object(obj) => write!(f, "Annex::Object({:p})", Rc::as_ptr(obj)),
        }
    }
}

struct StrData {
    text: String,
    annex: Option<Annex>,
}

/// Shared string store.
#[derive(Clone)]
pub struct Str(Rc<RefCell<StrData>>);

impl Str {
    pub fn new(text: impl Into<String>) -> Self {
        Str(Rc::new(RefCell::new(StrData {
            text: text.into(),
            annex: None,
        })))
    }

    /// Borrow the string content.
    pub fn borrow(&self) -> Ref<'_, str> {
        Ref::map(self.0.borrow(), |data| data.text.as_str())
    }

    /// Copy of the content.
    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.borrow().text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite the content in place. Every handle sharing this store sees
    /// the new content, and the annex is dropped.
    pub fn replace(&self, text: impl Into<String>) {
        let mut data = self.0.borrow_mut();
        data.text = text.into();
        data.annex = None;
    }

    /// Append bytes in place. Drops the annex.
    pub fn append(&self, tail: &str) {
        let mut data = self.0.borrow_mut();
        data.text.push_str(tail);
        data.annex = None;
    }

    pub fn annex(&self) -> Option<Annex> {
        self.0.borrow().annex.clone()
    }

    pub fn set_annex(&self, annex: Annex) {
        self.0.borrow_mut().annex = Some(annex);
    }

    /// The cached compiled path, if the annex holds one.
    pub fn compiled_path(&self) -> Option<Rc<CompiledPath>> {
        match &self.0.borrow().annex {
            Some(Annex::Path(path)) => Some(path.clone()),
            _ => None,
        }
    }

    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &Str) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

/// Shared array store.
#[derive(Clone)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Array(Rc::new(RefCell::new(Vec::with_capacity(capacity))))
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Array(Rc::new(RefCell::new(items)))
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Value>> {
        self.0.borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared handle to the element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Store `value` at `index`, padding with voids when `index` is past
    /// the end. Never truncates.
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.borrow_mut();
        if index >= items.len() {
            items.resize_with(index + 1, Value::default);
        }
        items[index] = value;
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop()
    }

    /// Snapshot of the elements as shared handles.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared hash store. Keys enumerate in sorted byte order.
#[derive(Clone)]
pub struct Hash(Rc<RefCell<BTreeMap<String, Value>>>);

impl Hash {
    pub fn new() -> Self {
        Hash(Rc::new(RefCell::new(BTreeMap::new())))
    }

    pub fn borrow(&self) -> Ref<'_, BTreeMap<String, Value>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, BTreeMap<String, Value>> {
        self.0.borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &Hash) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.borrow(), f)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.borrow().iter()).finish()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.borrow().iter()).finish()
    }
}

// ============================================================================
// Value API
// ============================================================================

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::Str(Str::new(text))
    }

    pub fn array(capacity: usize) -> Self {
        Value::Array(Array::with_capacity(capacity))
    }

    pub fn hash() -> Self {
        Value::Hash(Hash::new())
    }

    /// Wrap an opaque payload. `finalizer` runs exactly once, when the last
    /// handle is released.
    pub fn object<T: Any>(payload: T, finalizer: Option<Finalizer>) -> Self {
        Value::Object(Rc::new(NativeObject::new(Box::new(payload), finalizer)))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Void => Kind::Void,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Real(_) => Kind::Real,
            Value::Str(_) => Kind::Str,
            Value::Array(_) => Kind::Array,
            Value::Hash(_) => Kind::Hash,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Release the current contents and share (or copy, for scalars) the
    /// representation of `source`.
    pub fn assign(&mut self, source: &Value) {
        *self = source.clone();
    }

    /// Drop this handle, leaving `Void` behind.
    pub fn release(&mut self) {
        *self = Value::Void;
    }

    /// Copy the value. A shallow copy duplicates one level of container and
    /// shares the children; a deep copy recurses. Copied strings carry no
    /// annex.
    pub fn clone_value(&self, deep: bool) -> Value {
        match self {
            Value::Str(s) => Value::string(s.text()),
            Value::Array(items) => {
                let copied = items
                    .borrow()
                    .iter()
                    .map(|item| if deep { item.clone_value(true) } else { item.clone() })
                    .collect();
                Value::Array(Array::from_vec(copied))
            }
            Value::Hash(map) => {
                let copy = Hash::new();
                for (key, item) in map.borrow().iter() {
                    let item = if deep { item.clone_value(true) } else { item.clone() };
                    copy.insert(key.clone(), item);
                }
                Value::Hash(copy)
            }
            other => other.clone(),
        }
    }

    /// Number of live handles on the backing store; 1 for inline scalars.
    pub fn refcount(&self) -> usize {
        match self {
            Value::Str(s) => s.refcount(),
            Value::Array(a) => a.refcount(),
            Value::Hash(h) => h.refcount(),
            Value::Object(o) => Rc::strong_count(o),
            _ => 1,
        }
    }

    /// Whether both values are handles onto the same backing store.
    pub fn same_store(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Hash(a), Value::Hash(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Truthiness: void, false, zero and empty strings/containers are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Void => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Real(r) => *r != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Hash(h) => !h.is_empty(),
            Value::Object(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&Str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Hash> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&NativeObject> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Canonical text form as a string value. Stringifying a string shares
    /// its store.
    pub fn stringify(&self) -> Value {
        match self {
            Value::Str(_) => self.clone(),
            other => Value::string(other.to_string()),
        }
    }

    /// Total order over all values.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Void, Value::Void) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Real(b)) => compare_reals(*a as f64, *b),
            (Value::Real(a), Value::Int(b)) => compare_reals(*a, *b as f64),
            (Value::Real(a), Value::Real(b)) => compare_reals(*a, *b),
            (Value::Str(a), Value::Str(b)) => a.borrow().as_bytes().cmp(b.borrow().as_bytes()),
            (Value::Array(a), Value::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y) {
                        Ordering::Equal => {}
                        unequal => return unequal,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Hash(a), Value::Hash(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    match ka.as_bytes().cmp(kb.as_bytes()).then_with(|| va.compare(vb)) {
                        Ordering::Equal => {}
                        unequal => return unequal,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => {
                (Rc::as_ptr(a) as *const () as usize).cmp(&(Rc::as_ptr(b) as *const () as usize))
            }
            (a, b) => a.kind().rank().cmp(&b.kind().rank()),
        }
    }

    fn addr(&self) -> *const () {
        match self {
            Value::Str(s) => s.addr(),
            Value::Array(a) => a.addr(),
            Value::Hash(h) => h.addr(),
            Value::Object(o) => Rc::as_ptr(o) as *const (),
            other => other as *const Value as *const (),
        }
    }
}

fn compare_reals(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Stringify a possibly missing value; `None` renders as `<NULL>`.
pub fn stringify(value: Option<&Value>) -> Value {
    match value {
        Some(value) => value.stringify(),
        None => Value::string("<NULL>"),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/// The stringify text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", r),
            Value::Str(s) => f.write_str(&s.borrow()),
            other => write!(f, "<{}:{:p}>", other.kind().tag(), other.addr()),
        }
    }
}

/// Structural form, used by test diffs.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("null"),
            Value::Bool(b) => write!(f, "{:?}", b),
            Value::Int(n) => write!(f, "{:?}", n),
            Value::Real(r) => write!(f, "{:?}", r),
            Value::Str(s) => fmt::Debug::fmt(s, f),
            Value::Array(a) => fmt::Debug::fmt(a, f),
            Value::Hash(h) => fmt::Debug::fmt(h, f),
            Value::Object(o) => write!(f, "{:?}", o),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Str> for Value {
    fn from(s: Str) -> Self {
        Value::Str(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Hash> for Value {
    fn from(h: Hash) -> Self {
        Value::Hash(h)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from_vec(items))
    }
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Value::Array(Array::from_vec(iter.into_iter().map(Into::into).collect()))
    }
}
