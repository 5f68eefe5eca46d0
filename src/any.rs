use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};
use std::sync::Arc;

pub(crate) type RcAnyThreadSafety = Arc<dyn Any + Send + Sync>;

/// Identity of a requested type. Works for sized types as well as `dyn Trait` keys.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

pub(crate) type Disposer = fn(&AnyValue);

/// Type-erased shared value registered under a type key.
///
/// For a key `K` the value always holds an `Arc<K>`, so `dyn Trait` keys are stored as `Arc<dyn Trait>`.
/// The data address is kept separately: two values produced by casting the same object to different
/// traits compare equal through [`AnyValue::same_object`].
#[derive(Clone)]
pub struct AnyValue {
    type_info: TypeInfo,
    addr: usize,
    inner: RcAnyThreadSafety,
    disposer: Option<Disposer>,
}

impl AnyValue {
    #[must_use]
    pub fn new<T>(value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            addr: Arc::as_ptr(&value).cast::<()>() as usize,
            inner: Arc::new(value),
            disposer: None,
        }
    }

    /// Same as [`AnyValue::new`], but the value takes part in [`crate::AutoMocker::as_disposable`] sweeps.
    #[must_use]
    pub fn disposable<T>(value: Arc<T>) -> Self
    where
        T: ?Sized + crate::Disposable + Send + Sync + 'static,
    {
        Self::new(value).with_disposer(dispose_value::<T>)
    }

    #[inline]
    #[must_use]
    pub(crate) fn with_disposer(mut self, disposer: Disposer) -> Self {
        self.disposer = Some(disposer);
        self
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_info.is::<T>()
    }

    #[must_use]
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }

    #[inline]
    #[must_use]
    pub fn same_object(&self, other: &AnyValue) -> bool {
        self.addr == other.addr
    }

    #[inline]
    #[must_use]
    pub(crate) fn addr(&self) -> usize {
        self.addr
    }

    #[inline]
    #[must_use]
    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }

    pub(crate) fn dispose(&self) -> bool {
        match self.disposer {
            Some(disposer) => {
                disposer(self);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyValue")
            .field("type_info", &self.type_info)
            .field("addr", &format_args!("{:#x}", self.addr))
            .finish_non_exhaustive()
    }
}

pub(crate) fn dispose_value<T>(value: &AnyValue)
where
    T: ?Sized + crate::Disposable + Send + Sync + 'static,
{
    if let Some(value) = value.downcast::<T>() {
        value.dispose();
    }
}
