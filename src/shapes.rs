//! Generic shapes synthesized by resolvers instead of being mocked or constructed

use core::{fmt, marker::PhantomData, ops::Deref};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::{
    any::{AnyValue, TypeInfo},
    container::WeakAutoMocker,
    errors::ResolveErrorKind,
    registry::Shape,
};

/// Enumerable of `T`. Resolved to a sequence holding a single resolved `T`.
pub struct Sequence<T: ?Sized> {
    items: Vec<Arc<T>>,
}

impl<T: ?Sized> Sequence<T> {
    #[inline]
    #[must_use]
    pub fn new(items: Vec<Arc<T>>) -> Self {
        Self { items }
    }

    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Arc<T>> {
        self.items
    }
}

impl<T: ?Sized> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: ?Sized> Deref for Sequence<T> {
    type Target = [Arc<T>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T: ?Sized> IntoIterator for Sequence<T> {
    type Item = Arc<T>;
    type IntoIter = std::vec::IntoIter<Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: ?Sized> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence").field("len", &self.items.len()).finish()
    }
}

/// Factory delegate. Every call resolves `R` from the container, its arguments are ignored,
/// so repeated calls return the cached instance unless `R` is provided by an uncached factory.
pub struct Func<Args, R: ?Sized> {
    mocker: WeakAutoMocker,
    _marker: PhantomData<fn(Args) -> Arc<R>>,
}

impl<Args, R> Func<Args, R>
where
    Args: 'static,
    R: ?Sized + Send + Sync + 'static,
{
    #[inline]
    #[must_use]
    pub(crate) fn new(mocker: WeakAutoMocker) -> Self {
        Self {
            mocker,
            _marker: PhantomData,
        }
    }

    pub fn call(&self, _args: Args) -> Result<Arc<R>, ResolveErrorKind> {
        self.mocker.upgrade().ok_or(ResolveErrorKind::ContainerDropped)?.get::<R>()
    }
}

impl<Args, R: ?Sized> Clone for Func<Args, R> {
    fn clone(&self) -> Self {
        Self {
            mocker: self.mocker.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Args, R: ?Sized> fmt::Debug for Func<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func").finish_non_exhaustive()
    }
}

/// Value of `T` resolved from the container on first access and kept by every clone
pub struct Lazy<T: ?Sized> {
    mocker: WeakAutoMocker,
    cell: Arc<OnceCell<Arc<T>>>,
}

impl<T> Lazy<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    #[inline]
    #[must_use]
    pub(crate) fn new(mocker: WeakAutoMocker) -> Self {
        Self {
            mocker,
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub fn value(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.cell
            .get_or_try_init(|| self.mocker.upgrade().ok_or(ResolveErrorKind::ContainerDropped)?.get::<T>())
            .cloned()
    }

    #[inline]
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            mocker: self.mocker.clone(),
            cell: self.cell.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("created", &self.cell.get().is_some())
            .finish_non_exhaustive()
    }
}

pub(crate) fn array<T>() -> Shape
where
    T: ?Sized + Send + Sync + 'static,
{
    Shape::Array {
        element: TypeInfo::of::<T>(),
        assemble: assemble_array::<T>,
    }
}

pub(crate) fn sequence<T>() -> Shape
where
    T: ?Sized + Send + Sync + 'static,
{
    Shape::Sequence {
        element: TypeInfo::of::<T>(),
        assemble: assemble_sequence::<T>,
    }
}

pub(crate) fn func<Args, R>() -> Shape
where
    Args: 'static,
    R: ?Sized + Send + Sync + 'static,
{
    Shape::Func {
        returns: TypeInfo::of::<R>(),
        build: |mocker| AnyValue::new(Arc::new(Func::<Args, R>::new(mocker))),
    }
}

pub(crate) fn lazy<T>() -> Shape
where
    T: ?Sized + Send + Sync + 'static,
{
    Shape::Lazy {
        of: TypeInfo::of::<T>(),
        build: |mocker| AnyValue::new(Arc::new(Lazy::<T>::new(mocker))),
    }
}

pub(crate) fn delegate<D, R>(wrap: fn(Func<(), R>) -> D) -> Shape
where
    D: Send + Sync + 'static,
    R: ?Sized + Send + Sync + 'static,
{
    Shape::Delegate {
        returns: TypeInfo::of::<R>(),
        build: Arc::new(move |mocker| AnyValue::new(Arc::new(wrap(Func::new(mocker))))),
    }
}

fn elements<T>(items: &[AnyValue]) -> Vec<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    items.iter().filter_map(AnyValue::downcast::<T>).collect()
}

fn assemble_array<T>(items: &[AnyValue]) -> AnyValue
where
    T: ?Sized + Send + Sync + 'static,
{
    AnyValue::new(Arc::new(elements::<T>(items)))
}

fn assemble_sequence<T>(items: &[AnyValue]) -> AnyValue
where
    T: ?Sized + Send + Sync + 'static,
{
    AnyValue::new(Arc::new(Sequence::new(elements::<T>(items))))
}
